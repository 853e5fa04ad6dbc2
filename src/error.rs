//! Error types for the filter core.
//!
//! Every validation failure is classified and carries a human-readable
//! message naming the offending field, keyword, or value. The host route
//! layer is responsible for translating these into HTTP responses.

use serde::Serialize;

/// Classification of a filter-core error, independent of the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// Input matches neither the Leaf nor the Branch condition-tree shape.
    MalformedInput,
    /// A referenced field or relation does not exist, or is the wrong kind
    /// (column vs relation) for its position in a dot-path.
    SchemaMismatch,
    /// Operator is not in the field's whitelist.
    OperatorNotAllowed,
    /// Value's type is not in the operator's/column's allowed set.
    TypeMismatch,
    /// Value is not among a column's declared enum values.
    EnumMismatch,
    /// Raw SQL failed a policy check (SELECT-only, single statement,
    /// balanced parentheses, forbidden keyword/function, injection pattern).
    SqlPolicyViolation,
    /// Raw SQL input is blank.
    EmptyQuery,
}

/// The main error type for bosquet.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    MalformedInput(String),

    #[error("{0}")]
    SchemaMismatch(String),

    #[error("{0}")]
    OperatorNotAllowed(String),

    #[error("{0}")]
    TypeMismatch(String),

    #[error("{0}")]
    EnumMismatch(String),

    #[error("{0}")]
    SqlPolicyViolation(String),

    #[error("Query cannot be empty.")]
    EmptyQuery,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MalformedInput(_) => ErrorKind::MalformedInput,
            Error::SchemaMismatch(_) => ErrorKind::SchemaMismatch,
            Error::OperatorNotAllowed(_) => ErrorKind::OperatorNotAllowed,
            Error::TypeMismatch(_) => ErrorKind::TypeMismatch,
            Error::EnumMismatch(_) => ErrorKind::EnumMismatch,
            Error::SqlPolicyViolation(_) => ErrorKind::SqlPolicyViolation,
            Error::EmptyQuery => ErrorKind::EmptyQuery,
        }
    }
}
