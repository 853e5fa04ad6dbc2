//! 🌳 bosquet — condition-tree filter engine and native-SQL query guard.
//!
//! The filter core of an admin-panel backend agent. Untrusted request
//! parameters flow through [`parser::from_plain_object`] (validated against
//! a read-only [`schema::SchemaCache`]) into a [`filters::Filter`] handed
//! to the host's datasource; independently, raw SQL text is gated by
//! [`query::validate_query`] before reaching a native-query executor.
//!
//! Everything here is pure, synchronous, and free of shared mutable state:
//! safe to call from any concurrency model the host chooses.

pub mod condition_tree;
pub mod error;
pub mod filters;
pub mod operators;
pub mod parser;
pub mod query;
pub mod registry;
pub mod schema;
pub mod types;
pub mod validator;

pub use condition_tree::{ConditionTree, Leaf};
pub use error::{Error, ErrorKind};
pub use filters::{Filter, Page, Sort, SortClause};
pub use operators::{Aggregator, Operator};
pub use query::validate_query;
pub use schema::{Collection, ColumnSchema, FieldSchema, RelationKind, RelationSchema, SchemaCache};
pub use types::{ColumnType, PrimitiveType};
