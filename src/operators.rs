//! Filter operators and branch aggregators.
//!
//! Canonical in-memory names are capitalized (`GreaterThan`, `And`); the
//! wire format accepts snake_case and any casing (`greater_than`, `AND`)
//! and parses to the canonical form.

use crate::error::Error;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A named comparison/predicate applicable to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operator {
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    Contains,
    NotContains,
    IContains,
    StartsWith,
    EndsWith,
    IStartsWith,
    IEndsWith,
    Like,
    ILike,
    Match,
    LongerThan,
    ShorterThan,
    In,
    NotIn,
    IncludesAll,
    Present,
    Blank,
    Missing,
    Today,
    Yesterday,
    Past,
    Future,
    Before,
    After,
    PreviousWeek,
    PreviousWeekToDate,
    PreviousMonth,
    PreviousMonthToDate,
    PreviousQuarter,
    PreviousQuarterToDate,
    PreviousYear,
    PreviousYearToDate,
    PreviousXDays,
    PreviousXDaysToDate,
    BeforeXHoursAgo,
    AfterXHoursAgo,
}

impl Operator {
    /// All operators, in declaration order.
    pub const ALL: &'static [Operator] = &[
        Operator::Equal,
        Operator::NotEqual,
        Operator::LessThan,
        Operator::GreaterThan,
        Operator::LessThanOrEqual,
        Operator::GreaterThanOrEqual,
        Operator::Contains,
        Operator::NotContains,
        Operator::IContains,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::IStartsWith,
        Operator::IEndsWith,
        Operator::Like,
        Operator::ILike,
        Operator::Match,
        Operator::LongerThan,
        Operator::ShorterThan,
        Operator::In,
        Operator::NotIn,
        Operator::IncludesAll,
        Operator::Present,
        Operator::Blank,
        Operator::Missing,
        Operator::Today,
        Operator::Yesterday,
        Operator::Past,
        Operator::Future,
        Operator::Before,
        Operator::After,
        Operator::PreviousWeek,
        Operator::PreviousWeekToDate,
        Operator::PreviousMonth,
        Operator::PreviousMonthToDate,
        Operator::PreviousQuarter,
        Operator::PreviousQuarterToDate,
        Operator::PreviousYear,
        Operator::PreviousYearToDate,
        Operator::PreviousXDays,
        Operator::PreviousXDaysToDate,
        Operator::BeforeXHoursAgo,
        Operator::AfterXHoursAgo,
    ];

    /// Canonical capitalized name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "Equal",
            Operator::NotEqual => "NotEqual",
            Operator::LessThan => "LessThan",
            Operator::GreaterThan => "GreaterThan",
            Operator::LessThanOrEqual => "LessThanOrEqual",
            Operator::GreaterThanOrEqual => "GreaterThanOrEqual",
            Operator::Contains => "Contains",
            Operator::NotContains => "NotContains",
            Operator::IContains => "IContains",
            Operator::StartsWith => "StartsWith",
            Operator::EndsWith => "EndsWith",
            Operator::IStartsWith => "IStartsWith",
            Operator::IEndsWith => "IEndsWith",
            Operator::Like => "Like",
            Operator::ILike => "ILike",
            Operator::Match => "Match",
            Operator::LongerThan => "LongerThan",
            Operator::ShorterThan => "ShorterThan",
            Operator::In => "In",
            Operator::NotIn => "NotIn",
            Operator::IncludesAll => "IncludesAll",
            Operator::Present => "Present",
            Operator::Blank => "Blank",
            Operator::Missing => "Missing",
            Operator::Today => "Today",
            Operator::Yesterday => "Yesterday",
            Operator::Past => "Past",
            Operator::Future => "Future",
            Operator::Before => "Before",
            Operator::After => "After",
            Operator::PreviousWeek => "PreviousWeek",
            Operator::PreviousWeekToDate => "PreviousWeekToDate",
            Operator::PreviousMonth => "PreviousMonth",
            Operator::PreviousMonthToDate => "PreviousMonthToDate",
            Operator::PreviousQuarter => "PreviousQuarter",
            Operator::PreviousQuarterToDate => "PreviousQuarterToDate",
            Operator::PreviousYear => "PreviousYear",
            Operator::PreviousYearToDate => "PreviousYearToDate",
            Operator::PreviousXDays => "PreviousXDays",
            Operator::PreviousXDaysToDate => "PreviousXDaysToDate",
            Operator::BeforeXHoursAgo => "BeforeXHoursAgo",
            Operator::AfterXHoursAgo => "AfterXHoursAgo",
        }
    }

    /// Parse an operator name, ignoring case and underscores
    /// (`"less_than"`, `"LessThan"`, `"LESS_THAN"` all succeed).
    pub fn parse(name: &str) -> Result<Operator, Error> {
        let normalized = fold_name(name);
        Operator::ALL
            .iter()
            .copied()
            .find(|op| fold_name(op.as_str()) == normalized)
            .ok_or_else(|| Error::MalformedInput(format!("Unknown operator: '{}'", name)))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Operator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Operator::parse(&s).map_err(D::Error::custom)
    }
}

/// The boolean combinator of a Branch node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aggregator {
    And,
    Or,
}

impl Aggregator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregator::And => "And",
            Aggregator::Or => "Or",
        }
    }

    /// Parse an aggregator name, ignoring case (`"and"`, `"AND"`, `"And"`).
    pub fn parse(name: &str) -> Result<Aggregator, Error> {
        match name.to_ascii_lowercase().as_str() {
            "and" => Ok(Aggregator::And),
            "or" => Ok(Aggregator::Or),
            _ => Err(Error::MalformedInput(format!(
                "Unknown aggregator: '{}'",
                name
            ))),
        }
    }
}

impl fmt::Display for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Aggregator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Aggregator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Aggregator::parse(&s).map_err(D::Error::custom)
    }
}

/// Lowercase a name and drop underscores, so snake_case and CamelCase
/// spellings compare equal.
fn fold_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snake_case() {
        assert_eq!(Operator::parse("less_than").unwrap(), Operator::LessThan);
        assert_eq!(
            Operator::parse("greater_than").unwrap(),
            Operator::GreaterThan
        );
        assert_eq!(Operator::parse("i_contains").unwrap(), Operator::IContains);
        assert_eq!(Operator::parse("not_in").unwrap(), Operator::NotIn);
    }

    #[test]
    fn test_parse_canonical_and_upper() {
        assert_eq!(Operator::parse("LessThan").unwrap(), Operator::LessThan);
        assert_eq!(Operator::parse("PRESENT").unwrap(), Operator::Present);
        assert_eq!(Operator::parse("ilike").unwrap(), Operator::ILike);
    }

    #[test]
    fn test_parse_unknown_operator() {
        let err = Operator::parse("frobnicate").unwrap_err();
        assert!(err.to_string().contains("Unknown operator: 'frobnicate'"));
    }

    #[test]
    fn test_parse_aggregator() {
        assert_eq!(Aggregator::parse("and").unwrap(), Aggregator::And);
        assert_eq!(Aggregator::parse("AND").unwrap(), Aggregator::And);
        assert_eq!(Aggregator::parse("Or").unwrap(), Aggregator::Or);
        assert!(Aggregator::parse("xor").is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let json = serde_json::to_string(&Operator::GreaterThan).unwrap();
        assert_eq!(json, "\"GreaterThan\"");
        let op: Operator = serde_json::from_str("\"greater_than\"").unwrap();
        assert_eq!(op, Operator::GreaterThan);
    }
}
