//! Column types and value-type inference.
//!
//! `PrimitiveType` is the semantic type of a column; `ColumnType` adds the
//! composite shapes (nested objects, arrays) that validate as Json.
//! `infer_type` guesses the primitive type of an untrusted JSON value,
//! using the target column type as context to disambiguate strings.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// The semantic data type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveType {
    String,
    Number,
    Boolean,
    Date,
    Dateonly,
    Timeonly,
    Enum,
    Json,
    Uuid,
    Point,
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveType::String => "String",
            PrimitiveType::Number => "Number",
            PrimitiveType::Boolean => "Boolean",
            PrimitiveType::Date => "Date",
            PrimitiveType::Dateonly => "Dateonly",
            PrimitiveType::Timeonly => "Timeonly",
            PrimitiveType::Enum => "Enum",
            PrimitiveType::Json => "Json",
            PrimitiveType::Uuid => "Uuid",
            PrimitiveType::Point => "Point",
        };
        f.write_str(name)
    }
}

/// A column's declared type: a primitive, or a composite shape.
///
/// Composite shapes (embedded objects, arrays thereof) carry their field
/// layout for schema purposes but validate as Json.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Primitive(PrimitiveType),
    Object(BTreeMap<String, ColumnType>),
    ArrayOf(Box<ColumnType>),
}

impl ColumnType {
    /// The primitive type used for value validation: composites map to Json.
    pub fn validation_type(&self) -> PrimitiveType {
        match self {
            ColumnType::Primitive(p) => *p,
            ColumnType::Object(_) | ColumnType::ArrayOf(_) => PrimitiveType::Json,
        }
    }
}

impl From<PrimitiveType> for ColumnType {
    fn from(p: PrimitiveType) -> Self {
        ColumnType::Primitive(p)
    }
}

/// Infer the primitive type of a JSON value, using the target column's
/// primitive type as context to disambiguate string spellings.
///
/// Returns `None` for JSON null (a null value always skips type checks).
pub fn infer_type(value: &JsonValue, context: PrimitiveType) -> Option<PrimitiveType> {
    match value {
        JsonValue::Null => None,
        JsonValue::Bool(_) => Some(PrimitiveType::Boolean),
        JsonValue::Number(_) => Some(PrimitiveType::Number),
        JsonValue::Object(_) | JsonValue::Array(_) => Some(PrimitiveType::Json),
        JsonValue::String(s) => Some(infer_string_type(s, context)),
    }
}

fn infer_string_type(s: &str, context: PrimitiveType) -> PrimitiveType {
    if context == PrimitiveType::Enum {
        return PrimitiveType::Enum;
    }
    // String and Json columns take the string at face value; the shape
    // probes below only disambiguate for columns expecting another type.
    if context == PrimitiveType::String || context == PrimitiveType::Json {
        return PrimitiveType::String;
    }
    if is_uuid_string(s) {
        return PrimitiveType::Uuid;
    }
    if context == PrimitiveType::Number && is_number_string(s) {
        return PrimitiveType::Number;
    }
    if is_datetime_string(s) {
        return PrimitiveType::Date;
    }
    if is_date_string(s) {
        return PrimitiveType::Dateonly;
    }
    if is_time_string(s) {
        return PrimitiveType::Timeonly;
    }
    if context == PrimitiveType::Point && is_point_string(s) {
        return PrimitiveType::Point;
    }
    PrimitiveType::String
}

/// RFC-shaped UUID string.
pub fn is_uuid_string(s: &str) -> bool {
    s.len() == 36 && Uuid::parse_str(s).is_ok()
}

/// A string that parses as a finite (possibly signed, possibly fractional)
/// number. `"NaN"` and `"inf"` spellings do not count.
pub fn is_number_string(s: &str) -> bool {
    s.trim().parse::<f64>().map_or(false, f64::is_finite)
}

/// A string carrying both a date and a time component.
pub fn is_datetime_string(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
}

/// A bare `YYYY-MM-DD` date.
pub fn is_date_string(s: &str) -> bool {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// A bare `HH:MM[:SS]` time.
pub fn is_time_string(s: &str) -> bool {
    NaiveTime::parse_from_str(s, "%H:%M:%S").is_ok()
        || NaiveTime::parse_from_str(s, "%H:%M").is_ok()
}

/// A two-component numeric coordinate: `"12.5,-30"`.
pub fn is_point_string(s: &str) -> bool {
    let parts: Vec<&str> = s.split(',').collect();
    parts.len() == 2 && parts.iter().all(|p| is_number_string(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_infer_scalars() {
        assert_eq!(
            infer_type(&json!(true), PrimitiveType::Boolean),
            Some(PrimitiveType::Boolean)
        );
        assert_eq!(
            infer_type(&json!(42), PrimitiveType::Number),
            Some(PrimitiveType::Number)
        );
        assert_eq!(infer_type(&JsonValue::Null, PrimitiveType::String), None);
        assert_eq!(
            infer_type(&json!({"a": 1}), PrimitiveType::Json),
            Some(PrimitiveType::Json)
        );
    }

    #[test]
    fn test_infer_string_in_context() {
        // Numeric strings only collapse to Number when the column is Number.
        assert_eq!(
            infer_type(&json!("42"), PrimitiveType::Number),
            Some(PrimitiveType::Number)
        );
        assert_eq!(
            infer_type(&json!("42"), PrimitiveType::String),
            Some(PrimitiveType::String)
        );
        // Enum context always wins for strings.
        assert_eq!(
            infer_type(&json!("shipped"), PrimitiveType::Enum),
            Some(PrimitiveType::Enum)
        );
    }

    #[test]
    fn test_shaped_strings_stay_strings_on_string_columns() {
        for shaped in [
            "2024-03-01",
            "2024-03-01T10:00:00Z",
            "10:30:00",
            "550e8400-e29b-41d4-a716-446655440000",
        ] {
            assert_eq!(
                infer_type(&json!(shaped), PrimitiveType::String),
                Some(PrimitiveType::String),
                "{shaped}"
            );
            assert_eq!(
                infer_type(&json!(shaped), PrimitiveType::Json),
                Some(PrimitiveType::String),
                "{shaped}"
            );
        }
    }

    #[test]
    fn test_non_finite_spellings_are_not_numbers() {
        assert!(is_number_string("42.5"));
        assert!(is_number_string("-7"));
        assert!(!is_number_string("NaN"));
        assert!(!is_number_string("inf"));
        assert!(!is_number_string("-infinity"));
        assert!(!is_number_string(""));
    }

    #[test]
    fn test_infer_uuid_and_dates() {
        assert_eq!(
            infer_type(
                &json!("550e8400-e29b-41d4-a716-446655440000"),
                PrimitiveType::Uuid
            ),
            Some(PrimitiveType::Uuid)
        );
        assert_eq!(
            infer_type(&json!("2024-03-01T10:00:00Z"), PrimitiveType::Date),
            Some(PrimitiveType::Date)
        );
        assert_eq!(
            infer_type(&json!("2024-03-01"), PrimitiveType::Dateonly),
            Some(PrimitiveType::Dateonly)
        );
        assert_eq!(
            infer_type(&json!("10:30:00"), PrimitiveType::Timeonly),
            Some(PrimitiveType::Timeonly)
        );
    }

    #[test]
    fn test_infer_point() {
        assert_eq!(
            infer_type(&json!("12.5,-30"), PrimitiveType::Point),
            Some(PrimitiveType::Point)
        );
        // Same spelling on a String column stays a String.
        assert_eq!(
            infer_type(&json!("12.5,-30"), PrimitiveType::String),
            Some(PrimitiveType::String)
        );
    }

    #[test]
    fn test_composite_validates_as_json() {
        let composite = ColumnType::ArrayOf(Box::new(ColumnType::Object(BTreeMap::from([(
            "lat".to_string(),
            ColumnType::Primitive(PrimitiveType::Number),
        )]))));
        assert_eq!(composite.validation_type(), PrimitiveType::Json);
    }
}
