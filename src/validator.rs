//! Field and value validators.
//!
//! Schema-aware checks used before a value reaches a collection operation:
//! `validate` resolves a dot-path and checks each value's inferred type
//! against the column's allowed set; `validate_value` runs the strict
//! per-type checks used by record creation/update.
//!
//! Values spelled exactly as a `{{...}}` mustache placeholder are context
//! variables substituted elsewhere in the system and bypass type validation
//! entirely.

use crate::error::Error;
use crate::registry;
use crate::schema::{Collection, ColumnSchema, SchemaCache};
use crate::types::{self, PrimitiveType};
use serde_json::Value as JsonValue;

/// True when the value is exactly a `{{...}}` context-variable placeholder.
pub fn is_template_value(value: &JsonValue) -> bool {
    match value.as_str() {
        Some(s) => s.len() >= 4 && s.starts_with("{{") && s.ends_with("}}"),
        None => false,
    }
}

/// Resolve `field_path` on `collection` and type-check each value against
/// the terminal column's allowed set. Null values and `{{...}}` templates
/// skip the type check.
pub fn validate(
    cache: &SchemaCache,
    collection: &Collection,
    field_path: &str,
    values: &[JsonValue],
) -> Result<(), Error> {
    let (_, column) = cache.resolve(collection, field_path)?;

    for value in values {
        if value.is_null() || is_template_value(value) {
            continue;
        }
        check_column_type(field_path, column, value)?;
    }
    Ok(())
}

/// Check that a value's inferred type is acceptable for the column.
pub(crate) fn check_column_type(
    field_path: &str,
    column: &ColumnSchema,
    value: &JsonValue,
) -> Result<(), Error> {
    let context = column.column_type.validation_type();
    let inferred = types::infer_type(value, context);
    let allowed = registry::allowed_types_for_column(&column.column_type);

    if !allowed.contains(&inferred) {
        tracing::debug!(field = field_path, "value type rejected");
        return Err(wrong_type_error(field_path, value, allowed.iter()));
    }
    Ok(())
}

/// Strict per-type value check for a single column.
///
/// Lenient on Json columns by design: a string that fails to parse as JSON
/// is still accepted as a JSON-ish payload.
pub fn validate_value(
    field_name: &str,
    column: &ColumnSchema,
    value: &JsonValue,
) -> Result<(), Error> {
    if value.is_null() || is_template_value(value) {
        return Ok(());
    }

    match column.column_type.validation_type() {
        PrimitiveType::Boolean => match value {
            JsonValue::Bool(_) => Ok(()),
            _ => Err(expects(field_name, value, "Boolean")),
        },
        PrimitiveType::Number => match value {
            JsonValue::Number(_) => Ok(()),
            JsonValue::String(s) if types::is_number_string(s) => Ok(()),
            _ => Err(expects(field_name, value, "Number")),
        },
        PrimitiveType::String => match value {
            JsonValue::String(_) => Ok(()),
            _ => Err(expects(field_name, value, "String")),
        },
        PrimitiveType::Date => match value.as_str() {
            Some(s) if types::is_datetime_string(s) || types::is_date_string(s) => Ok(()),
            _ => Err(expects(field_name, value, "Date")),
        },
        PrimitiveType::Dateonly => match value.as_str() {
            Some(s) if types::is_date_string(s) || types::is_datetime_string(s) => Ok(()),
            _ => Err(expects(field_name, value, "Dateonly")),
        },
        PrimitiveType::Timeonly => match value.as_str() {
            Some(s) if types::is_time_string(s) => Ok(()),
            _ => Err(expects(field_name, value, "Timeonly")),
        },
        PrimitiveType::Enum => match value.as_str() {
            Some(s) if column.enum_values.iter().any(|v| v == s) => Ok(()),
            _ => {
                tracing::debug!(field = field_name, "enum value rejected");
                Err(Error::EnumMismatch(format!(
                    "The given enum value(s) [{}] is not listed in [{}]",
                    display_value(value),
                    column.enum_values.join(", ")
                )))
            }
        },
        PrimitiveType::Json => match value {
            JsonValue::String(_) | JsonValue::Object(_) | JsonValue::Array(_) => Ok(()),
            _ => Err(expects(field_name, value, "Json")),
        },
        PrimitiveType::Uuid => match value.as_str() {
            Some(s) if types::is_uuid_string(s) => Ok(()),
            _ => Err(expects(field_name, value, "Uuid")),
        },
        PrimitiveType::Point => match value.as_str() {
            Some(s) if types::is_point_string(s) => Ok(()),
            _ => Err(expects(field_name, value, "Point")),
        },
    }
}

/// Same as [`validate_value`], but a null id is never legal.
pub fn validate_value_for_id(
    field_name: &str,
    column: &ColumnSchema,
    value: &JsonValue,
) -> Result<(), Error> {
    if value.is_null() {
        return Err(Error::TypeMismatch(format!(
            "The given value for '{}' is null and cannot be used as an id",
            field_name
        )));
    }
    validate_value(field_name, column, value)
}

fn expects(field_name: &str, value: &JsonValue, expected: &str) -> Error {
    tracing::debug!(field = field_name, "value rejected");
    Error::TypeMismatch(format!(
        "The given value has a wrong type for '{}': {}.\n Expects [{}]",
        field_name,
        display_value(value),
        expected
    ))
}

fn wrong_type_error<'a>(
    field_path: &str,
    value: &JsonValue,
    allowed: impl Iterator<Item = &'a Option<PrimitiveType>>,
) -> Error {
    let expected: Vec<String> = allowed
        .filter_map(|t| t.map(|p| p.to_string()))
        .collect();
    Error::TypeMismatch(format!(
        "The given value has a wrong type for '{}': {}.\n Expects [{}]",
        field_path,
        display_value(value),
        expected.join(", ")
    ))
}

/// Render a value for an error message, bare strings without quotes.
fn display_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
