//! Condition tree parser.
//!
//! Converts an untrusted plain nested map (query string or JSON body) into
//! a validated [`ConditionTree`]. The node kind is decided once from the
//! presence of the `aggregator` vs `field` keys; operator and aggregator
//! names normalize case-insensitively; `In`/`NotIn`/`IncludesAll` string
//! values are comma-split here (members validated individually, the leaf
//! carries the list form); boolean columns coerce string spellings before
//! membership testing.

use crate::condition_tree::ConditionTree;
use crate::error::Error;
use crate::operators::{Aggregator, Operator};
use crate::registry;
use crate::schema::{Collection, ColumnSchema, SchemaCache};
use crate::types::{self, PrimitiveType};
use crate::validator;
use serde_json::{Number, Value as JsonValue};

/// Operators whose value is a list.
const LIST_OPERATORS: &[Operator] = &[Operator::In, Operator::NotIn, Operator::IncludesAll];

/// Parse an untrusted plain map into a validated condition tree.
pub fn from_plain_object(
    cache: &SchemaCache,
    collection: &Collection,
    plain: &JsonValue,
) -> Result<ConditionTree, Error> {
    let map = match plain.as_object() {
        Some(map) => map,
        None => return Err(malformed(plain)),
    };

    if map.contains_key("aggregator") {
        let name = map
            .get("aggregator")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| malformed(plain))?;
        let aggregator = Aggregator::parse(name)?;
        let conditions = map
            .get("conditions")
            .and_then(JsonValue::as_array)
            .ok_or_else(|| malformed(plain))?;
        let children = conditions
            .iter()
            .map(|child| from_plain_object(cache, collection, child))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(ConditionTree::Branch {
            aggregator,
            conditions: children,
        });
    }

    if map.contains_key("field") && map.contains_key("operator") {
        let field = map
            .get("field")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| malformed(plain))?;
        let operator_name = map
            .get("operator")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| malformed(plain))?;
        let operator = Operator::parse(operator_name)?;
        let raw_value = map.get("value").cloned().unwrap_or(JsonValue::Null);

        return parse_leaf(cache, collection, field, operator, raw_value);
    }

    Err(malformed(plain))
}

fn malformed(plain: &JsonValue) -> Error {
    tracing::debug!("condition tree shape rejected");
    Error::MalformedInput(format!(
        "Failed to instantiate condition tree from {}",
        plain
    ))
}

fn parse_leaf(
    cache: &SchemaCache,
    collection: &Collection,
    field: &str,
    operator: Operator,
    raw_value: JsonValue,
) -> Result<ConditionTree, Error> {
    let (_, column) = cache.resolve(collection, field)?;

    // The operator must be legal for the column's type and whitelisted on
    // the field itself (the whitelist may be narrower, e.g. Match disabled).
    let type_allows =
        registry::allowed_operators(column.column_type.validation_type()).contains(&operator);
    if !type_allows || !column.filter_operators.contains(&operator) {
        tracing::debug!(field, operator = %operator, "operator rejected");
        return Err(Error::OperatorNotAllowed(format!(
            "Operator not allowed: '{}' on '{}.{}'",
            operator, collection.name, field
        )));
    }

    let value = if LIST_OPERATORS.contains(&operator) {
        let members = split_list(column, raw_value);
        for member in &members {
            validate_leaf_value(field, column, operator, member)?;
        }
        JsonValue::Array(members)
    } else {
        let coerced = coerce_value(column, raw_value);
        validate_leaf_value(field, column, operator, &coerced)?;
        coerced
    };

    Ok(ConditionTree::leaf(field, operator, value))
}

/// Normalize an `In`-style value into its list form: strings are split on
/// commas and trimmed (empty segments dropped), scalars are wrapped, and
/// each member is coerced to the column's shape.
fn split_list(column: &ColumnSchema, raw_value: JsonValue) -> Vec<JsonValue> {
    let members = match raw_value {
        JsonValue::Array(items) => items,
        JsonValue::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| JsonValue::String(part.to_string()))
            .collect(),
        JsonValue::Null => Vec::new(),
        scalar => vec![scalar],
    };
    members
        .into_iter()
        .map(|member| coerce_value(column, member))
        .collect()
}

/// Coerce string spellings toward the column's type: booleans from
/// `true/false/1/0/yes/no`, numbers from numeric strings on Number columns.
fn coerce_value(column: &ColumnSchema, value: JsonValue) -> JsonValue {
    let target = column.column_type.validation_type();
    match (&value, target) {
        (JsonValue::String(s), PrimitiveType::Boolean) => match parse_bool_string(s) {
            Some(b) => JsonValue::Bool(b),
            None => value,
        },
        (JsonValue::String(s), PrimitiveType::Number) => match parse_number_string(s) {
            Some(n) => JsonValue::Number(n),
            None => value,
        },
        _ => value,
    }
}

fn parse_bool_string(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn parse_number_string(s: &str) -> Option<Number> {
    let trimmed = s.trim();
    if let Ok(int) = trimmed.parse::<i64>() {
        return Some(Number::from(int));
    }
    trimmed.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Check a leaf value against the intersection of the operator's and the
/// column's allowed type sets. Null and `{{...}}` templates skip the check;
/// enum columns additionally enforce membership.
fn validate_leaf_value(
    field: &str,
    column: &ColumnSchema,
    operator: Operator,
    value: &JsonValue,
) -> Result<(), Error> {
    if value.is_null() || validator::is_template_value(value) {
        return Ok(());
    }

    let context = column.column_type.validation_type();
    let inferred = types::infer_type(value, context);
    let operator_types = registry::allowed_types(operator);
    let column_types = registry::allowed_types_for_column(&column.column_type);
    let allowed: Vec<Option<PrimitiveType>> = operator_types
        .iter()
        .filter(|t| column_types.contains(t))
        .copied()
        .collect();

    if !allowed.contains(&inferred) {
        tracing::debug!(field, operator = %operator, "leaf value type rejected");
        let expected: Vec<String> = allowed
            .iter()
            .filter_map(|t| t.map(|p| p.to_string()))
            .collect();
        return Err(Error::TypeMismatch(format!(
            "The given value has a wrong type for '{}': {}.\n Expects [{}]",
            field,
            match value {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            },
            expected.join(", ")
        )));
    }

    if context == PrimitiveType::Enum {
        validator::validate_value(field, column, value)?;
    }
    Ok(())
}
