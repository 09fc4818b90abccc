//! Casting raw values to their declared field kinds, plus builtin checks.
//!
//! Everything here is pure: no cast or check ever mutates a record. Absent
//! input (null or empty text) passes through as `Value::Null` and is never
//! coerced to zero, epoch, or false.

use chrono::NaiveDate;

use crate::error::CastError;
use crate::record::Annotation;
use crate::schema::{FieldDef, FieldKind, OptionChoice};
use crate::value::Value;

/// Date formats accepted by the date kind, tried in order.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%b %d %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%B %d, %Y",
];

/// Cast a raw value to the field's declared kind.
///
/// Reference and computed fields pass their raw value through: references
/// are matched against the target table at resolution time, and computed
/// values are produced by the evaluator.
pub fn cast(field: &FieldDef, raw: &Value) -> Result<Value, CastError> {
    if raw.is_nil() {
        return Ok(Value::Null);
    }

    match &field.kind {
        FieldKind::Text => cast_text(raw),
        FieldKind::Number => cast_number(raw),
        FieldKind::Boolean => cast_boolean(raw),
        FieldKind::Date => cast_date(raw),
        FieldKind::Option { options } => cast_option(raw, options),
        FieldKind::Reference(_) | FieldKind::Computed(_) => Ok(raw.clone()),
    }
}

/// Builtin per-field checks: `required` (error when absent with no default).
///
/// Option membership is enforced by [`cast`]; `unique` is deferred to the
/// store-wide duplicate check.
pub fn builtin_checks(key: &str, field: &FieldDef, value: &Value) -> Vec<Annotation> {
    let mut annotations = Vec::new();
    if field.required && value.is_nil() && field.default.is_none() {
        annotations.push(Annotation::error(
            key,
            format!("'{}' is required", field.label),
        ));
    }
    annotations
}

fn cast_text(raw: &Value) -> Result<Value, CastError> {
    match raw {
        Value::Text(_) => Ok(raw.clone()),
        Value::Number(_) | Value::Bool(_) | Value::Date(_) => Ok(Value::Text(raw.to_string())),
        Value::Null => Ok(Value::Null),
    }
}

fn cast_number(raw: &Value) -> Result<Value, CastError> {
    match raw {
        Value::Number(_) => Ok(raw.clone()),
        Value::Text(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Number)
            .map_err(|_| CastError::new(s, "number", "not a number")),
        other => Err(CastError::new(other, "number", "wrong type")),
    }
}

fn cast_boolean(raw: &Value) -> Result<Value, CastError> {
    match raw {
        Value::Bool(_) => Ok(raw.clone()),
        Value::Text(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "y" | "t" | "1" => Ok(Value::Bool(true)),
            "false" | "no" | "n" | "f" | "0" => Ok(Value::Bool(false)),
            _ => Err(CastError::new(s, "boolean", "not a recognised boolean")),
        },
        other => Err(CastError::new(other, "boolean", "wrong type")),
    }
}

fn cast_date(raw: &Value) -> Result<Value, CastError> {
    match raw {
        Value::Date(_) => Ok(raw.clone()),
        Value::Text(s) => parse_date(s.trim())
            .map(Value::Date)
            .ok_or_else(|| CastError::new(s, "date", "unparsable date")),
        other => Err(CastError::new(other, "date", "wrong type")),
    }
}

fn cast_option(raw: &Value, options: &[OptionChoice]) -> Result<Value, CastError> {
    let text = raw.to_string();
    let trimmed = text.trim();

    // Option keys win over labels when both match.
    if let Some(choice) = options.iter().find(|c| c.key == trimmed) {
        return Ok(Value::Text(choice.key.clone()));
    }
    if let Some(choice) = options.iter().find(|c| c.label == trimmed) {
        return Ok(Value::Text(choice.key.clone()));
    }
    Err(CastError::new(trimmed, "option", "no matching option"))
}

/// Parse a date in any of the accepted formats.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}
