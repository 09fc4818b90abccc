//! Computed-field evaluation.
//!
//! A computed field derives its value from other fields in the same row,
//! synchronously, once per processing pass. It may not read other tables
//! except through links staged into the row by the row-level compute step.

use indexmap::IndexMap;

use crate::error::ComputeFailure;
use crate::record::Record;
use crate::schema::ComputedField;
use crate::value::Value;

static NULL: Value = Value::Null;

/// Nil-safe view of the fields a computed field declared it reads.
///
/// Strict dependencies are always present; advisory (`possibly_depends_on`)
/// fields that carry no value read as `Value::Null` rather than failing.
#[derive(Debug, Clone)]
pub struct ComputeInputs {
    values: IndexMap<String, Value>,
}

impl ComputeInputs {
    /// Get a declared input. Absent inputs read as `Value::Null`.
    pub fn get(&self, key: &str) -> &Value {
        self.values.get(key).unwrap_or(&NULL)
    }

    /// Text content of an input, if present and textual.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).as_text()
    }

    /// All gathered inputs in declaration order.
    pub fn values(&self) -> &IndexMap<String, Value> {
        &self.values
    }
}

/// Gather the declared dependency values out of a record.
pub(crate) fn gather(record: &Record, computed: &ComputedField) -> ComputeInputs {
    let mut values = IndexMap::new();
    for key in computed.all_dependencies() {
        values.insert(key.to_string(), record.get(key).clone());
    }
    ComputeInputs { values }
}

/// Evaluate a computed field against a record.
pub(crate) fn evaluate(record: &Record, computed: &ComputedField) -> Result<Value, ComputeFailure> {
    let inputs = gather(record, computed);
    (computed.compute)(&inputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> Record {
        let mut values = IndexMap::new();
        for (k, v) in pairs {
            values.insert(k.to_string(), Value::from(*v));
        }
        Record::new(values)
    }

    fn full_name() -> ComputedField {
        ComputedField::new(|inputs| {
            let parts: Vec<&str> = ["firstName", "middleName", "lastName"]
                .iter()
                .filter_map(|key| {
                    let value = inputs.get(key);
                    if value.is_nil() { None } else { value.as_text() }
                })
                .collect();
            Ok(Value::from(parts.join(" ")))
        })
        .possibly_depends_on(["firstName", "middleName", "lastName"])
    }

    #[test]
    fn test_advisory_inputs_are_nil_safe() {
        // middleName entirely missing from the row, not just empty
        let rec = record(&[("firstName", "Ada"), ("lastName", "Lovelace")]);
        let value = evaluate(&rec, &full_name()).unwrap();
        assert_eq!(value, Value::from("Ada Lovelace"));
    }

    #[test]
    fn test_all_inputs_present() {
        let rec = record(&[
            ("firstName", "Ada"),
            ("middleName", "King"),
            ("lastName", "Lovelace"),
        ]);
        let value = evaluate(&rec, &full_name()).unwrap();
        assert_eq!(value, Value::from("Ada King Lovelace"));
    }

    #[test]
    fn test_compute_failure_is_a_value() {
        let failing = ComputedField::new(|_| Err(ComputeFailure::new("boom")));
        let rec = record(&[]);
        assert_eq!(evaluate(&rec, &failing), Err(ComputeFailure::new("boom")));
    }
}
