//! The row validation pipeline.
//!
//! Rows move `Pending -> FieldCast -> FieldValidate -> RowCompute ->
//! Finalized`. There is no failure state: every problem found along the way
//! is recorded as an annotation and processing continues, so a single bad
//! value never aborts its row, and a bad row never aborts the pass. Only a
//! malformed workbook (caught before the pipeline starts) is fatal.

use indexmap::IndexMap;

use crate::cast;
use crate::compute;
use crate::links::LinkResolver;
use crate::record::{Annotation, IntoKeys, Record, RecordStore, RowStage};
use crate::schema::{TableConfig, Workbook};
use crate::value::Value;

/// Read/write surface handed to row-level compute hooks.
///
/// Wraps one record plus the links resolved for its reference fields.
/// `set` overwrites, `get` is nil-safe, and annotations dedupe by
/// (field, message), so an idempotent hook can run any number of times.
pub struct RecordAccess<'a> {
    record: &'a mut Record,
    links: &'a IndexMap<String, Vec<Record>>,
}

impl<'a> RecordAccess<'a> {
    pub(crate) fn new(record: &'a mut Record, links: &'a IndexMap<String, Vec<Record>>) -> Self {
        Self { record, links }
    }

    /// Get a field value. Absent fields read as `Value::Null`.
    pub fn get(&self, key: &str) -> &Value {
        self.record.get(key)
    }

    /// Set a field value, overwriting any existing value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.record.set(key, value);
    }

    /// Attach an error annotation to one or more fields.
    pub fn add_error(&mut self, keys: impl IntoKeys, message: impl Into<String>) {
        self.record.add_error(keys, message);
    }

    /// Attach a warning annotation to one or more fields.
    pub fn add_warning(&mut self, keys: impl IntoKeys, message: impl Into<String>) {
        self.record.add_warning(keys, message);
    }

    /// Attach an info annotation to one or more fields.
    pub fn add_info(&mut self, keys: impl IntoKeys, message: impl Into<String>) {
        self.record.add_info(keys, message);
    }

    /// Target rows resolved for a reference field, in the target table's
    /// insertion order. Empty for unresolved or non-reference keys.
    pub fn links(&self, key: &str) -> &[Record] {
        self.links.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Runs one full pass over every table's rows.
pub(crate) struct Pipeline<'a> {
    workbook: &'a Workbook,
}

impl<'a> Pipeline<'a> {
    pub(crate) fn new(workbook: &'a Workbook) -> Self {
        Self { workbook }
    }

    /// Process every store through all stages.
    ///
    /// Cast, uniqueness, validation, and batch compute complete for every
    /// table before any row computes, so reference resolution always reads a
    /// stable, fully-cast snapshot of its target table.
    pub(crate) fn run(&self, stores: &mut IndexMap<String, RecordStore>) {
        for table in self.workbook.tables() {
            let Some(store) = stores.get_mut(&table.name) else {
                continue;
            };

            for record in store.records_mut() {
                cast_stage(table, record);
            }

            for (key, field) in &table.fields {
                if field.unique {
                    store.check_unique(key);
                }
            }

            for record in store.records_mut() {
                validate_stage(table, record);
            }

            batch_stage(table, store);
        }

        let snapshot = stores.clone();
        let resolver = LinkResolver::new(self.workbook, &snapshot);

        for table in self.workbook.tables() {
            let Some(store) = stores.get_mut(&table.name) else {
                continue;
            };
            row_compute_stage(table, store, &resolver);
        }
    }
}

/// Substitute defaults, cast every raw value, then evaluate computed fields.
///
/// A failed cast becomes an error annotation and the raw value stays in
/// place for downstream steps. The per-field compute hook runs only after a
/// successful cast of a present value.
fn cast_stage(table: &TableConfig, record: &mut Record) {
    for (key, field) in &table.fields {
        if field.as_computed().is_some() {
            continue;
        }

        let mut raw = record.get(key).clone();
        if raw.is_nil() {
            match &field.default {
                Some(default) => raw = default.clone(),
                None => {
                    record.set(key.clone(), Value::Null);
                    continue;
                }
            }
        }

        match cast::cast(field, &raw) {
            Ok(value) => {
                let value = match &field.compute {
                    Some(hook) if !value.is_nil() => hook(&value),
                    _ => value,
                };
                record.set(key.clone(), value);
            }
            Err(err) => {
                record.add_error(key.as_str(), err.to_string());
                record.set(key.clone(), raw);
            }
        }
    }

    // Computed fields evaluate last so their dependencies are already cast.
    for (key, field) in &table.fields {
        if let Some(computed) = field.as_computed() {
            match compute::evaluate(record, computed) {
                Ok(value) => record.set(key.clone(), value),
                Err(failure) => record.add_error(key.as_str(), failure.to_string()),
            }
        }
    }

    record.advance(RowStage::FieldCast);
}

/// Builtin checks, then the field's custom validator. The validator sees
/// absent values too (as `Value::Null`), so it can react to missing input.
fn validate_stage(table: &TableConfig, record: &mut Record) {
    for (key, field) in &table.fields {
        let value = record.get(key).clone();

        for annotation in cast::builtin_checks(key, field, &value) {
            record.annotate(annotation);
        }

        if let Some(validate) = &field.validate {
            for message in validate(&value) {
                record.annotate(Annotation::new(message.severity, key.as_str(), message.text));
            }
        }
    }

    record.advance(RowStage::FieldValidate);
}

/// Run the table-wide compute hook, if declared, over the full row set.
fn batch_stage(table: &TableConfig, store: &mut RecordStore) {
    let Some(hook) = &table.batch_compute else {
        return;
    };
    if let Err(failure) = hook(store.records_mut()) {
        for record in store.records_mut() {
            record.add_row_error(format!("Batch compute failed: {}", failure));
        }
    }
}

/// Resolve references, run the row-level compute hook, and finalize.
fn row_compute_stage(table: &TableConfig, store: &mut RecordStore, resolver: &LinkResolver<'_>) {
    for record in store.records_mut() {
        record.advance(RowStage::RowCompute);

        let (links, link_annotations) = resolve_links(table, record, resolver);
        for annotation in link_annotations {
            record.annotate(annotation);
        }

        if let Some(hook) = &table.record_compute {
            let mut access = RecordAccess::new(record, &links);
            if let Err(failure) = hook(&mut access) {
                record.add_row_error(format!("Row compute failed: {}", failure));
            }
        }

        record.advance(RowStage::Finalized);
    }
}

fn resolve_links(
    table: &TableConfig,
    record: &Record,
    resolver: &LinkResolver<'_>,
) -> (IndexMap<String, Vec<Record>>, Vec<Annotation>) {
    let mut links = IndexMap::new();
    let mut annotations = Vec::new();
    for (key, field) in &table.fields {
        if field.as_reference().is_none() {
            continue;
        }
        let resolved = resolver.resolve(key, field, record);
        annotations.extend(resolved.annotations);
        links.insert(key.clone(), resolved.records);
    }
    (links, annotations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ComputeFailure;
    use crate::record::Message;
    use crate::schema::{ComputedField, FieldDef};

    fn rows(pairs: Vec<Vec<(&str, &str)>>) -> RecordStore {
        let raw = pairs
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|(k, v)| (k.to_string(), Value::from(v)))
                    .collect()
            })
            .collect();
        RecordStore::from_rows(raw)
    }

    fn run(workbook: &Workbook, stores: &mut IndexMap<String, RecordStore>) {
        Pipeline::new(workbook).run(stores);
    }

    #[test]
    fn test_every_row_finalized() {
        let workbook = Workbook::new("W")
            .table(TableConfig::new("T").field("name", FieldDef::text("Name")));
        let mut stores = IndexMap::new();
        stores.insert(
            "T".to_string(),
            rows(vec![vec![("name", "a")], vec![("name", "b")]]),
        );
        run(&workbook, &mut stores);

        for record in stores["T"].records() {
            assert_eq!(record.stage(), RowStage::Finalized);
        }
    }

    #[test]
    fn test_cast_error_keeps_raw_and_continues() {
        let workbook = Workbook::new("W").table(
            TableConfig::new("T")
                .field("age", FieldDef::number("Age"))
                .field("name", FieldDef::text("Name").required()),
        );
        let mut stores = IndexMap::new();
        stores.insert("T".to_string(), rows(vec![vec![("age", "fifteen")]]));
        run(&workbook, &mut stores);

        let record = &stores["T"].records()[0];
        // Raw value untouched, error attached, later fields still validated.
        assert_eq!(record.get("age"), &Value::from("fifteen"));
        assert_eq!(record.field_annotations("age").len(), 1);
        assert_eq!(record.field_annotations("name").len(), 1);
    }

    #[test]
    fn test_validator_messages_do_not_stop_other_fields() {
        let workbook = Workbook::new("W").table(
            TableConfig::new("T")
                .field(
                    "first",
                    FieldDef::text("First").with_validate(|v| {
                        if v.as_text() == Some("Joe") {
                            vec![Message::error("Joe don't work here no more")]
                        } else {
                            Vec::new()
                        }
                    }),
                )
                .field("last", FieldDef::text("Last").required()),
        );
        let mut stores = IndexMap::new();
        stores.insert("T".to_string(), rows(vec![vec![("first", "Joe")]]));
        run(&workbook, &mut stores);

        let record = &stores["T"].records()[0];
        assert_eq!(
            record.field_annotations("first")[0].message,
            "Joe don't work here no more"
        );
        assert_eq!(record.field_annotations("last").len(), 1);
    }

    #[test]
    fn test_validator_sees_absent_values() {
        let workbook = Workbook::new("W").table(TableConfig::new("T").field(
            "email",
            FieldDef::text("Email").with_validate(|v| {
                if v.is_nil() {
                    vec![Message::warning("No email on file")]
                } else {
                    Vec::new()
                }
            }),
        ));
        let mut stores = IndexMap::new();
        stores.insert("T".to_string(), rows(vec![vec![("email", "")]]));
        run(&workbook, &mut stores);

        let record = &stores["T"].records()[0];
        assert_eq!(
            record.field_annotations("email")[0].message,
            "No email on file"
        );
        assert!(!record.is_invalid());
    }

    #[test]
    fn test_default_substituted_then_trimmed_by_field_compute() {
        let workbook = Workbook::new("W").table(TableConfig::new("T").field(
            "first",
            FieldDef::text("First")
                .with_default("Unknown")
                .with_compute(|v| match v.as_text() {
                    Some(s) => Value::from(s.trim()),
                    None => v.clone(),
                }),
        ));
        let mut stores = IndexMap::new();
        stores.insert(
            "T".to_string(),
            rows(vec![vec![("first", "  Ada ")], vec![("first", "")]]),
        );
        run(&workbook, &mut stores);

        assert_eq!(stores["T"].records()[0].get("first"), &Value::from("Ada"));
        assert_eq!(stores["T"].records()[1].get("first"), &Value::from("Unknown"));
    }

    #[test]
    fn test_computed_field_evaluates_after_cast() {
        let workbook = Workbook::new("W").table(
            TableConfig::new("T")
                .field("n", FieldDef::number("N"))
                .field(
                    "double",
                    FieldDef::computed(
                        "Double",
                        ComputedField::new(|inputs| {
                            Ok(match inputs.get("n").as_number() {
                                Some(n) => Value::from(n * 2.0),
                                None => Value::Null,
                            })
                        })
                        .depends_on(["n"]),
                    ),
                ),
        );
        let mut stores = IndexMap::new();
        stores.insert("T".to_string(), rows(vec![vec![("n", "21")]]));
        run(&workbook, &mut stores);

        assert_eq!(stores["T"].records()[0].get("double"), &Value::from(42.0));
    }

    #[test]
    fn test_batch_runs_before_row_compute() {
        let workbook = Workbook::new("W").table(
            TableConfig::new("T")
                .field("a", FieldDef::text("A"))
                .field("b", FieldDef::text("B"))
                .with_batch_compute(|records| {
                    for record in records {
                        record.set("a", "from-batch");
                    }
                    Ok(())
                })
                .with_record_compute(|record| {
                    let seen = record.get("a").to_string();
                    record.set("b", seen);
                    Ok(())
                }),
        );
        let mut stores = IndexMap::new();
        stores.insert("T".to_string(), rows(vec![vec![("a", "x")]]));
        run(&workbook, &mut stores);

        assert_eq!(stores["T"].records()[0].get("b"), &Value::from("from-batch"));
    }

    #[test]
    fn test_row_compute_failure_becomes_row_annotation() {
        let workbook = Workbook::new("W").table(
            TableConfig::new("T")
                .field("a", FieldDef::text("A"))
                .with_record_compute(|_| Err(ComputeFailure::new("boom"))),
        );
        let mut stores = IndexMap::new();
        stores.insert("T".to_string(), rows(vec![vec![("a", "x")]]));
        run(&workbook, &mut stores);

        let record = &stores["T"].records()[0];
        assert_eq!(record.stage(), RowStage::Finalized);
        assert_eq!(record.row_annotations().len(), 1);
        assert!(record.is_invalid());
    }

    #[test]
    fn test_row_compute_idempotent_when_rerun() {
        let workbook = Workbook::new("W").table(
            TableConfig::new("T")
                .field("email", FieldDef::text("Email"))
                .field("phone", FieldDef::text("Phone"))
                .with_record_compute(|record| {
                    if record.get("email").is_nil() && record.get("phone").is_nil() {
                        record.add_error(["email", "phone"], "Must include either phone or email");
                    }
                    Ok(())
                }),
        );
        let mut stores = IndexMap::new();
        stores.insert("T".to_string(), rows(vec![vec![("email", "")]]));

        let table = workbook.get_table("T").unwrap();
        run(&workbook, &mut stores);
        let after_first = stores["T"].records()[0].clone();

        // Re-running the row compute step must not duplicate annotations or
        // change values.
        let snapshot = stores.clone();
        let resolver = LinkResolver::new(&workbook, &snapshot);
        row_compute_stage(table, stores.get_mut("T").unwrap(), &resolver);

        let after_second = &stores["T"].records()[0];
        assert_eq!(after_second.values(), after_first.values());
        assert_eq!(
            after_second.all_annotations().count(),
            after_first.all_annotations().count()
        );
    }
}
