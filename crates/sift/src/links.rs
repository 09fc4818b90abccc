//! Cross-table reference resolution.
//!
//! Resolution runs against a stable, fully-cast snapshot of every table:
//! the referenced table's cast stage has completed before any row resolves
//! links into it. Resolution is read-only; copying values from a target row
//! into the source row is the row compute's job.

use indexmap::IndexMap;

use crate::cast;
use crate::record::{Annotation, Record, RecordStore};
use crate::schema::{FieldDef, Relationship, Workbook};
use crate::value::Value;

/// The outcome of resolving one reference field on one row.
#[derive(Debug, Clone, Default)]
pub struct ResolvedLink {
    /// Matching target rows, in the target table's insertion order.
    pub records: Vec<Record>,
    /// Annotations to attach to the source row (ambiguous or missing match).
    pub annotations: Vec<Annotation>,
}

/// Resolves declared references against an immutable workbook snapshot.
pub struct LinkResolver<'a> {
    workbook: &'a Workbook,
    snapshot: &'a IndexMap<String, RecordStore>,
}

impl<'a> LinkResolver<'a> {
    pub fn new(workbook: &'a Workbook, snapshot: &'a IndexMap<String, RecordStore>) -> Self {
        Self { workbook, snapshot }
    }

    /// Resolve a reference field on a record.
    ///
    /// The source value is cast with the target field's definition before
    /// exact-equality matching. A `has-one` reference with several matches
    /// keeps the first by insertion order and attaches a warning; a missing
    /// match is an error only when the field is required.
    pub fn resolve(&self, key: &str, field: &FieldDef, record: &Record) -> ResolvedLink {
        let Some(reference) = field.as_reference() else {
            return ResolvedLink::default();
        };

        let raw = record.get(key);
        if raw.is_nil() {
            // Absent source value: the required check already covers this.
            return ResolvedLink::default();
        }

        // Validated at load time; both lookups are guaranteed to succeed.
        let Some(target_table) = self.workbook.get_table(&reference.table) else {
            return ResolvedLink::default();
        };
        let Some(target_field) = target_table.get_field(&reference.foreign_key) else {
            return ResolvedLink::default();
        };

        let match_value = match cast::cast(target_field, raw) {
            Ok(value) if !value.is_nil() => value,
            _ => Value::Null,
        };

        let mut link = ResolvedLink::default();
        if match_value.is_nil() {
            if field.required {
                link.annotations.push(missing(key, reference, raw));
            }
            return link;
        }

        if let Some(store) = self.snapshot.get(&reference.table) {
            link.records = store
                .records()
                .iter()
                .filter(|target| *target.get(&reference.foreign_key) == match_value)
                .cloned()
                .collect();
        }

        match reference.relationship {
            Relationship::HasOne => {
                if link.records.len() > 1 {
                    link.annotations.push(Annotation::warning(
                        key,
                        format!(
                            "Multiple rows in '{}' match '{}'; using the first",
                            reference.table, match_value
                        ),
                    ));
                    link.records.truncate(1);
                }
                if link.records.is_empty() && field.required {
                    link.annotations.push(missing(key, reference, raw));
                }
            }
            Relationship::HasMany => {
                if link.records.is_empty() && field.required {
                    link.annotations.push(missing(key, reference, raw));
                }
            }
        }

        link
    }
}

fn missing(key: &str, reference: &crate::schema::Reference, raw: &Value) -> Annotation {
    Annotation::error(
        key,
        format!("No row in '{}' matches '{}'", reference.table, raw),
    )
}
