//! A single record (row) with values and accumulated annotations.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::value::Value;

use super::annotation::{Annotation, IntoKeys, Severity};

static NULL: Value = Value::Null;

/// Processing stage of a row within one pipeline pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStage {
    /// Not yet processed.
    Pending,
    /// Raw values cast to their declared kinds.
    FieldCast,
    /// Builtin and custom field validators applied.
    FieldValidate,
    /// Row-level compute hook running or complete.
    RowCompute,
    /// Terminal: final values and full annotation set attached.
    Finalized,
}

/// One record of data conforming to a table's field set.
///
/// Values are keyed by field key in insertion order. Annotations accumulate
/// per field; an annotation naming several fields is listed under each.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    values: IndexMap<String, Value>,
    annotations: IndexMap<String, Vec<Annotation>>,
    row_annotations: Vec<Annotation>,
    stage: RowStage,
}

impl Record {
    /// Create a record from raw field values.
    pub fn new(values: IndexMap<String, Value>) -> Self {
        Self {
            values,
            annotations: IndexMap::new(),
            row_annotations: Vec::new(),
            stage: RowStage::Pending,
        }
    }

    /// Get a field value. Absent fields read as `Value::Null`.
    pub fn get(&self, key: &str) -> &Value {
        self.values.get(key).unwrap_or(&NULL)
    }

    /// Set a field value, overwriting any existing value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// All field values in insertion order.
    pub fn values(&self) -> &IndexMap<String, Value> {
        &self.values
    }

    /// Attach an annotation under each of its target fields.
    ///
    /// Deduplicated by (field, message): re-adding the same message to the
    /// same field is a no-op, so idempotent hooks never double-annotate.
    pub fn annotate(&mut self, annotation: Annotation) {
        if annotation.keys.is_empty() {
            if !self
                .row_annotations
                .iter()
                .any(|a| a.message == annotation.message)
            {
                self.row_annotations.push(annotation);
            }
            return;
        }
        for key in &annotation.keys {
            let entries = self.annotations.entry(key.clone()).or_default();
            if !entries.iter().any(|a| a.message == annotation.message) {
                entries.push(annotation.clone());
            }
        }
    }

    /// Attach an error annotation to one or more fields.
    pub fn add_error(&mut self, keys: impl IntoKeys, message: impl Into<String>) {
        self.annotate(Annotation::error(keys, message));
    }

    /// Attach a warning annotation to one or more fields.
    pub fn add_warning(&mut self, keys: impl IntoKeys, message: impl Into<String>) {
        self.annotate(Annotation::warning(keys, message));
    }

    /// Attach an info annotation to one or more fields.
    pub fn add_info(&mut self, keys: impl IntoKeys, message: impl Into<String>) {
        self.annotate(Annotation::info(keys, message));
    }

    /// Attach an error annotation to the row as a whole.
    pub fn add_row_error(&mut self, message: impl Into<String>) {
        self.annotate(Annotation::new(Severity::Error, Vec::new(), message));
    }

    /// Annotations attached to a single field, in the order they were added.
    pub fn field_annotations(&self, key: &str) -> &[Annotation] {
        self.annotations.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Row-level annotations (no target field).
    pub fn row_annotations(&self) -> &[Annotation] {
        &self.row_annotations
    }

    /// Iterate every annotation entry on this record.
    pub fn all_annotations(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations
            .values()
            .flatten()
            .chain(self.row_annotations.iter())
    }

    /// True if any error annotation is attached; an invalid row must not be
    /// accepted downstream.
    pub fn is_invalid(&self) -> bool {
        self.all_annotations()
            .any(|a| a.severity == Severity::Error)
    }

    /// Current processing stage.
    pub fn stage(&self) -> RowStage {
        self.stage
    }

    /// Stages only move forward; a repeated pass over an already-finalized
    /// row leaves it finalized.
    pub(crate) fn advance(&mut self, stage: RowStage) {
        if stage > self.stage {
            self.stage = stage;
        }
    }
}
