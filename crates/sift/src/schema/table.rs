//! Table definitions: an ordered field set plus optional row and batch hooks.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::ComputeFailure;
use crate::pipeline::RecordAccess;
use crate::record::Record;

use super::field::FieldDef;

/// Row-level compute hook with read/write access to the row and read access
/// to its resolved references. Expected to be idempotent; failures are caught
/// and recorded as a row-level error annotation.
pub type RecordComputeFn =
    Arc<dyn Fn(&mut RecordAccess<'_>) -> Result<(), ComputeFailure> + Send + Sync>;

/// Table-wide compute hook, run once over the full row set after every row
/// has been cast and validated, before any row-level compute.
pub type BatchComputeFn = Arc<dyn Fn(&mut [Record]) -> Result<(), ComputeFailure> + Send + Sync>;

/// Definition of one table: name, ordered fields, and optional hooks.
#[derive(Clone)]
pub struct TableConfig {
    /// Table name, unique within the workbook.
    pub name: String,
    /// Field definitions in declaration order, keyed by field key.
    pub fields: IndexMap<String, FieldDef>,
    /// Optional row-level compute hook.
    pub record_compute: Option<RecordComputeFn>,
    /// Optional table-wide compute hook.
    pub batch_compute: Option<BatchComputeFn>,
    /// Field keys declared more than once; reported at workbook validation.
    pub(crate) duplicate_keys: Vec<String>,
}

impl TableConfig {
    /// Start a table definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
            record_compute: None,
            batch_compute: None,
            duplicate_keys: Vec::new(),
        }
    }

    /// Declare a field. Declaring the same key twice is a configuration
    /// error surfaced by workbook validation.
    pub fn field(mut self, key: impl Into<String>, def: FieldDef) -> Self {
        let key = key.into();
        if self.fields.contains_key(&key) {
            self.duplicate_keys.push(key);
        } else {
            self.fields.insert(key, def);
        }
        self
    }

    /// Attach a row-level compute hook.
    pub fn with_record_compute(
        mut self,
        hook: impl Fn(&mut RecordAccess<'_>) -> Result<(), ComputeFailure> + Send + Sync + 'static,
    ) -> Self {
        self.record_compute = Some(Arc::new(hook));
        self
    }

    /// Attach a table-wide compute hook.
    pub fn with_batch_compute(
        mut self,
        hook: impl Fn(&mut [Record]) -> Result<(), ComputeFailure> + Send + Sync + 'static,
    ) -> Self {
        self.batch_compute = Some(Arc::new(hook));
        self
    }

    /// Look up a field definition by key.
    pub fn get_field(&self, key: &str) -> Option<&FieldDef> {
        self.fields.get(key)
    }

    /// Field keys in declaration order.
    pub fn field_keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl fmt::Debug for TableConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableConfig")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("record_compute", &self.record_compute.as_ref().map(|_| "<fn>"))
            .field("batch_compute", &self.batch_compute.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
