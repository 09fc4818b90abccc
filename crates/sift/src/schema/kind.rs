//! Field kinds and their per-kind configuration.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::compute::ComputeInputs;
use crate::error::ComputeFailure;
use crate::value::Value;

/// Relationship cardinality for reference fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Relationship {
    /// At most one matching target row.
    HasOne,
    /// Any number of matching target rows.
    HasMany,
}

/// A declared link from a field to a matching field in another table.
///
/// Resolution is read-only: it never mutates the target row. Copying values
/// from target to source is the row compute's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    /// Target table name.
    pub table: String,
    /// Field key in the target table used as the match key.
    pub foreign_key: String,
    /// Cardinality of the link.
    pub relationship: Relationship,
}

/// One selectable option of an option field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionChoice {
    /// Stored key.
    pub key: String,
    /// Display label; incoming labels normalise to the key at cast.
    pub label: String,
}

impl OptionChoice {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// Derivation hook for a computed field.
pub type ComputedFn = Arc<dyn Fn(&ComputeInputs) -> Result<Value, ComputeFailure> + Send + Sync>;

/// Configuration of a computed (derived) field.
#[derive(Clone)]
pub struct ComputedField {
    /// Fields the derivation always reads; checked at load time and always
    /// supplied to the hook.
    pub depends_on: Vec<String>,
    /// Fields the derivation may read; absent ones arrive as `Value::Null`,
    /// never as a missing-key failure.
    pub possibly_depends_on: Vec<String>,
    /// The derivation itself.
    pub compute: ComputedFn,
}

impl ComputedField {
    /// Create a computed field with the given derivation hook.
    pub fn new(
        compute: impl Fn(&ComputeInputs) -> Result<Value, ComputeFailure> + Send + Sync + 'static,
    ) -> Self {
        Self {
            depends_on: Vec::new(),
            possibly_depends_on: Vec::new(),
            compute: Arc::new(compute),
        }
    }

    /// Declare strict dependencies.
    pub fn depends_on<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Declare advisory ("may read") dependencies.
    pub fn possibly_depends_on<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.possibly_depends_on = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Strict and advisory dependency keys, strict first.
    pub fn all_dependencies(&self) -> impl Iterator<Item = &str> {
        self.depends_on
            .iter()
            .chain(self.possibly_depends_on.iter())
            .map(String::as_str)
    }
}

impl fmt::Debug for ComputedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputedField")
            .field("depends_on", &self.depends_on)
            .field("possibly_depends_on", &self.possibly_depends_on)
            .field("compute", &"<fn>")
            .finish()
    }
}

/// The kind of a field. Exactly one per field definition.
///
/// Each kind carries its full configuration as an explicit structure; there
/// is no bag of arbitrary extra options, so unknown settings are
/// unrepresentable rather than silently ignored.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Free text.
    Text,
    /// Floating-point number.
    Number,
    /// Boolean value.
    Boolean,
    /// Calendar date.
    Date,
    /// Single-select from a fixed option set.
    Option { options: Vec<OptionChoice> },
    /// Foreign-key-style link to another table.
    Reference(Reference),
    /// Value derived from other fields in the same row.
    Computed(ComputedField),
}

impl FieldKind {
    /// Short name used in cast failures and messages.
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Date => "date",
            FieldKind::Option { .. } => "option",
            FieldKind::Reference(_) => "reference",
            FieldKind::Computed(_) => "computed",
        }
    }
}
