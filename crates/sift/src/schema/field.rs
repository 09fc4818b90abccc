//! Field definitions: one typed column within a table.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::record::Message;
use crate::value::Value;

use super::kind::{ComputedField, FieldKind, OptionChoice, Reference, Relationship};

/// Per-field normalisation hook, applied after a successful cast.
pub type FieldComputeFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Per-field custom validator. Returns messages instead of raising; an empty
/// list means the value passed.
pub type FieldValidateFn = Arc<dyn Fn(&Value) -> Vec<Message> + Send + Sync>;

/// Which external platform stages show this field.
///
/// Metadata for the hosting collaborator; the pipeline itself ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageVisibility {
    pub mapping: bool,
    pub review: bool,
    pub export: bool,
}

impl Default for StageVisibility {
    fn default() -> Self {
        Self {
            mapping: true,
            review: true,
            export: true,
        }
    }
}

/// Definition of a single typed column within a table.
///
/// Static configuration: built once at startup and immutable afterwards.
#[derive(Clone)]
pub struct FieldDef {
    /// Display label.
    pub label: String,
    /// Optional description for the hosting platform's UI.
    pub description: Option<String>,
    /// The field's kind, exactly one.
    pub kind: FieldKind,
    /// Absent value (with no default) is an error.
    pub required: bool,
    /// Cast value must be unique across the table; checked store-wide.
    pub unique: bool,
    /// Substituted when the raw value is absent.
    pub default: Option<Value>,
    /// Normalisation hook applied after a successful cast.
    pub compute: Option<FieldComputeFn>,
    /// Custom validator run after the builtin checks.
    pub validate: Option<FieldValidateFn>,
    /// Visibility flags per platform stage.
    pub stage_visibility: StageVisibility,
}

impl FieldDef {
    fn with_kind(label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            label: label.into(),
            description: None,
            kind,
            required: false,
            unique: false,
            default: None,
            compute: None,
            validate: None,
            stage_visibility: StageVisibility::default(),
        }
    }

    /// A free-text field.
    pub fn text(label: impl Into<String>) -> Self {
        Self::with_kind(label, FieldKind::Text)
    }

    /// A numeric field.
    pub fn number(label: impl Into<String>) -> Self {
        Self::with_kind(label, FieldKind::Number)
    }

    /// A boolean field.
    pub fn boolean(label: impl Into<String>) -> Self {
        Self::with_kind(label, FieldKind::Boolean)
    }

    /// A date field.
    pub fn date(label: impl Into<String>) -> Self {
        Self::with_kind(label, FieldKind::Date)
    }

    /// A single-select field with a fixed option set.
    pub fn options(label: impl Into<String>, options: Vec<OptionChoice>) -> Self {
        Self::with_kind(label, FieldKind::Option { options })
    }

    /// A reference field linking to `table.foreign_key`.
    pub fn reference(
        label: impl Into<String>,
        table: impl Into<String>,
        foreign_key: impl Into<String>,
        relationship: Relationship,
    ) -> Self {
        Self::with_kind(
            label,
            FieldKind::Reference(Reference {
                table: table.into(),
                foreign_key: foreign_key.into(),
                relationship,
            }),
        )
    }

    /// A computed field derived from other fields in the same row.
    pub fn computed(label: impl Into<String>, computed: ComputedField) -> Self {
        Self::with_kind(label, FieldKind::Computed(computed))
    }

    /// Mark the field required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark the field unique across the table.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Set a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set a default value, substituted when the raw value is absent.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Attach a post-cast normalisation hook.
    pub fn with_compute(mut self, compute: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        self.compute = Some(Arc::new(compute));
        self
    }

    /// Attach a custom validator. Runs after the builtin checks; absent
    /// values are passed through as `Value::Null` rather than skipped.
    pub fn with_validate(
        mut self,
        validate: impl Fn(&Value) -> Vec<Message> + Send + Sync + 'static,
    ) -> Self {
        self.validate = Some(Arc::new(validate));
        self
    }

    /// Set stage visibility flags.
    pub fn with_stage_visibility(mut self, visibility: StageVisibility) -> Self {
        self.stage_visibility = visibility;
        self
    }

    /// Hide the field from the mapping stage.
    pub fn hidden_from_mapping(mut self) -> Self {
        self.stage_visibility.mapping = false;
        self
    }

    /// The declared reference, if this is a reference field.
    pub fn as_reference(&self) -> Option<&Reference> {
        match &self.kind {
            FieldKind::Reference(reference) => Some(reference),
            _ => None,
        }
    }

    /// The computed-field configuration, if this is a computed field.
    pub fn as_computed(&self) -> Option<&ComputedField> {
        match &self.kind {
            FieldKind::Computed(computed) => Some(computed),
            _ => None,
        }
    }
}

impl fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("unique", &self.unique)
            .field("default", &self.default)
            .field("compute", &self.compute.as_ref().map(|_| "<fn>"))
            .field("validate", &self.validate.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
