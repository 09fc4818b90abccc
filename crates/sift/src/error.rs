//! Error types for the sift library.

use thiserror::Error;

/// Fatal configuration problems detected before any row is processed.
///
/// Everything that can go wrong during row processing is recorded as an
/// annotation on the row instead; only a malformed workbook blocks the
/// pipeline from starting.
#[derive(Debug, Error)]
pub enum SiftError {
    /// Two tables in the workbook share a name.
    #[error("duplicate table '{0}' in workbook")]
    DuplicateTable(String),

    /// Two fields in one table share a key.
    #[error("duplicate field key '{key}' in table '{table}'")]
    DuplicateField { table: String, key: String },

    /// A reference field points at a table the workbook does not declare.
    #[error("field '{table}.{key}' references undeclared table '{target}'")]
    UnknownReferenceTable {
        table: String,
        key: String,
        target: String,
    },

    /// A reference field points at a field its target table does not declare.
    #[error("field '{table}.{key}' references unknown field '{target}.{foreign_key}'")]
    UnknownForeignKey {
        table: String,
        key: String,
        target: String,
        foreign_key: String,
    },

    /// A computed field lists a dependency its table does not declare.
    #[error("computed field '{table}.{key}' depends on unknown field '{dependency}'")]
    UnknownDependency {
        table: String,
        key: String,
        dependency: String,
    },

    /// A computed field lists itself as a dependency.
    #[error("computed field '{table}.{key}' depends on itself")]
    SelfDependency { table: String, key: String },

    /// A computed field lists another computed field as a dependency.
    /// Evaluation is single-pass, so chains between computed fields are
    /// rejected up front instead of reading stale values.
    #[error("computed field '{table}.{key}' depends on computed field '{dependency}'")]
    ComputedDependency {
        table: String,
        key: String,
        dependency: String,
    },

    /// An option field declares no options.
    #[error("option field '{table}.{key}' declares no options")]
    EmptyOptions { table: String, key: String },

    /// An option field declares the same option key twice.
    #[error("option field '{table}.{key}' declares duplicate option '{option}'")]
    DuplicateOption {
        table: String,
        key: String,
        option: String,
    },

    /// Input rows were supplied for a table the workbook does not declare.
    #[error("input rows supplied for undeclared table '{0}'")]
    UnknownInputTable(String),
}

/// Result type alias for sift operations.
pub type Result<T> = std::result::Result<T, SiftError>;

/// A raw value could not be coerced to its field's declared kind.
///
/// Never propagated out of the pipeline; converted to an error annotation on
/// the field, with the raw value left in place for downstream steps.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot cast '{value}' to {kind}: {reason}")]
pub struct CastError {
    /// The raw value as text.
    pub value: String,
    /// The declared field kind.
    pub kind: &'static str,
    /// Why the coercion failed.
    pub reason: String,
}

impl CastError {
    pub fn new(value: impl ToString, kind: &'static str, reason: impl Into<String>) -> Self {
        Self {
            value: value.to_string(),
            kind,
            reason: reason.into(),
        }
    }
}

/// Explicit failure returned by a compute hook.
///
/// Caught by the pipeline and converted to an error annotation; processing of
/// the remaining fields and rows continues.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{0}")]
pub struct ComputeFailure(pub String);

impl ComputeFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
