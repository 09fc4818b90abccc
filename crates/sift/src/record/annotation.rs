//! Severity-tagged messages attached to record fields.

use serde::{Deserialize, Serialize};

/// Severity level of an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational only, may not require action.
    Info,
    /// Potential issue that should be reviewed.
    Warning,
    /// Definite issue; marks the row invalid for downstream acceptance.
    Error,
}

impl Severity {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        }
    }
}

/// A severity-tagged message attached to one or more fields of a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Severity level.
    pub severity: Severity,
    /// Affected field keys. Empty for row-level annotations.
    pub keys: Vec<String>,
    /// Human-readable message.
    pub message: String,
}

impl Annotation {
    /// Create an annotation.
    pub fn new(severity: Severity, keys: impl IntoKeys, message: impl Into<String>) -> Self {
        Self {
            severity,
            keys: keys.into_keys(),
            message: message.into(),
        }
    }

    /// Create an error annotation.
    pub fn error(keys: impl IntoKeys, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, keys, message)
    }

    /// Create a warning annotation.
    pub fn warning(keys: impl IntoKeys, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, keys, message)
    }

    /// Create an info annotation.
    pub fn info(keys: impl IntoKeys, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, keys, message)
    }
}

/// Outcome unit returned by field validator hooks.
///
/// Validators signal problems by returning messages instead of raising;
/// an empty list means the value passed.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Severity of the resulting annotation.
    pub severity: Severity,
    /// Message text.
    pub text: String,
}

impl Message {
    /// An error-level message.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            text: text.into(),
        }
    }

    /// A warning-level message.
    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            text: text.into(),
        }
    }

    /// An info-level message.
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            text: text.into(),
        }
    }
}

/// Conversion of the various ways callers name target fields into a key list.
pub trait IntoKeys {
    fn into_keys(self) -> Vec<String>;
}

impl IntoKeys for &str {
    fn into_keys(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoKeys for String {
    fn into_keys(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoKeys for Vec<String> {
    fn into_keys(self) -> Vec<String> {
        self
    }
}

impl IntoKeys for &[&str] {
    fn into_keys(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl<const N: usize> IntoKeys for [&str; N] {
    fn into_keys(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}
