//! Builtin format patterns for common field contents.
//!
//! Ready-made checks for values whose shape matters (emails, phone numbers)
//! that hooks can reuse instead of hand-rolling regexes. A failed check only
//! annotates; the value itself is never rewritten.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::record::{Message, Severity};
use crate::schema::FieldValidateFn;
use crate::value::Value;
use std::sync::Arc;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[\d\s\-\(\)\.]{7,}$").unwrap());
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://[^\s]+$").unwrap());
static POSTAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{5}(-\d{4})?$").unwrap());

/// A recognised value format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Email address.
    Email,
    /// Phone number (loose: digits, spaces, separators).
    Phone,
    /// http/https URL.
    Url,
    /// US ZIP code.
    PostalCode,
}

impl Pattern {
    fn regex(&self) -> &'static Regex {
        match self {
            Pattern::Email => &EMAIL_RE,
            Pattern::Phone => &PHONE_RE,
            Pattern::Url => &URL_RE,
            Pattern::PostalCode => &POSTAL_RE,
        }
    }

    /// Human-readable format name for messages.
    pub fn description(&self) -> &'static str {
        match self {
            Pattern::Email => "email address",
            Pattern::Phone => "phone number",
            Pattern::Url => "URL",
            Pattern::PostalCode => "postal code",
        }
    }

    /// Check a raw string against this format.
    pub fn matches(&self, value: &str) -> bool {
        self.regex().is_match(value.trim())
    }

    /// Build a field validator that flags non-matching text at the given
    /// severity. Absent and non-text values pass untouched.
    pub fn validator(self, severity: Severity) -> FieldValidateFn {
        Arc::new(move |value: &Value| match value.as_text() {
            Some(text) if !value.is_nil() && !self.matches(text) => vec![Message {
                severity,
                text: format!("Not a valid {}.", self.description()),
            }],
            _ => Vec::new(),
        })
    }
}

/// Normalise a US phone number to `(AAA) BBB-CCCC` national format.
///
/// Accepts ten digits, or eleven with a leading country code of 1; anything
/// else returns `None` and the caller should leave the value as entered.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: Vec<char> = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let digits: &[char] = match digits.len() {
        10 => &digits,
        11 if digits[0] == '1' => &digits[1..],
        _ => return None,
    };
    let s: String = digits.iter().collect();
    Some(format!("({}) {}-{}", &s[..3], &s[3..6], &s[6..]))
}
