//! Indian mobile number validation.
//!
//! Accepted shapes after stripping everything except digits and `+`:
//! `+91XXXXXXXXXX`, `91XXXXXXXXXX`, `0XXXXXXXXXX` or `XXXXXXXXXX`, where the
//! ten-digit subscriber number starts with 6, 7, 8 or 9. Accepted input is
//! rendered as `+91 XXXXX XXXXX`.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const INVALID_IDENTIFIER_REASON: &str =
    "Please enter a valid 10-digit Indian phone number (starting with 6, 7, 8, or 9).";

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:\+91|91|0)?[6-9][0-9]{9}$").expect("identifier pattern compiles")
    })
}

/// A number in canonical `+91 XXXXX XXXXX` form. Only [`validate`] builds one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NormalizedIdentifier(String);

impl NormalizedIdentifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for NormalizedIdentifier {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match validate(&value) {
            ValidationOutcome::Valid { normalized } if normalized.as_str() == value => {
                Ok(normalized)
            }
            _ => Err(format!("not a normalized identifier: {value}")),
        }
    }
}

impl From<NormalizedIdentifier> for String {
    fn from(value: NormalizedIdentifier) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid {
        normalized: NormalizedIdentifier,
    },
    Invalid {
        sanitized_attempt: String,
        reason: String,
    },
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid { .. })
    }

    pub fn normalized(&self) -> Option<&NormalizedIdentifier> {
        match self {
            ValidationOutcome::Valid { normalized } => Some(normalized),
            ValidationOutcome::Invalid { .. } => None,
        }
    }
}

/// Keeps ASCII digits and `+`; the pattern only admits `+` in leading position.
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

pub fn validate(raw: &str) -> ValidationOutcome {
    let cleaned = sanitize(raw);
    if !pattern().is_match(&cleaned) {
        return ValidationOutcome::Invalid {
            sanitized_attempt: cleaned,
            reason: INVALID_IDENTIFIER_REASON.to_string(),
        };
    }

    // pattern guarantees at least ten trailing ASCII digits
    let core = &cleaned[cleaned.len() - 10..];
    let normalized = format!("+91 {} {}", &core[..5], &core[5..]);
    ValidationOutcome::Valid {
        normalized: NormalizedIdentifier(normalized),
    }
}
