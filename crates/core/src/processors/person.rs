// ABOUTME: Person-field processors: SurnameValidate, NameValidate and HighestDegreeExtract.
// ABOUTME: Names are checked against the surname reference set and honorific markers.

use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;

use super::Processor;
use crate::surnames::surname_of;
use crate::value::Value;

/// Markers that mean the value is a form of address, not a full name.
const HONORIFICS: &[&str] = &["先生", "女士"];

/// Minimum name length in characters.
const MIN_NAME_CHARS: usize = 2;

/// Degrees ranked from highest to lowest.
const DEGREES: &[&str] = &["博士", "硕士", "本科", "大专"];

static DEGREE_MATCHER: Lazy<AhoCorasick> = Lazy::new(|| AhoCorasick::new(DEGREES).unwrap());

/// Returns the surname of a value when it is recognized, else the default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurnameValidate {
    default: Option<String>,
}

impl SurnameValidate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(default: impl Into<String>) -> Self {
        Self {
            default: Some(default.into()),
        }
    }
}

impl Processor for SurnameValidate {
    fn apply(&self, value: &Value) -> Option<Value> {
        value
            .as_str()
            .and_then(surname_of)
            .map(Value::from)
            .or_else(|| self.default.as_deref().map(Value::from))
    }
}

/// Keeps a value only if it looks like a real personal name.
///
/// Rejected: values containing an honorific, values shorter than two
/// characters, and values whose surname is not in the reference set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameValidate {
    default: Option<String>,
}

impl NameValidate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(default: impl Into<String>) -> Self {
        Self {
            default: Some(default.into()),
        }
    }

    pub fn is_valid(name: &str) -> bool {
        !HONORIFICS.iter().any(|h| name.contains(h))
            && name.chars().count() >= MIN_NAME_CHARS
            && surname_of(name).is_some()
    }
}

impl Processor for NameValidate {
    fn apply(&self, value: &Value) -> Option<Value> {
        match value.as_str() {
            Some(name) if Self::is_valid(name) => Some(Value::from(name)),
            _ => self.default.as_deref().map(Value::from),
        }
    }
}

/// Finds the highest-ranked degree keyword mentioned in a value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighestDegreeExtract;

impl HighestDegreeExtract {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, text: &str) -> Option<&'static str> {
        DEGREE_MATCHER
            .find_overlapping_iter(text)
            .map(|m| m.pattern().as_usize())
            .min()
            .map(|rank| DEGREES[rank])
    }
}

impl Processor for HighestDegreeExtract {
    fn apply(&self, value: &Value) -> Option<Value> {
        value
            .as_str()
            .and_then(|s| self.extract(s))
            .map(Value::from)
    }
}
