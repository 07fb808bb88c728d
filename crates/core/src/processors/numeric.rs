// ABOUTME: Best-effort numeric coercion processors ToInt and ToFloat.
// ABOUTME: Thousands separators are stripped; unparsable input falls back to a configured default.

use super::Processor;
use crate::value::Value;

/// Parses a scraped number like `" 1,234.5 "` into an `f64`.
fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Str(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Converts to an integer, truncating fractional input.
///
/// Returns the configured default (none unless overridden) when the value
/// cannot be read as a finite number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToInt {
    default: Option<i64>,
}

impl ToInt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(default: i64) -> Self {
        Self {
            default: Some(default),
        }
    }

    pub fn convert(&self, value: &Value) -> Option<i64> {
        if let Value::Int(i) = value {
            return Some(*i);
        }
        if let Value::Str(s) = value {
            if let Ok(i) = s.trim().replace(',', "").parse::<i64>() {
                return Some(i);
            }
        }
        let f = coerce_f64(value)?;
        let truncated = f.trunc();
        if truncated.is_finite() && truncated >= i64::MIN as f64 && truncated < i64::MAX as f64 {
            Some(truncated as i64)
        } else {
            None
        }
    }
}

impl Processor for ToInt {
    fn apply(&self, value: &Value) -> Option<Value> {
        self.convert(value).or(self.default).map(Value::Int)
    }
}

/// Converts to a float; see [`ToInt`] for the input rules.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ToFloat {
    default: Option<f64>,
}

impl ToFloat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(default: f64) -> Self {
        Self {
            default: Some(default),
        }
    }

    pub fn convert(&self, value: &Value) -> Option<f64> {
        coerce_f64(value)
    }
}

impl Processor for ToFloat {
    fn apply(&self, value: &Value) -> Option<Value> {
        self.convert(value).or(self.default).map(Value::Float)
    }
}
