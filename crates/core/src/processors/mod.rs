// ABOUTME: The Processor trait and the built-in per-element transforms.
// ABOUTME: A processor returns None when an element yields nothing; it never panics or errors.

//! Built-in processors.
//!
//! Every processor is configured once at construction and is stateless
//! afterwards, so a single instance can be shared across threads and
//! reused across pipeline runs.
//!
//! Submodules:
//! - `text`: trimming, splitting, regex find/substitute, joining.
//! - `numeric`: best-effort integer and float coercion.
//! - `time`: absolute and relative date parsing, age from birth date.
//! - `person`: surname/name validation and degree ranking.

pub mod numeric;
pub mod person;
pub mod text;
pub mod time;

use crate::value::Value;

/// A single configurable transformation step in a chain.
///
/// `None` means "this element produced nothing"; the chain runner drops it.
/// Returning `Value::List` fans one element out into several.
pub trait Processor: Send + Sync {
    fn apply(&self, value: &Value) -> Option<Value>;
}

impl<F> Processor for F
where
    F: Fn(&Value) -> Option<Value> + Send + Sync,
{
    fn apply(&self, value: &Value) -> Option<Value> {
        self(value)
    }
}

pub use numeric::{ToFloat, ToInt};
pub use person::{HighestDegreeExtract, NameValidate, SurnameValidate};
pub use text::{Join, RegexFind, RegexSplit, RegexSub, Split, Strip};
pub use time::{FormatTime, RelativeDateResolve, ToAge};
