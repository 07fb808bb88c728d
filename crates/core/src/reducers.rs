// ABOUTME: Reducers collapse a processed value list into the pipeline result.
// ABOUTME: FirstTruthy is the default; failures resolve to each reducer's configured default.

use crate::magic::MagicList;
use crate::processors::Join;
use crate::value::Value;

/// The final step of a pipeline.
pub trait Reducer: Send + Sync {
    fn reduce(&self, values: MagicList<Value>) -> Option<Value>;
}

impl<F> Reducer for F
where
    F: Fn(MagicList<Value>) -> Option<Value> + Send + Sync,
{
    fn reduce(&self, values: MagicList<Value>) -> Option<Value> {
        self(values)
    }
}

/// Returns the first element that is not an empty string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FirstTruthy {
    default: Option<Value>,
}

impl FirstTruthy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(default: impl Into<Value>) -> Self {
        Self {
            default: Some(default.into()),
        }
    }
}

impl Reducer for FirstTruthy {
    fn reduce(&self, values: MagicList<Value>) -> Option<Value> {
        values
            .into_iter()
            .find(|v| !matches!(v, Value::Str(s) if s.is_empty()))
            .or_else(|| self.default.clone())
    }
}

/// Returns the processed list unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity;

impl Reducer for Identity {
    fn reduce(&self, values: MagicList<Value>) -> Option<Value> {
        Some(Value::List(values))
    }
}

/// Joins the list with [`Join`]; falls back to the default when the join fails.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinReducer {
    join: Join,
    default: Option<Value>,
}

impl JoinReducer {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            join: Join::new(separator),
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

impl Reducer for JoinReducer {
    fn reduce(&self, values: MagicList<Value>) -> Option<Value> {
        self.join
            .join(&values)
            .map(Value::from)
            .or_else(|| self.default.clone())
    }
}

/// Picks the element at a fixed (possibly negative) index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexPick {
    index: isize,
    default: Option<Value>,
}

impl IndexPick {
    pub fn new(index: isize) -> Self {
        Self {
            index,
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

impl Reducer for IndexPick {
    fn reduce(&self, mut values: MagicList<Value>) -> Option<Value> {
        values.pop(self.index).or_else(|| self.default.clone())
    }
}

/// Keeps every non-empty element; an empty input yields the default list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllTruthy {
    default: MagicList<Value>,
}

impl AllTruthy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(default: MagicList<Value>) -> Self {
        Self { default }
    }
}

impl Reducer for AllTruthy {
    fn reduce(&self, values: MagicList<Value>) -> Option<Value> {
        if values.is_empty() {
            return Some(Value::List(self.default.clone()));
        }
        Some(Value::List(
            values.into_iter().filter(|v| !v.is_empty()).collect(),
        ))
    }
}
