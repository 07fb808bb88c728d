// ABOUTME: Wraps already-extracted raw values so they can run through a pipeline.
// ABOUTME: Absence becomes an empty list and a scalar a singleton.

use sift_core::{normalize, MagicList, Pipeline, RunReport, Select, Value};

/// Raw values with no document behind them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComposeLoader {
    values: MagicList<Value>,
}

impl ComposeLoader {
    pub fn new(values: impl Into<Option<Value>>) -> Self {
        Self {
            values: normalize(values.into()),
        }
    }

    pub fn values(&self) -> &MagicList<Value> {
        &self.values
    }

    pub fn proc(&self, pipeline: &Pipeline) -> Option<Value> {
        pipeline.run(Value::List(self.values.clone()))
    }

    pub fn proc_with_report(&self, pipeline: &Pipeline) -> (Option<Value>, RunReport) {
        pipeline.run_with_report(Value::List(self.values.clone()))
    }
}

/// Every query selects all of the wrapped values.
impl Select for ComposeLoader {
    fn select(&self, _query: &str) -> MagicList<Value> {
        self.values.clone()
    }
}
