// ABOUTME: Runs a value list through an ordered processor chain and a reducer.
// ABOUTME: Elements that yield nothing are dropped per stage; a run never fails.

//! The processor-chain runner.
//!
//! Input is normalized into a list (a scalar becomes a singleton, absence
//! becomes empty). Each stage applies its processor to every non-empty
//! element independently; `None` or empty outputs are dropped and list
//! outputs are flattened one level. Once a stage leaves nothing behind the
//! remaining stages are skipped. The reducer then picks the result.

use std::fmt;

use tracing::trace;

use crate::magic::MagicList;
use crate::processors::Processor;
use crate::reducers::{FirstTruthy, Reducer};
use crate::select::Select;
use crate::value::Value;

/// Diagnostics for a single pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Elements a processor turned into nothing.
    pub skipped: usize,
    /// Stages that actually ran.
    pub stages_run: usize,
    /// True when the list emptied before the last stage.
    pub short_circuited: bool,
}

/// An immutable processor chain plus reducer.
pub struct Pipeline {
    processors: Vec<Box<dyn Processor>>,
    reducer: Box<dyn Reducer>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            processors: Vec::new(),
            reducer: Box::new(FirstTruthy::default()),
        }
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.processors.len())
            .finish_non_exhaustive()
    }
}

/// Normalizes a raw field value into the list a chain operates on.
pub fn normalize(input: Option<Value>) -> MagicList<Value> {
    match input {
        None => MagicList::new(),
        Some(Value::List(items)) => items,
        Some(other) => MagicList::from(vec![other]),
    }
}

impl Pipeline {
    /// An empty chain reducing with [`FirstTruthy`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a processor stage.
    pub fn then<P: Processor + 'static>(self, processor: P) -> Self {
        self.then_boxed(Box::new(processor))
    }

    pub fn then_boxed(mut self, processor: Box<dyn Processor>) -> Self {
        self.processors.push(processor);
        self
    }

    /// Replaces the reducer.
    pub fn reduce<R: Reducer + 'static>(self, reducer: R) -> Self {
        self.reduce_boxed(Box::new(reducer))
    }

    pub fn reduce_boxed(mut self, reducer: Box<dyn Reducer>) -> Self {
        self.reducer = reducer;
        self
    }

    /// Number of processor stages.
    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Runs the processor stages only, returning the list the reducer would see.
    pub fn apply_chain(&self, input: impl Into<Option<Value>>) -> (MagicList<Value>, RunReport) {
        let mut report = RunReport::default();
        let mut values = normalize(input.into());

        for (stage, processor) in self.processors.iter().enumerate() {
            if values.is_empty() {
                report.short_circuited = true;
                trace!(stage, "chain emptied, skipping remaining stages");
                break;
            }
            report.stages_run += 1;

            let mut next = MagicList::new();
            for value in values.iter().filter(|v| !v.is_empty()) {
                match processor.apply(value) {
                    Some(Value::List(items)) if !items.is_empty() => {
                        let before = next.len();
                        next.extend(items.into_iter().filter(|v| !v.is_empty()));
                        if next.len() == before {
                            report.skipped += 1;
                            trace!(stage, input = %value, "element split into nothing");
                        }
                    }
                    Some(out) if !out.is_empty() => next.push(out),
                    _ => {
                        report.skipped += 1;
                        trace!(stage, input = %value, "element dropped");
                    }
                }
            }
            values = next;
        }

        (values, report)
    }

    /// Runs the chain and the reducer, also returning run diagnostics.
    pub fn run_with_report(&self, input: impl Into<Option<Value>>) -> (Option<Value>, RunReport) {
        let (values, report) = self.apply_chain(input);
        (self.reducer.reduce(values), report)
    }

    /// Runs the chain and the reducer.
    pub fn run(&self, input: impl Into<Option<Value>>) -> Option<Value> {
        self.run_with_report(input).0
    }

    /// Runs the pipeline over the raw values `source` returns for `query`.
    pub fn extract<S: Select + ?Sized>(&self, source: &S, query: &str) -> Option<Value> {
        self.run(Value::List(source.select(query)))
    }
}
