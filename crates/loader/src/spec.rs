// ABOUTME: Declarative JSON field specs that build pipelines and extract whole records.
// ABOUTME: Each field names a query, a processor chain and a reducer.

//! Field and record specs.
//!
//! A record spec maps output field names to a query plus a processor
//! chain, so extraction rules can live in configuration:
//!
//! ```json
//! {
//!   "fields": {
//!     "title": { "query": "h1::text", "processors": [{ "type": "strip" }] },
//!     "price": {
//!       "query": "p.price span::text",
//!       "processors": [{ "type": "to_int", "default": 0 }]
//!     },
//!     "tags": {
//!       "query": "ul.tags li::text",
//!       "processors": [{ "type": "strip" }],
//!       "reduce": { "type": "join", "separator": "," }
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use sift_core::processors::{
    FormatTime, HighestDegreeExtract, Join, NameValidate, Processor, RegexFind, RegexSplit,
    RegexSub, RelativeDateResolve, Split, Strip, SurnameValidate, ToAge, ToFloat, ToInt,
};
use sift_core::{
    AllTruthy, FirstTruthy, Identity, IndexPick, JoinReducer, Pipeline, Reducer, Result, Select,
    SiftError, Value,
};

use crate::compiled::precompile_selectors;
use crate::html::css_parts;

/// One processor stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProcessorSpec {
    /// Trim whitespace, or the given characters.
    Strip { chars: Option<String> },
    /// Split on a separator; whitespace runs when unset.
    Split {
        sep: Option<String>,
        max_split: Option<usize>,
    },
    RegexSplit {
        pattern: String,
        max_split: Option<usize>,
    },
    RegexFind { pattern: String },
    RegexSub {
        pattern: String,
        #[serde(default)]
        replacement: String,
        /// Replacements to make; 0 replaces all.
        #[serde(default)]
        count: usize,
    },
    Join {
        #[serde(default)]
        separator: String,
    },
    ToInt { default: Option<i64> },
    ToFloat { default: Option<f64> },
    /// Parse a date/time; `pattern` is a chrono format tried first.
    FormatTime { pattern: Option<String> },
    RelativeDateResolve,
    SurnameValidate { default: Option<String> },
    NameValidate { default: Option<String> },
    HighestDegreeExtract,
    ToAge,
}

impl ProcessorSpec {
    /// Builds the processor. Fails only on invalid regex patterns.
    pub fn build(&self) -> Result<Box<dyn Processor>> {
        let processor: Box<dyn Processor> = match self {
            ProcessorSpec::Strip { chars: None } => Box::new(Strip::new()),
            ProcessorSpec::Strip { chars: Some(chars) } => Box::new(Strip::chars(chars.as_str())),
            ProcessorSpec::Split { sep, max_split } => {
                let split = match sep {
                    Some(sep) => Split::new(sep.as_str()),
                    None => Split::whitespace(),
                };
                match max_split {
                    Some(n) => Box::new(split.max_split(*n)),
                    None => Box::new(split),
                }
            }
            ProcessorSpec::RegexSplit { pattern, max_split } => {
                let split = RegexSplit::new(pattern)?;
                match max_split {
                    Some(n) => Box::new(split.max_split(*n)),
                    None => Box::new(split),
                }
            }
            ProcessorSpec::RegexFind { pattern } => Box::new(RegexFind::new(pattern)?),
            ProcessorSpec::RegexSub {
                pattern,
                replacement,
                count,
            } => Box::new(RegexSub::new(pattern, replacement.as_str())?.count(*count)),
            ProcessorSpec::Join { separator } => Box::new(Join::new(separator.as_str())),
            ProcessorSpec::ToInt { default: None } => Box::new(ToInt::new()),
            ProcessorSpec::ToInt { default: Some(d) } => Box::new(ToInt::with_default(*d)),
            ProcessorSpec::ToFloat { default: None } => Box::new(ToFloat::new()),
            ProcessorSpec::ToFloat { default: Some(d) } => Box::new(ToFloat::with_default(*d)),
            ProcessorSpec::FormatTime { pattern: None } => Box::new(FormatTime::new()),
            ProcessorSpec::FormatTime { pattern: Some(p) } => {
                Box::new(FormatTime::with_pattern(p.as_str()))
            }
            ProcessorSpec::RelativeDateResolve => Box::new(RelativeDateResolve::new()),
            ProcessorSpec::SurnameValidate { default: None } => Box::new(SurnameValidate::new()),
            ProcessorSpec::SurnameValidate { default: Some(d) } => {
                Box::new(SurnameValidate::with_default(d.as_str()))
            }
            ProcessorSpec::NameValidate { default: None } => Box::new(NameValidate::new()),
            ProcessorSpec::NameValidate { default: Some(d) } => {
                Box::new(NameValidate::with_default(d.as_str()))
            }
            ProcessorSpec::HighestDegreeExtract => Box::new(HighestDegreeExtract::new()),
            ProcessorSpec::ToAge => Box::new(ToAge::new()),
        };
        Ok(processor)
    }
}

/// How a field's processed values collapse into one result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReducerSpec {
    /// First non-empty value.
    First { default: Option<Json> },
    /// The whole list.
    Identity,
    Join {
        #[serde(default)]
        separator: String,
        default: Option<Json>,
    },
    Index { index: isize, default: Option<Json> },
    AllTruthy,
}

impl Default for ReducerSpec {
    fn default() -> Self {
        ReducerSpec::First { default: None }
    }
}

impl ReducerSpec {
    pub fn build(&self) -> Box<dyn Reducer> {
        let default = |d: &Option<Json>| d.clone().and_then(Value::from_json);
        match self {
            ReducerSpec::First { default: d } => match default(d) {
                Some(v) => Box::new(FirstTruthy::with_default(v)),
                None => Box::new(FirstTruthy::new()),
            },
            ReducerSpec::Identity => Box::new(Identity),
            ReducerSpec::Join {
                separator,
                default: d,
            } => {
                let join = JoinReducer::new(separator.as_str());
                match default(d) {
                    Some(v) => Box::new(join.with_default(v)),
                    None => Box::new(join),
                }
            }
            ReducerSpec::Index { index, default: d } => {
                let pick = IndexPick::new(*index);
                match default(d) {
                    Some(v) => Box::new(pick.with_default(v)),
                    None => Box::new(pick),
                }
            }
            ReducerSpec::AllTruthy => Box::new(AllTruthy::new()),
        }
    }
}

/// Extraction rule for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub query: String,
    #[serde(default)]
    pub processors: Vec<ProcessorSpec>,
    #[serde(default)]
    pub reduce: ReducerSpec,
}

impl FieldSpec {
    pub fn pipeline(&self) -> Result<Pipeline> {
        let mut pipeline = Pipeline::new();
        for spec in &self.processors {
            pipeline = pipeline.then_boxed(spec.build()?);
        }
        Ok(pipeline.reduce_boxed(self.reduce.build()))
    }
}

/// Named field rules making up one output record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSpec {
    pub fields: BTreeMap<String, FieldSpec>,
}

impl RecordSpec {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| SiftError::spec(e.to_string()))
    }

    /// Builds every field's pipeline, naming the field on failure.
    pub fn compile(&self) -> Result<CompiledRecord> {
        let fields = self
            .fields
            .iter()
            .map(|(name, field)| {
                let pipeline = field
                    .pipeline()
                    .map_err(|e| SiftError::spec(format!("field {name:?}: {e}")))?;
                Ok((name.clone(), field.query.clone(), pipeline))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(CompiledRecord { fields })
    }

    /// Warms the selector cache with every field's CSS.
    pub fn precompile_selectors(&self) {
        precompile_selectors(
            self.fields
                .values()
                .flat_map(|f| css_parts(&f.query)),
        );
    }
}

/// A record spec with its pipelines built, reusable across documents.
#[derive(Debug)]
pub struct CompiledRecord {
    fields: Vec<(String, String, Pipeline)>,
}

impl CompiledRecord {
    /// Extracts one record. Fields that resolve to nothing are `null`.
    pub fn extract<S: Select + ?Sized>(&self, source: &S) -> serde_json::Map<String, Json> {
        self.fields
            .iter()
            .map(|(name, query, pipeline)| {
                let value = pipeline
                    .extract(source, query)
                    .map_or(Json::Null, |v| v.to_json());
                (name.clone(), value)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
