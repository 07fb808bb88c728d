// ABOUTME: Core of the sift extraction toolkit: values, null-safe containers, processors and reducers.
// ABOUTME: Re-exports the pipeline API used by sift-loader and the sift CLI.

//! sift-core - processor-chain extraction for scraped field values.
//!
//! Raw values selected from a document flow through an ordered chain of
//! processors and are collapsed by a reducer. Nothing in a run can fail:
//! misses, bad elements and failed reductions all resolve to `None`, an
//! empty value or a configured default.
//!
//! # Example
//!
//! ```
//! use sift_core::{Pipeline, Value};
//! use sift_core::processors::{NameValidate, Strip};
//!
//! let names = Pipeline::new().then(Strip::new()).then(NameValidate::new());
//! let raw = Value::list(["  zhangsan先生  ", "  李四 "]);
//! assert_eq!(names.run(raw), Some(Value::from("李四")));
//! ```

pub mod error;
pub mod http_strings;
pub mod magic;
pub mod pipeline;
pub mod processors;
pub mod reducers;
pub mod select;
pub mod surnames;
pub mod value;

pub use crate::error::{Result, SiftError};
pub use crate::magic::{MagicList, MagicStr};
pub use crate::pipeline::{normalize, Pipeline, RunReport};
pub use crate::processors::Processor;
pub use crate::reducers::{AllTruthy, FirstTruthy, Identity, IndexPick, JoinReducer, Reducer};
pub use crate::select::Select;
pub use crate::value::Value;
