// ABOUTME: Document collaborators for sift: HTML via CSS or XPath, JSON via JMESPath, raw values.
// ABOUTME: Also hosts the JSON field-spec layer that turns configuration into pipelines.

//! sift-loader - selection front-ends feeding `sift_core` pipelines.
//!
//! Every loader implements [`sift_core::Select`], so the same
//! [`sift_core::Pipeline`] or [`CompiledRecord`] runs over HTML (CSS or
//! XPath), JSON or plain values.

mod compiled;
pub mod compose;
pub mod html;
pub mod json;
pub mod spec;
pub mod xpath;

pub use crate::compiled::{get_or_compile, precompile_selectors};
pub use crate::compose::ComposeLoader;
pub use crate::html::{HtmlLoader, HtmlNode, HtmlSelection};
pub use crate::json::{JsonLoader, JsonNodes};
pub use crate::spec::{CompiledRecord, FieldSpec, ProcessorSpec, RecordSpec, ReducerSpec};
pub use crate::xpath::{XPathLoader, XPathNode, XPathSelection};
