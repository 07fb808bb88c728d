// ABOUTME: HTML selector collaborator: CSS queries with ::text and ::attr(name) pseudo-elements.
// ABOUTME: Selections nest, so rows can be selected first and cells queried per row.

//! HTML loading and CSS selection.
//!
//! Query forms:
//! - `"div.title"` selects elements; their value is the outer HTML.
//! - `"div.title::text"` selects the element's own text nodes.
//! - `"div.title ::text"` (note the space) selects every descendant text node.
//! - `"a::attr(href)"` selects an attribute value.
//! - A bare `"::text"` or `"::attr(x)"` applies to the current node itself.
//! - Comma groups may each carry a suffix: `"p::text, span::text"`.
//!
//! Invalid selectors select nothing.
//!
//! ```
//! use sift_core::{Pipeline, Value};
//! use sift_core::processors::Strip;
//! use sift_loader::HtmlLoader;
//!
//! let page = HtmlLoader::parse("<table><tr><td> a </td><td> 1 </td></tr></table>");
//! let strip = Pipeline::new().then(Strip::new());
//! for row in page.css("tr") {
//!     assert_eq!(row.css("td:nth-child(1)::text").proc(&strip), Some(Value::from("a")));
//! }
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};
use sift_core::{MagicList, Pipeline, RunReport, Select, Value};

use crate::compiled::get_or_compile;

static ATTR_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?s)(.*?)::attr\(\s*([^)\s]+)\s*\)$").unwrap());

/// What to pull out of each matched element.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Extract {
    Element,
    OwnText,
    AllText,
    Attr(String),
}

/// Splits a query into its CSS part and pseudo-element extraction.
fn split_query(query: &str) -> (&str, Extract) {
    if let Some(css) = query.strip_suffix("::text") {
        let extract = if css.len() != css.trim_end().len() {
            Extract::AllText
        } else {
            Extract::OwnText
        };
        return (css.trim(), extract);
    }
    if let Some(caps) = ATTR_SUFFIX.captures(query) {
        let css = caps.get(1).map_or("", |m| m.as_str());
        let name = caps.get(2).map_or("", |m| m.as_str());
        return (css.trim(), Extract::Attr(name.to_string()));
    }
    (query.trim(), Extract::Element)
}

/// Splits a selector group on commas outside brackets, parentheses and quotes.
fn top_level_groups(query: &str) -> Vec<&str> {
    let mut groups = Vec::new();
    let mut depth = 0usize;
    let mut quote = None;
    let mut start = 0;
    for (i, c) in query.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                groups.push(&query[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    groups.push(&query[start..]);
    groups
}

/// Resolves a query into `(css, extract)` steps. Groups sharing one
/// extraction merge into a single selector so matches stay in document order.
fn plan(query: &str) -> Vec<(String, Extract)> {
    let groups: Vec<(&str, Extract)> = top_level_groups(query)
        .into_iter()
        .map(split_query)
        .collect();
    let mergeable = groups.windows(2).all(|pair| pair[0].1 == pair[1].1)
        && groups.iter().all(|(css, _)| !css.is_empty());
    if mergeable {
        let css: Vec<&str> = groups.iter().map(|(css, _)| *css).collect();
        let extract = groups
            .into_iter()
            .next()
            .map_or(Extract::Element, |(_, extract)| extract);
        return vec![(css.join(", "), extract)];
    }
    groups
        .into_iter()
        .map(|(css, extract)| (css.to_string(), extract))
        .collect()
}

/// The CSS selectors a query compiles, without pseudo-element suffixes.
pub(crate) fn css_parts(query: &str) -> Vec<String> {
    plan(query)
        .into_iter()
        .map(|(css, _)| css)
        .filter(|css| !css.is_empty())
        .collect()
}

fn push_extracted<'a>(el: ElementRef<'a>, extract: &Extract, out: &mut Vec<HtmlNode<'a>>) {
    match extract {
        Extract::Element => out.push(HtmlNode::Element(el)),
        Extract::OwnText => out.extend(
            el.children()
                .filter_map(|child| child.value().as_text().map(|t| String::from(&**t)))
                .map(HtmlNode::Text),
        ),
        Extract::AllText => out.extend(el.text().map(|t| HtmlNode::Text(t.to_string()))),
        Extract::Attr(name) => {
            if let Some(v) = el.value().attr(name) {
                out.push(HtmlNode::Text(v.to_string()));
            }
        }
    }
}

/// Runs `query` below `scope` (or on `scope` itself when the CSS part is empty).
fn query_element<'a>(scope: ElementRef<'a>, query: &str, out: &mut Vec<HtmlNode<'a>>) {
    for (css, extract) in plan(query) {
        if css.is_empty() {
            push_extracted(scope, &extract, out);
        } else if let Some(sel) = get_or_compile(&css) {
            for el in scope.select(&sel) {
                push_extracted(el, &extract, out);
            }
        }
    }
}

/// A parsed HTML document.
#[derive(Debug, Clone)]
pub struct HtmlLoader {
    doc: Html,
}

impl HtmlLoader {
    /// Parses a full document. HTML parsing is lenient and never fails.
    pub fn parse(html: &str) -> Self {
        Self {
            doc: Html::parse_document(html),
        }
    }

    /// Parses an HTML fragment.
    pub fn fragment(html: &str) -> Self {
        Self {
            doc: Html::parse_fragment(html),
        }
    }

    /// The `<html>` element as a node.
    pub fn root(&self) -> HtmlNode<'_> {
        HtmlNode::Element(self.doc.root_element())
    }

    /// Runs a query against the whole document.
    pub fn css(&self, query: &str) -> HtmlSelection<'_> {
        let mut out = Vec::new();
        for (css, extract) in plan(query) {
            if css.is_empty() {
                push_extracted(self.doc.root_element(), &extract, &mut out);
            } else if let Some(sel) = get_or_compile(&css) {
                for el in self.doc.select(&sel) {
                    push_extracted(el, &extract, &mut out);
                }
            }
        }
        HtmlSelection::from(out)
    }
}

impl Select for HtmlLoader {
    fn select(&self, query: &str) -> MagicList<Value> {
        self.css(query).values()
    }
}

/// One selection result: an element, or text pulled out by a pseudo-element.
#[derive(Debug, Clone)]
pub enum HtmlNode<'a> {
    Element(ElementRef<'a>),
    Text(String),
}

impl<'a> HtmlNode<'a> {
    /// Outer HTML for elements, the raw string for text.
    pub fn value(&self) -> String {
        match self {
            HtmlNode::Element(el) => el.html(),
            HtmlNode::Text(t) => t.clone(),
        }
    }

    /// Runs a query below this node. Text nodes have nothing below them.
    pub fn css(&self, query: &str) -> HtmlSelection<'a> {
        let mut out = Vec::new();
        if let HtmlNode::Element(el) = self {
            query_element(*el, query, &mut out);
        }
        HtmlSelection::from(out)
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        match self {
            HtmlNode::Element(el) => el.value().attr(name),
            HtmlNode::Text(_) => None,
        }
    }
}

impl Select for HtmlNode<'_> {
    fn select(&self, query: &str) -> MagicList<Value> {
        self.css(query).values()
    }
}

/// An ordered list of selection results.
#[derive(Debug, Clone, Default)]
pub struct HtmlSelection<'a> {
    nodes: MagicList<HtmlNode<'a>>,
}

impl<'a> From<Vec<HtmlNode<'a>>> for HtmlSelection<'a> {
    fn from(nodes: Vec<HtmlNode<'a>>) -> Self {
        Self {
            nodes: MagicList::from(nodes),
        }
    }
}

impl<'a> HtmlSelection<'a> {
    /// Runs a query below every node and concatenates the results.
    pub fn css(&self, query: &str) -> HtmlSelection<'a> {
        let mut out = Vec::new();
        for node in &self.nodes {
            if let HtmlNode::Element(el) = node {
                query_element(*el, query, &mut out);
            }
        }
        HtmlSelection::from(out)
    }

    /// The node at `index` (negative counts from the end); `None` out of range.
    pub fn node(&self, index: isize) -> Option<&HtmlNode<'a>> {
        self.nodes.get(index)
    }

    pub fn getall(&self) -> MagicList<String> {
        self.nodes.iter().map(HtmlNode::value).collect()
    }

    /// The first node's value.
    pub fn get(&self) -> Option<String> {
        self.nodes.first().map(HtmlNode::value)
    }

    /// The node values as pipeline input.
    pub fn values(&self) -> MagicList<Value> {
        self.nodes.iter().map(|n| Value::Str(n.value())).collect()
    }

    pub fn proc(&self, pipeline: &Pipeline) -> Option<Value> {
        pipeline.run(Value::List(self.values()))
    }

    pub fn proc_with_report(&self, pipeline: &Pipeline) -> (Option<Value>, RunReport) {
        pipeline.run_with_report(Value::List(self.values()))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HtmlNode<'a>> {
        self.nodes.iter()
    }
}

impl<'a> IntoIterator for HtmlSelection<'a> {
    type Item = HtmlNode<'a>;
    type IntoIter = std::vec::IntoIter<HtmlNode<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<'s, 'a> IntoIterator for &'s HtmlSelection<'a> {
    type Item = &'s HtmlNode<'a>;
    type IntoIter = std::slice::Iter<'s, HtmlNode<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl Select for HtmlSelection<'_> {
    fn select(&self, query: &str) -> MagicList<Value> {
        self.css(query).values()
    }
}
