// ABOUTME: HTML selector collaborator evaluating XPath 1.0 expressions over a parsed document.
// ABOUTME: Relative paths such as "./td[1]//text()" run from any selected element.

//! XPath selection.
//!
//! Node-set results keep document order. Text and attribute nodes yield
//! their string value and elements yield their outer markup. Scalar results
//! such as `count(//tr)` or `string(//h1)` become a single value. Invalid
//! expressions select nothing.
//!
//! ```
//! use sift_core::{Pipeline, Value};
//! use sift_core::processors::Strip;
//! use sift_loader::XPathLoader;
//!
//! let page = XPathLoader::parse("<table><tr><td> a </td><td> 1 </td></tr></table>");
//! let strip = Pipeline::new().then(Strip::new());
//! for row in page.xpath("//tr") {
//!     assert_eq!(row.xpath("./td[1]//text()").proc(&strip), Some(Value::from("a")));
//! }
//! ```

use std::fmt;

use sift_core::{MagicList, Pipeline, RunReport, Select, Value};
use sxd_document::dom::{ChildOfElement, ChildOfRoot, Element};
use sxd_document::Package;
use sxd_xpath::nodeset::Node;
use sxd_xpath::{Context, Factory, Value as XValue};
use tracing::debug;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

fn escape_into(text: &str, in_attr: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attr => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

fn write_element(el: Element<'_>, out: &mut String) {
    let name = el.name().local_part();
    out.push('<');
    out.push_str(name);
    for attr in el.attributes() {
        out.push(' ');
        out.push_str(attr.name().local_part());
        out.push_str("=\"");
        escape_into(attr.value(), true, out);
        out.push('"');
    }
    out.push('>');
    if VOID_ELEMENTS.contains(&name) {
        return;
    }
    for child in el.children() {
        match child {
            ChildOfElement::Element(child) => write_element(child, out),
            ChildOfElement::Text(text) => escape_into(text.text(), false, out),
            _ => {}
        }
    }
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// Outer markup for elements, the string value for everything else.
fn node_value(node: &Node<'_>) -> String {
    match node {
        Node::Element(el) => {
            let mut out = String::new();
            write_element(*el, &mut out);
            out
        }
        Node::Root(root) => {
            let mut out = String::new();
            for child in root.children() {
                if let ChildOfRoot::Element(el) = child {
                    write_element(el, &mut out);
                }
            }
            out
        }
        other => other.string_value(),
    }
}

fn number_value(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::Int(n as i64)
    } else {
        Value::Float(n)
    }
}

/// Runs `query` with `scope` as the context node.
fn evaluate<'d>(scope: Node<'d>, query: &str, out: &mut Vec<XPathNode<'d>>) {
    let query = query.trim();
    if query.is_empty() {
        out.push(XPathNode::Node(scope));
        return;
    }
    let xpath = match Factory::new().build(query) {
        Ok(Some(xpath)) => xpath,
        Ok(None) => return,
        Err(err) => {
            debug!(query, error = ?err, "invalid XPath expression");
            return;
        }
    };
    match xpath.evaluate(&Context::new(), scope) {
        Ok(XValue::Nodeset(nodes)) => {
            out.extend(nodes.document_order().into_iter().map(XPathNode::Node));
        }
        Ok(XValue::String(s)) => out.push(XPathNode::Scalar(Value::Str(s))),
        Ok(XValue::Number(n)) => out.push(XPathNode::Scalar(number_value(n))),
        Ok(XValue::Boolean(b)) => out.push(XPathNode::Scalar(Value::Bool(b))),
        Err(err) => debug!(query, error = ?err, "XPath evaluation failed"),
    }
}

/// A parsed HTML document queried with XPath.
pub struct XPathLoader {
    package: Package,
}

impl fmt::Debug for XPathLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XPathLoader").finish_non_exhaustive()
    }
}

impl XPathLoader {
    /// Parses an HTML document. Parsing is lenient and never fails.
    pub fn parse(html: &str) -> Self {
        Self {
            package: sxd_html::parse_html(html),
        }
    }

    /// The document root as a node.
    pub fn root(&self) -> XPathNode<'_> {
        XPathNode::Node(self.package.as_document().root().into())
    }

    /// Runs an expression with the document root as context.
    pub fn xpath(&self, query: &str) -> XPathSelection<'_> {
        let mut out = Vec::new();
        evaluate(self.package.as_document().root().into(), query, &mut out);
        XPathSelection::from(out)
    }
}

impl Select for XPathLoader {
    fn select(&self, query: &str) -> MagicList<Value> {
        self.xpath(query).values()
    }
}

/// One XPath result: a document node, or a scalar from a function call.
#[derive(Debug, Clone)]
pub enum XPathNode<'d> {
    Node(Node<'d>),
    Scalar(Value),
}

impl<'d> XPathNode<'d> {
    /// Outer markup for elements, the string value for other nodes and scalars.
    pub fn value(&self) -> String {
        match self {
            XPathNode::Node(node) => node_value(node),
            XPathNode::Scalar(v) => v.to_string(),
        }
    }

    /// The result as pipeline input; scalars keep their type.
    pub fn to_value(&self) -> Value {
        match self {
            XPathNode::Node(node) => Value::Str(node_value(node)),
            XPathNode::Scalar(v) => v.clone(),
        }
    }

    /// Runs an expression with this node as context. Scalars have no context.
    pub fn xpath(&self, query: &str) -> XPathSelection<'d> {
        let mut out = Vec::new();
        if let XPathNode::Node(node) = self {
            evaluate(*node, query, &mut out);
        }
        XPathSelection::from(out)
    }

    pub fn attr(&self, name: &str) -> Option<&'d str> {
        match self {
            XPathNode::Node(Node::Element(el)) => el.attribute_value(name),
            _ => None,
        }
    }
}

impl Select for XPathNode<'_> {
    fn select(&self, query: &str) -> MagicList<Value> {
        self.xpath(query).values()
    }
}

/// An ordered list of XPath results.
#[derive(Debug, Clone, Default)]
pub struct XPathSelection<'d> {
    nodes: MagicList<XPathNode<'d>>,
}

impl<'d> From<Vec<XPathNode<'d>>> for XPathSelection<'d> {
    fn from(nodes: Vec<XPathNode<'d>>) -> Self {
        Self {
            nodes: MagicList::from(nodes),
        }
    }
}

impl<'d> XPathSelection<'d> {
    /// Runs an expression from every node and concatenates the results.
    pub fn xpath(&self, query: &str) -> XPathSelection<'d> {
        let mut out = Vec::new();
        for node in &self.nodes {
            if let XPathNode::Node(node) = node {
                evaluate(*node, query, &mut out);
            }
        }
        XPathSelection::from(out)
    }

    /// The node at `index` (negative counts from the end).
    pub fn node(&self, index: isize) -> Option<&XPathNode<'d>> {
        self.nodes.get(index)
    }

    pub fn getall(&self) -> MagicList<String> {
        self.nodes.iter().map(XPathNode::value).collect()
    }

    pub fn get(&self) -> Option<String> {
        self.nodes.first().map(XPathNode::value)
    }

    pub fn values(&self) -> MagicList<Value> {
        self.nodes.iter().map(XPathNode::to_value).collect()
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

    pub fn iter(&self) -> std::slice::Iter<'_, XPathNode<'d>> {
        self.nodes.iter()
    }
}

impl<'d> IntoIterator for XPathSelection<'d> {
    type Item = XPathNode<'d>;
    type IntoIter = std::vec::IntoIter<XPathNode<'d>>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<'s, 'd> IntoIterator for &'s XPathSelection<'d> {
    type Item = &'s XPathNode<'d>;
    type IntoIter = std::slice::Iter<'s, XPathNode<'d>>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl Select for XPathSelection<'_> {
    fn select(&self, query: &str) -> MagicList<Value> {
        self.xpath(query).values()
    }
}
