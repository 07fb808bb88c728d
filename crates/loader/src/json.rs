// ABOUTME: JSON selector collaborator evaluating JMESPath expressions over serde_json data.
// ABOUTME: Arrays fan out into one node per element; nodes can be queried again.

use serde_json::Value as Json;
use sift_core::{MagicList, Pipeline, Result, RunReport, Select, SiftError, Value};
use tracing::debug;

/// Evaluates `query` against `data`; `None` for invalid expressions.
fn search(data: &Json, query: &str) -> Option<Json> {
    let query = query.trim();
    if query.is_empty() {
        return Some(data.clone());
    }
    let expr = match jmespath::compile(query) {
        Ok(expr) => expr,
        Err(err) => {
            debug!(query, error = %err, "invalid JMESPath expression");
            return None;
        }
    };
    let found = match expr.search(data.clone()) {
        Ok(found) => found,
        Err(err) => {
            debug!(query, error = %err, "JMESPath evaluation failed");
            return None;
        }
    };
    serde_json::to_value(&*found).ok()
}

/// A JSON document (or a node within one).
#[derive(Debug, Clone, PartialEq)]
pub struct JsonLoader {
    data: Json,
    query: Option<String>,
}

impl JsonLoader {
    pub fn new(data: Json) -> Self {
        Self { data, query: None }
    }

    /// Parses raw JSON text.
    pub fn parse(raw: &str) -> Result<Self> {
        let data = serde_json::from_str(raw).map_err(SiftError::document)?;
        Ok(Self::new(data))
    }

    /// The wrapped data.
    pub fn data(&self) -> &Json {
        &self.data
    }

    /// The expression that produced this node, if any.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn getall(&self) -> Json {
        self.data.clone()
    }

    /// Evaluates a JMESPath expression. A null result selects nothing, an
    /// array selects each element, anything else selects itself.
    ///
    /// String literals inside filters need single quotes:
    /// `data[?kind=='question']`.
    pub fn node(&self, query: &str) -> JsonNodes {
        let nodes = match search(&self.data, query) {
            None | Some(Json::Null) => Vec::new(),
            Some(Json::Array(items)) => items
                .into_iter()
                .map(|data| JsonLoader {
                    data,
                    query: Some(query.to_string()),
                })
                .collect(),
            Some(data) => vec![JsonLoader {
                data,
                query: Some(query.to_string()),
            }],
        };
        JsonNodes {
            nodes: MagicList::from(nodes),
        }
    }
}

impl Select for JsonLoader {
    fn select(&self, query: &str) -> MagicList<Value> {
        self.node(query).values()
    }
}

/// Nodes selected by a JMESPath expression.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonNodes {
    nodes: MagicList<JsonLoader>,
}

impl JsonNodes {
    /// Queries every node and concatenates the results.
    pub fn node(&self, query: &str) -> JsonNodes {
        JsonNodes {
            nodes: self
                .nodes
                .iter()
                .flat_map(|n| n.node(query).nodes)
                .collect(),
        }
    }

    pub fn get(&self, index: isize) -> Option<&JsonLoader> {
        self.nodes.get(index)
    }

    pub fn getall(&self) -> Vec<Json> {
        self.nodes.iter().map(JsonLoader::getall).collect()
    }

    /// Node data as pipeline input. Nulls are dropped.
    pub fn values(&self) -> MagicList<Value> {
        self.nodes
            .iter()
            .filter_map(|n| Value::from_json(n.data.clone()))
            .collect()
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

    pub fn iter(&self) -> std::slice::Iter<'_, JsonLoader> {
        self.nodes.iter()
    }
}

impl IntoIterator for JsonNodes {
    type Item = JsonLoader;
    type IntoIter = std::vec::IntoIter<JsonLoader>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<'a> IntoIterator for &'a JsonNodes {
    type Item = &'a JsonLoader;
    type IntoIter = std::slice::Iter<'a, JsonLoader>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl Select for JsonNodes {
    fn select(&self, query: &str) -> MagicList<Value> {
        self.node(query).values()
    }
}
