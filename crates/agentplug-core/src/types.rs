//! Domain and wire types shared by the service clients and plugins.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A document as stored in the search index.
///
/// Every field is optional: a missing key, an explicit `null`, or a value of
/// the wrong JSON type all decode to `None`. Unknown keys are ignored.
/// `title`, `url` and `parent_id` are decoded but not surfaced by retrieval.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDocument {
    #[serde(default, deserialize_with = "lenient_string")]
    pub parent_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub filepath: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// A ranked document returned by the index. `score` is index-defined,
/// roughly within `[0.0, 1.0]`, higher is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub document: IndexDocument,
    pub score: f64,
}

/// A citation handed back to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchResult {
    pub content: Option<String>,
    pub citation: Option<String>,
    pub score: Option<f64>,
}

/// A single vector query against a named index field.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorQuery {
    pub index_name: String,
    pub target_field: String,
    pub vector: Vec<f32>,
    pub top: usize,
}

/// What the orchestration host sees of a registered function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    pub name: String,
    pub description: String,
    /// JSON Schema of the argument object.
    pub parameters: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
}

impl FunctionDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self { name: name.into(), description: description.into(), parameters, returns: None }
    }

    pub fn with_returns(mut self, returns: impl Into<String>) -> Self {
        self.returns = Some(returns.into());
        self
    }
}

/// A tool advertised by an external tool server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteTool {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "empty_object_schema", rename = "inputSchema")]
    pub input_schema: Value,
}

pub fn empty_object_schema() -> Value {
    serde_json::json!({ "type": "object", "properties": {} })
}
