use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::GraphError;

/// Root operation type of a request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    #[default]
    Query,
    Mutation,
}

/// One requested root field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSelection {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default)]
    pub args: Value,
}

impl FieldSelection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            args: Value::Null,
        }
    }

    /// Key under which the result appears in `data`
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// Body of `POST /api/v1/query`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub kind: OperationKind,
    pub fields: Vec<FieldSelection>,
}

/// Error entry scoped to one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub message: String,
    pub path: Vec<String>,
    pub code: String,
}

impl FieldError {
    pub fn from_graph_error(key: &str, err: &GraphError) -> Self {
        Self {
            message: err.to_string(),
            path: vec![key.to_string()],
            code: err.code().to_string(),
        }
    }
}

/// Response body: every requested key appears in `data`, failed ones as `null`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResponse {
    pub data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl QueryResponse {
    pub fn push(&mut self, key: &str, outcome: Result<Value, GraphError>) {
        match outcome {
            Ok(value) => {
                self.data.insert(key.to_string(), value);
            }
            Err(err) => {
                self.data.insert(key.to_string(), Value::Null);
                self.errors.push(FieldError::from_graph_error(key, &err));
            }
        }
    }

    pub fn error_for(&self, key: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.path.first().map(String::as_str) == Some(key))
    }
}

/// Deserialize resolver arguments, turning serde errors into field errors
pub fn parse_args<T: serde::de::DeserializeOwned>(args: Value) -> Result<T, GraphError> {
    let args = if args.is_null() { Value::Object(Map::new()) } else { args };
    serde_json::from_value(args).map_err(|e| GraphError::BadArguments(e.to_string()))
}
