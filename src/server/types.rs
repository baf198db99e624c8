//! Request and response bodies for the HTTP API

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::runtime::{BlockInvocation, ExecutionOutcome};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SequenceRequest {
    #[serde(default)]
    pub blocks: Vec<BlockInvocation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SequenceResponse {
    pub success: bool,
    pub results: Vec<ExecutionOutcome>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    pub blocks_loaded: usize,
    pub categories_loaded: usize,
    pub unresolved_blocks: usize,
    pub executions: u64,
    pub failures: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetSourceRequest {
    /// Source ids are strings, but camera indexes may arrive as numbers.
    #[serde(default)]
    pub source_id: Option<Value>,
}

impl SetSourceRequest {
    /// The id as text, or `None` when missing or blank.
    pub fn source_id(&self) -> Option<String> {
        let id = match self.source_id.as_ref()? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        (!id.is_empty()).then_some(id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SetSourceResponse {
    pub success: bool,
    pub source: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceResponse {
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: Value) -> SetSourceRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_source_id_forms() {
        assert_eq!(request(json!({"source_id": "screen:0"})).source_id().as_deref(), Some("screen:0"));
        assert_eq!(request(json!({"source_id": 2})).source_id().as_deref(), Some("2"));
        assert_eq!(request(json!({"source_id": "  "})).source_id(), None);
        assert_eq!(request(json!({"source_id": null})).source_id(), None);
        assert_eq!(request(json!({})).source_id(), None);
        assert_eq!(request(json!({"source_id": [1]})).source_id(), None);
    }
}
