//! Route handlers and the JSON error response

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{error, info};

use super::types::{
    MessageResponse, SequenceRequest, SequenceResponse, SetSourceRequest, SetSourceResponse,
    SourceResponse, StatusResponse,
};
use super::SharedState;
use crate::core::metrics::StatsSnapshot;
use crate::core::registry::RegistryReport;
use crate::runtime::{BlockInvocation, ExecutionOutcome, SequenceExecutor};

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound,
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (
            status,
            Json(serde_json::json!({
                "success": false,
                "error": message
            })),
        )
            .into_response()
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        error!(%err, "execution task failed");
        ApiError::Internal(format!("execution task failed: {}", err))
    }
}

/// Parse a JSON body, answering 400 with our own error shape.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("No data provided".into()));
    }
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))
}

// ============================================================================
// Execution
// ============================================================================

pub async fn execute(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<ExecutionOutcome>, ApiError> {
    let invocation: BlockInvocation = parse_body(&body)?;
    info!(block_type = %invocation.block_type, "POST /execute");

    let executor = state.executor();
    let outcome = tokio::task::spawn_blocking(move || executor.execute_invocation(&invocation)).await?;
    Ok(Json(outcome))
}

pub async fn execute_sequence(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<SequenceResponse>, ApiError> {
    let request: SequenceRequest = parse_body(&body)?;
    if request.blocks.is_empty() {
        return Err(ApiError::BadRequest("No blocks provided".into()));
    }
    info!(blocks = request.blocks.len(), "POST /execute-sequence");

    let executor = state.executor();
    let results = tokio::task::spawn_blocking(move || {
        SequenceExecutor::new(&executor).run(&request.blocks)
    })
    .await?;

    Ok(Json(SequenceResponse {
        success: true,
        results,
    }))
}

// ============================================================================
// Block Catalog
// ============================================================================

pub async fn list_blocks(State(state): State<SharedState>) -> Json<Value> {
    Json(state.catalog().manifests.document())
}

pub async fn reload_blocks(State(state): State<SharedState>) -> Result<Json<RegistryReport>, ApiError> {
    info!("POST /blocks/reload");
    let reloaded = tokio::task::spawn_blocking(move || state.reload()).await?;
    match reloaded {
        Ok(catalog) => Ok(Json(catalog.registry.report().clone())),
        Err(err) => {
            error!(%err, "reload failed, keeping current blocks");
            Err(ApiError::Internal(err.to_string()))
        }
    }
}

// ============================================================================
// Status
// ============================================================================

pub async fn status(State(state): State<SharedState>) -> Json<StatusResponse> {
    let catalog = state.catalog();
    let report = catalog.registry.report();
    let stats = state.stats();
    Json(StatusResponse {
        status: "running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        blocks_loaded: report.blocks_loaded,
        categories_loaded: report.categories_loaded,
        unresolved_blocks: report.unresolved.len(),
        executions: stats.executions(),
        failures: stats.failures(),
    })
}

pub async fn stats(State(state): State<SharedState>) -> Json<StatsSnapshot> {
    Json(state.stats().snapshot())
}

// ============================================================================
// Display Source
// ============================================================================

pub async fn set_source(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<SetSourceResponse>, ApiError> {
    let request: SetSourceRequest = parse_body(&body)?;
    let source = request
        .source_id()
        .ok_or_else(|| ApiError::BadRequest("No source_id provided".into()))?;

    info!(%source, "display source selected");
    state.capture().select(source.clone());
    Ok(Json(SetSourceResponse {
        success: true,
        source,
    }))
}

pub async fn get_source(State(state): State<SharedState>) -> Json<SourceResponse> {
    Json(SourceResponse {
        source: state.capture().current(),
    })
}

// ============================================================================
// Lifecycle
// ============================================================================

pub async fn shutdown(State(state): State<SharedState>) -> Json<MessageResponse> {
    info!("shutdown requested");
    state.request_shutdown();
    Json(MessageResponse {
        message: "Agent shutting down...".to_string(),
    })
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
