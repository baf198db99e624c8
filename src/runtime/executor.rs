//! Command executor
//!
//! Resolves a block type through the registry, validates parameters against
//! the handler's schema, runs the handler and normalizes whatever happens
//! into an [`ExecutionOutcome`]. Nothing a handler does (error or panic)
//! escapes this module.

use serde::{Deserialize, Deserializer, Serialize};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::core::block::{BlockError, BlockOutput, HandlerContext};
use crate::core::metrics::{ExecutionStats, UNREGISTERED_KEY};
use crate::core::parameter::ParameterBag;
use crate::core::registry::BlockRegistry;

/// Prefix of editor-side operator blocks the agent does not need to run.
const CLIENT_OPERATOR_PREFIX: &str = "operator_";

/// One block to run: `{ "type": ..., "id": ..., "params": {...} }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockInvocation {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub params: ParameterBag,
}

impl BlockInvocation {
    pub fn new(block_type: impl Into<String>, params: ParameterBag) -> Self {
        Self {
            block_type: block_type.into(),
            id: None,
            params,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Normalized result of one block execution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<BlockOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub block_id: Option<String>,
    pub elapsed_ms: f64,
}

impl ExecutionOutcome {
    fn from_result(block_type: &str, result: Result<BlockOutput, BlockError>, elapsed_ms: f64) -> Self {
        let (result, error) = match result {
            Ok(output) => (Some(output), None),
            Err(error) => (None, Some(failure_message(block_type, &error))),
        };
        Self {
            success: error.is_none(),
            result,
            error,
            block_id: None,
            elapsed_ms,
        }
    }
}

/// Error text reported to the editor.
///
/// Lookup failures are reported as they are; anything raised while the
/// handler was running is prefixed with the block type.
pub fn failure_message(block_type: &str, error: &BlockError) -> String {
    match error {
        BlockError::UnknownBlockType(_) | BlockError::Unresolved { .. } => error.to_string(),
        _ => format!("Error executing {}: {}", block_type, error),
    }
}

/// Runs single blocks against one registry snapshot.
#[derive(Clone)]
pub struct CommandExecutor {
    registry: Arc<BlockRegistry>,
    ctx: HandlerContext,
    stats: Arc<ExecutionStats>,
}

impl CommandExecutor {
    pub fn new(registry: Arc<BlockRegistry>, ctx: HandlerContext, stats: Arc<ExecutionStats>) -> Self {
        Self { registry, ctx, stats }
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn stats(&self) -> &ExecutionStats {
        &self.stats
    }

    /// Execute one block. Always returns an outcome.
    pub fn execute(&self, block_type: &str, params: &ParameterBag) -> ExecutionOutcome {
        let start = Instant::now();
        let result = self.dispatch(block_type, params);
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(output) => debug!(block_type, elapsed_ms, result = %output, "block executed"),
            Err(error) => debug!(block_type, elapsed_ms, %error, "block failed"),
        }
        let stats_key = if self.registry.lookup(block_type).is_some() {
            block_type
        } else {
            UNREGISTERED_KEY
        };
        self.stats.record(stats_key, result.is_ok(), elapsed_ms);

        ExecutionOutcome::from_result(block_type, result, elapsed_ms)
    }

    /// Execute an invocation and tag the outcome with its id.
    pub fn execute_invocation(&self, invocation: &BlockInvocation) -> ExecutionOutcome {
        let mut outcome = self.execute(&invocation.block_type, &invocation.params);
        outcome.block_id = invocation.id.clone();
        outcome
    }

    fn dispatch(&self, block_type: &str, params: &ParameterBag) -> Result<BlockOutput, BlockError> {
        let Some(entry) = self.registry.lookup(block_type) else {
            if block_type.starts_with(CLIENT_OPERATOR_PREFIX) {
                return Ok("Operator block (client-side)".into());
            }
            return Err(BlockError::UnknownBlockType(block_type.to_string()));
        };

        let handler = entry.handler()?;
        let ctx = &self.ctx;
        match panic::catch_unwind(AssertUnwindSafe(|| handler.invoke(ctx, params))) {
            Ok(result) => result,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(block_type, %message, "handler panicked");
                Err(BlockError::Panicked(message))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
