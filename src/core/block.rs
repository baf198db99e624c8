//! Block handler types
//!
//! A [`BlockHandler`] pairs a handler symbol with its parameter schema and the
//! function that implements it. Handlers receive a [`HandlerContext`] giving
//! access to the device collaborators, and return a [`BlockOutput`].

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use super::parameter::{Parameter, ParameterBag, ResolvedParams};
use crate::devices::{DeviceError, InputDriver, RecordingDriver, SoftwareMixer, VolumeControl};

/// Signature shared by every handler function.
pub type HandlerFn = fn(&HandlerContext, &ResolvedParams) -> Result<BlockOutput, BlockError>;

/// One named handler inside a category module.
#[derive(Clone)]
pub struct BlockHandler {
    symbol: &'static str,
    parameters: Vec<Parameter>,
    run: HandlerFn,
}

impl BlockHandler {
    pub fn new(symbol: &'static str, run: HandlerFn) -> Self {
        Self {
            symbol,
            parameters: Vec::new(),
            run,
        }
    }

    /// Declare a parameter this handler reads.
    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn symbol(&self) -> &'static str {
        self.symbol
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Validate `bag` against the schema, then run the handler.
    pub fn invoke(&self, ctx: &HandlerContext, bag: &ParameterBag) -> Result<BlockOutput, BlockError> {
        let params = ResolvedParams::resolve(&self.parameters, bag)?;
        (self.run)(ctx, &params)
    }
}

impl fmt::Debug for BlockHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockHandler")
            .field("symbol", &self.symbol)
            .field("parameters", &self.parameters.len())
            .finish()
    }
}

/// External collaborators a handler may call into.
#[derive(Clone)]
pub struct HandlerContext {
    pub input: Arc<dyn InputDriver>,
    pub volume: Arc<dyn VolumeControl>,
}

impl HandlerContext {
    pub fn new(input: Arc<dyn InputDriver>, volume: Arc<dyn VolumeControl>) -> Self {
        Self { input, volume }
    }

    /// Recording input driver and an in-process mixer; nothing touches the OS.
    pub fn simulated() -> Self {
        Self::new(
            Arc::new(RecordingDriver::new()),
            Arc::new(SoftwareMixer::default()),
        )
    }
}

/// Console message the editor renders in its output pane.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsoleOutput {
    pub action: &'static str,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ConsoleOutput {
    pub fn new(message: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            action: "console_output",
            message: message.into(),
            kind: kind.into(),
        }
    }
}

/// Value returned by a handler, passed through to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BlockOutput {
    Text(String),
    Integer(i64),
    Boolean(bool),
    Console(ConsoleOutput),
}

impl From<String> for BlockOutput {
    fn from(text: String) -> Self {
        BlockOutput::Text(text)
    }
}

impl From<&str> for BlockOutput {
    fn from(text: &str) -> Self {
        BlockOutput::Text(text.to_string())
    }
}

impl fmt::Display for BlockOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockOutput::Text(text) => f.write_str(text),
            BlockOutput::Integer(i) => write!(f, "{}", i),
            BlockOutput::Boolean(b) => f.write_str(super::format::fmt_bool(*b)),
            BlockOutput::Console(out) => write!(f, "[{}] {}", out.kind, out.message),
        }
    }
}

/// Block errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum BlockError {
    /// No manifest declares this block type
    #[error("Unknown block type: {0}")]
    UnknownBlockType(String),

    /// Declared in a manifest, but no handler could be bound at build time
    #[error("Block type '{block_type}' cannot run: {reason}")]
    Unresolved { block_type: String, reason: String },

    /// A parameter failed its schema
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// The handler ran and failed
    #[error("{0}")]
    ExecutionError(String),

    /// A device collaborator failed
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// The handler panicked
    #[error("handler panicked: {0}")]
    Panicked(String),
}
