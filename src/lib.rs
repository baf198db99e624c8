//! Macro Agent - local block-dispatch service for the visual macro editor
//!
//! The editor sends blocks (key presses, mouse moves, volume changes,
//! console output, control-flow markers) over HTTP. This crate maps each
//! block type to a handler through manifests loaded at start-up, runs single
//! blocks or ordered sequences, and reports a result per block.

pub mod categories;
pub mod config;
pub mod core;
pub mod devices;
pub mod runtime;
pub mod server;
#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use crate::core::{BlockError, BlockOutput, BlockRegistry, HandlerContext, ParameterBag};
pub use categories::BlockCategory;
pub use runtime::{BlockInvocation, CommandExecutor, ExecutionOutcome, SequenceExecutor};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
