//! Block execution
//!
//! [`CommandExecutor`] runs one block; [`SequenceExecutor`] runs an ordered
//! batch with per-block isolation.

pub mod executor;
pub mod sequence;

pub use executor::{BlockInvocation, CommandExecutor, ExecutionOutcome};
pub use sequence::SequenceExecutor;
