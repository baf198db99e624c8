//! Core dispatch types
//!
//! Handler and parameter definitions, block manifests, the registry that
//! joins them, and execution statistics.

pub mod block;
pub mod format;
pub mod manifest;
pub mod metrics;
pub mod parameter;
pub mod registry;

pub use block::{BlockError, BlockHandler, BlockOutput, ConsoleOutput, HandlerContext};
pub use manifest::{CategoryManifest, ManifestSet, ManifestSource};
pub use parameter::{Parameter, ParameterBag, ParameterValue, ResolvedParams};
pub use registry::{BlockRegistry, RegistryReport};
