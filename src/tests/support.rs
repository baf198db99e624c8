//! Shared fixtures

use std::sync::Arc;

use crate::core::block::HandlerContext;
use crate::core::manifest::ManifestSet;
use crate::core::metrics::ExecutionStats;
use crate::core::registry::BlockRegistry;
use crate::devices::{RecordingDriver, SoftwareMixer};
use crate::runtime::CommandExecutor;

pub struct Harness {
    pub driver: Arc<RecordingDriver>,
    pub mixer: Arc<SoftwareMixer>,
    pub executor: CommandExecutor,
}

impl Harness {
    /// Built-in manifests and handlers over a recording driver.
    pub fn builtin() -> Self {
        Self::with_registry(BlockRegistry::with_builtin_modules(&ManifestSet::embedded()))
    }

    pub fn with_registry(registry: BlockRegistry) -> Self {
        let driver = Arc::new(RecordingDriver::new());
        let mixer = Arc::new(SoftwareMixer::default());
        let ctx = HandlerContext::new(driver.clone(), mixer.clone());
        let executor = CommandExecutor::new(Arc::new(registry), ctx, Arc::new(ExecutionStats::new()));
        Self {
            driver,
            mixer,
            executor,
        }
    }
}
