//! Sequence executor
//!
//! Runs a batch of blocks strictly one after another. Every block produces
//! exactly one outcome, in input order, and a failing block never stops the
//! blocks after it.

use tracing::{info, info_span};
use uuid::Uuid;

use super::executor::{BlockInvocation, CommandExecutor, ExecutionOutcome};

pub struct SequenceExecutor<'a> {
    executor: &'a CommandExecutor,
}

impl<'a> SequenceExecutor<'a> {
    pub fn new(executor: &'a CommandExecutor) -> Self {
        Self { executor }
    }

    pub fn run(&self, blocks: &[BlockInvocation]) -> Vec<ExecutionOutcome> {
        let run_id = Uuid::new_v4();
        let span = info_span!("sequence", %run_id, blocks = blocks.len());
        let _guard = span.enter();

        let outcomes: Vec<ExecutionOutcome> = blocks
            .iter()
            .map(|block| self.executor.execute_invocation(block))
            .collect();

        let failed = outcomes.iter().filter(|o| !o.success).count();
        info!(failed, "sequence finished");
        outcomes
    }
}
