//! Variable blocks
//!
//! Variables live in the editor. These handlers exist so that a variable
//! block sent to the agent gets an acknowledgement instead of an error.

use crate::core::block::{BlockError, BlockHandler, BlockOutput, HandlerContext};
use crate::core::parameter::ResolvedParams;

use super::{BlockCategory, CategoryModule};

pub fn module() -> CategoryModule {
    CategoryModule::new(
        BlockCategory::Variables,
        vec![
            BlockHandler::new("set", set),
            BlockHandler::new("change", change),
            BlockHandler::new("variable_value", variable_value),
        ],
    )
}

fn set(_ctx: &HandlerContext, _params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    Ok("Variable set (handled by client)".into())
}

fn change(_ctx: &HandlerContext, _params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    Ok("Variable change (handled by client)".into())
}

fn variable_value(_ctx: &HandlerContext, _params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    Ok("Variable value (handled by client)".into())
}
