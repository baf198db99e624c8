//! Console blocks
//!
//! The agent does not print anything itself: it returns a console message
//! that the editor renders in its output pane.

use crate::core::block::{BlockError, BlockHandler, BlockOutput, ConsoleOutput, HandlerContext};
use crate::core::parameter::{Parameter, ResolvedParams};

use super::{BlockCategory, CategoryModule};

pub fn module() -> CategoryModule {
    CategoryModule::new(
        BlockCategory::Console,
        vec![
            BlockHandler::new("output", output)
                .param(Parameter::string("message", ""))
                .param(Parameter::choice("type", "log", &["log", "warn", "error"])),
            BlockHandler::new("output_colour", output_colour)
                .param(Parameter::string("message", ""))
                .param(Parameter::string("type", "red")),
        ],
    )
}

fn output(_ctx: &HandlerContext, params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    let message = params.text("message")?;
    let kind = params.text("type")?;
    let formatted = match kind {
        "warn" => format!("warning: {}", message),
        "error" => format!("error: {}", message),
        _ => message.to_string(),
    };
    Ok(BlockOutput::Console(ConsoleOutput::new(formatted, kind)))
}

fn output_colour(_ctx: &HandlerContext, params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    Ok(BlockOutput::Console(ConsoleOutput::new(
        params.text("message")?,
        params.text("type")?,
    )))
}
