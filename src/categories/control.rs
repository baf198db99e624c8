//! Control blocks
//!
//! Loops and conditionals are evaluated by the editor; the agent only
//! acknowledges them. `wait` is the one control block that does real work:
//! it blocks the calling thread for the requested time.

use std::thread;

use crate::core::block::{BlockError, BlockHandler, BlockOutput, HandlerContext};
use crate::core::format::fmt_float;
use crate::core::parameter::{Parameter, ResolvedParams};

use super::{seconds, BlockCategory, CategoryModule};

pub fn module() -> CategoryModule {
    CategoryModule::new(
        BlockCategory::Control,
        vec![
            BlockHandler::new("start", start),
            BlockHandler::new("wait", wait).param(Parameter::number("duration", 1.0)),
            BlockHandler::new("repeat", repeat).param(Parameter::integer("times", 1)),
            BlockHandler::new("repeat_forever", repeat_forever),
            BlockHandler::new("if_block", if_block).param(Parameter::string("condition", "True")),
            BlockHandler::new("while_block", while_block)
                .param(Parameter::string("condition", "True")),
        ],
    )
}

fn start(_ctx: &HandlerContext, _params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    Ok("Start block (handled by client)".into())
}

fn wait(_ctx: &HandlerContext, params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    let (secs, duration) = seconds(params, "duration")?;
    thread::sleep(duration);
    Ok(format!("Waited {}s", fmt_float(secs)).into())
}

fn repeat(_ctx: &HandlerContext, params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    let times = params.integer("times")?;
    Ok(format!("Repeat {} times (handled by client)", times).into())
}

fn repeat_forever(_ctx: &HandlerContext, _params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    Ok("Repeat forever (handled by client)".into())
}

fn if_block(_ctx: &HandlerContext, params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    Ok(format!("If {} (handled by client)", params.text("condition")?).into())
}

fn while_block(_ctx: &HandlerContext, params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    Ok(format!("While {} (handled by client)", params.text("condition")?).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parameter::ParameterBag;
    use std::time::{Duration, Instant};

    fn run(symbol: &str, bag: ParameterBag) -> Result<BlockOutput, BlockError> {
        let module = module();
        let handler = module.handler(symbol).expect("handler exists");
        handler.invoke(&HandlerContext::simulated(), &bag)
    }

    #[test]
    fn test_wait_sleeps_for_duration() {
        let started = Instant::now();
        let out = run("wait", ParameterBag::new().with("duration", "0.05")).unwrap();
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_eq!(out, BlockOutput::Text("Waited 0.05s".into()));
    }

    #[test]
    fn test_wait_rejects_negative_duration() {
        let err = run("wait", ParameterBag::new().with("duration", "-2")).unwrap_err();
        assert!(matches!(err, BlockError::InvalidParameter { ref name, .. } if name == "duration"));
    }

    #[test]
    fn test_client_handled_blocks_acknowledge() {
        assert_eq!(
            run("repeat", ParameterBag::new().with("times", "4")).unwrap(),
            BlockOutput::Text("Repeat 4 times (handled by client)".into())
        );
        assert_eq!(
            run("if_block", ParameterBag::new().with("condition", "x > 3")).unwrap(),
            BlockOutput::Text("If x > 3 (handled by client)".into())
        );
        assert_eq!(
            run("while_block", ParameterBag::new()).unwrap(),
            BlockOutput::Text("While True (handled by client)".into())
        );
    }
}
