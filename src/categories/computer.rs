//! Computer blocks (system volume)

use crate::core::block::{BlockError, BlockHandler, BlockOutput, HandlerContext};
use crate::core::parameter::{Parameter, ResolvedParams};

use super::{BlockCategory, CategoryModule};

pub fn module() -> CategoryModule {
    CategoryModule::new(
        BlockCategory::Computer,
        vec![
            BlockHandler::new("set_volume", set_volume).param(Parameter::integer("volume", 25)),
            BlockHandler::new("change_volume", change_volume).param(Parameter::integer("volume", 5)),
        ],
    )
}

fn clamp_level(level: i64) -> u8 {
    level.clamp(0, 100) as u8
}

fn set_volume(ctx: &HandlerContext, params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    let level = clamp_level(params.integer("volume")?);
    ctx.volume.set_level(level)?;
    Ok(format!("Volume set to {}%", level).into())
}

fn change_volume(ctx: &HandlerContext, params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    let delta = params.integer("volume")?;
    let current = ctx.volume.level()?;
    let level = clamp_level(i64::from(current).saturating_add(delta));
    ctx.volume.set_level(level)?;
    Ok(format!("Volume changed by {:+}% to {}%", delta, level).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parameter::ParameterBag;
    use crate::devices::{RecordingDriver, SoftwareMixer, VolumeControl};
    use std::sync::Arc;

    fn setup(level: u8) -> (Arc<SoftwareMixer>, HandlerContext) {
        let mixer = Arc::new(SoftwareMixer::new(level));
        let ctx = HandlerContext::new(Arc::new(RecordingDriver::new()), mixer.clone());
        (mixer, ctx)
    }

    fn run(ctx: &HandlerContext, symbol: &str, bag: ParameterBag) -> Result<BlockOutput, BlockError> {
        module().handler(symbol).expect("handler exists").invoke(ctx, &bag)
    }

    #[test]
    fn test_set_volume_clamps() {
        let (mixer, ctx) = setup(50);
        let out = run(&ctx, "set_volume", ParameterBag::new().with("volume", 150)).unwrap();
        assert_eq!(out, BlockOutput::Text("Volume set to 100%".into()));
        assert_eq!(mixer.level().unwrap(), 100);

        run(&ctx, "set_volume", ParameterBag::new().with("volume", "-4")).unwrap();
        assert_eq!(mixer.level().unwrap(), 0);

        let out = run(&ctx, "set_volume", ParameterBag::new()).unwrap();
        assert_eq!(out, BlockOutput::Text("Volume set to 25%".into()));
    }

    #[test]
    fn test_change_volume_is_relative() {
        let (mixer, ctx) = setup(50);
        let out = run(&ctx, "change_volume", ParameterBag::new()).unwrap();
        assert_eq!(out, BlockOutput::Text("Volume changed by +5% to 55%".into()));

        let out = run(&ctx, "change_volume", ParameterBag::new().with("volume", -70)).unwrap();
        assert_eq!(out, BlockOutput::Text("Volume changed by -70% to 0%".into()));
        assert_eq!(mixer.level().unwrap(), 0);
    }

    #[test]
    fn test_volume_rejects_text() {
        let (_mixer, ctx) = setup(50);
        let err = run(&ctx, "set_volume", ParameterBag::new().with("volume", "loud")).unwrap_err();
        assert!(matches!(err, BlockError::InvalidParameter { .. }));
    }
}
