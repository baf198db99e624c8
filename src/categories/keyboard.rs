//! Keyboard blocks

use std::thread;

use crate::core::block::{BlockError, BlockHandler, BlockOutput, HandlerContext};
use crate::core::format::fmt_float;
use crate::core::parameter::{Parameter, ResolvedParams};
use crate::devices::{parse_combo, Key};

use super::{seconds, BlockCategory, CategoryModule};

pub fn module() -> CategoryModule {
    CategoryModule::new(
        BlockCategory::Keyboard,
        vec![
            BlockHandler::new("press_key", press_key).param(Parameter::string("key", "")),
            BlockHandler::new("press_key_for", press_key_for)
                .param(Parameter::string("key", ""))
                .param(Parameter::number("time", 1.0)),
            BlockHandler::new("type_string", type_string).param(Parameter::string("text", "")),
            BlockHandler::new("press_key_with_modifier", press_key_with_modifier)
                .param(Parameter::string("key", ""))
                .param(Parameter::string("modifier", "ctrl")),
            BlockHandler::new("hold_key_with_modifier", hold_key_with_modifier)
                .param(Parameter::string("key", ""))
                .param(Parameter::string("modifier", "ctrl"))
                .param(Parameter::number("duration", 1.0)),
            BlockHandler::new("wait_for_key", wait_for_key).param(Parameter::string("key", "")),
            BlockHandler::new("wait_any_key", wait_any_key),
        ],
    )
}

/// Parse the `key` parameter (or another key-valued one) into a combination.
fn keys(params: &ResolvedParams, id: &str) -> Result<Vec<Key>, BlockError> {
    let raw = params.text(id)?;
    parse_combo(raw).map_err(|e| BlockError::InvalidParameter {
        name: id.to_string(),
        reason: e.to_string(),
    })
}

/// Hold `combo` down for `duration`, always releasing what was pressed.
fn hold(ctx: &HandlerContext, combo: &[Key], duration: std::time::Duration) -> Result<(), BlockError> {
    let mut pressed = 0;
    let mut outcome = Ok(());
    for key in combo {
        if let Err(e) = ctx.input.key_down(key) {
            outcome = Err(e);
            break;
        }
        pressed += 1;
    }
    if outcome.is_ok() {
        thread::sleep(duration);
    }
    for key in combo[..pressed].iter().rev() {
        let released = ctx.input.key_up(key);
        if outcome.is_ok() {
            outcome = released;
        }
    }
    Ok(outcome?)
}

fn press_key(ctx: &HandlerContext, params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    let combo = keys(params, "key")?;
    ctx.input.tap(&combo)?;
    Ok(format!("Pressed key: {}", params.text("key")?).into())
}

fn press_key_for(ctx: &HandlerContext, params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    let combo = keys(params, "key")?;
    let (secs, duration) = seconds(params, "time")?;
    hold(ctx, &combo, duration)?;
    Ok(format!("Held key {} for {}s", params.text("key")?, fmt_float(secs)).into())
}

fn type_string(ctx: &HandlerContext, params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    let text = params.text("text")?;
    ctx.input.type_text(text)?;
    Ok(format!("Typed: {}", text).into())
}

fn with_modifier(params: &ResolvedParams) -> Result<Vec<Key>, BlockError> {
    let mut combo = keys(params, "modifier")?;
    combo.extend(keys(params, "key")?);
    Ok(combo)
}

fn press_key_with_modifier(ctx: &HandlerContext, params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    let combo = with_modifier(params)?;
    ctx.input.tap(&combo)?;
    Ok(format!("Pressed {}+{}", params.text("modifier")?, params.text("key")?).into())
}

fn hold_key_with_modifier(ctx: &HandlerContext, params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    let combo = with_modifier(params)?;
    let (secs, duration) = seconds(params, "duration")?;
    hold(ctx, &combo, duration)?;
    Ok(format!(
        "Held {}+{} for {}s",
        params.text("modifier")?,
        params.text("key")?,
        fmt_float(secs)
    )
    .into())
}

fn wait_for_key(ctx: &HandlerContext, params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    let raw = params.text("key")?;
    let key: Key = raw.parse().map_err(|e: crate::devices::DeviceError| {
        BlockError::InvalidParameter {
            name: "key".into(),
            reason: e.to_string(),
        }
    })?;
    ctx.input.wait_for_key(Some(&key))?;
    Ok(format!("Waited for key: {}", raw).into())
}

fn wait_any_key(ctx: &HandlerContext, _params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    ctx.input.wait_for_key(None)?;
    Ok("Waited for any key".into())
}
