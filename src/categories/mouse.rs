//! Mouse blocks

use std::thread;

use crate::core::block::{BlockError, BlockHandler, BlockOutput, HandlerContext};
use crate::core::format::fmt_float;
use crate::core::parameter::{Parameter, ResolvedParams};
use crate::devices::MouseButton;

use super::{seconds, BlockCategory, CategoryModule};

/// Cursor updates per second while gliding.
const GLIDE_RATE: f64 = 60.0;

pub fn module() -> CategoryModule {
    CategoryModule::new(
        BlockCategory::Mouse,
        vec![
            BlockHandler::new("move", move_to)
                .param(Parameter::integer("X", 0).with_alias("x"))
                .param(Parameter::integer("Y", 0).with_alias("y")),
            BlockHandler::new("glide", glide)
                .param(Parameter::integer("X", 0).with_alias("x"))
                .param(Parameter::integer("Y", 0).with_alias("y"))
                .param(Parameter::number("TIME", 1.0).with_alias("time")),
            BlockHandler::new("scroll_mouse", scroll_mouse)
                .param(Parameter::choice("direction", "up", &["up", "down"]))
                .param(Parameter::integer("amount", 1)),
            BlockHandler::new("press_mouse", press_mouse)
                .param(Parameter::choice("button", "left", &["left", "right", "middle"])),
            BlockHandler::new("double_press_mouse", double_press_mouse)
                .param(Parameter::choice("button", "left", &["left", "right", "middle"])),
        ],
    )
}

fn coordinates(params: &ResolvedParams) -> Result<(i32, i32), BlockError> {
    let axis = |id: &str| -> Result<i32, BlockError> {
        let value = params.integer(id)?;
        i32::try_from(value).map_err(|_| BlockError::InvalidParameter {
            name: id.to_string(),
            reason: format!("coordinate {} is out of range", value),
        })
    };
    Ok((axis("X")?, axis("Y")?))
}

fn button(params: &ResolvedParams) -> Result<MouseButton, BlockError> {
    let raw = params.text("button")?;
    raw.parse().map_err(|e: crate::devices::DeviceError| BlockError::InvalidParameter {
        name: "button".into(),
        reason: e.to_string(),
    })
}

fn move_to(ctx: &HandlerContext, params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    let (x, y) = coordinates(params)?;
    ctx.input.move_to(x, y)?;
    Ok(format!("Moved mouse to ({}, {})", x, y).into())
}

fn glide(ctx: &HandlerContext, params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    let (x, y) = coordinates(params)?;
    let (secs, duration) = seconds(params, "TIME")?;

    match ctx.input.cursor_position() {
        Some((start_x, start_y)) if secs > 0.0 => {
            let steps = (secs * GLIDE_RATE).round().max(1.0) as u32;
            let pause = duration / steps;
            for step in 1..=steps {
                let t = f64::from(step) / f64::from(steps);
                let px = f64::from(start_x) + (f64::from(x) - f64::from(start_x)) * t;
                let py = f64::from(start_y) + (f64::from(y) - f64::from(start_y)) * t;
                ctx.input.move_to(px.round() as i32, py.round() as i32)?;
                thread::sleep(pause);
            }
        }
        _ => {
            // No start point or no time: wait out the glide, then jump.
            thread::sleep(duration);
            ctx.input.move_to(x, y)?;
        }
    }

    Ok(format!("Glided to ({}, {}) in {}s", x, y, fmt_float(secs)).into())
}

fn scroll_mouse(ctx: &HandlerContext, params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    let direction = params.text("direction")?;
    let amount = params.integer("amount")?;
    let delta = if direction == "up" { amount } else { amount.saturating_neg() };
    ctx.input.scroll(delta)?;
    Ok(format!("Scrolled {} by {}", direction, amount).into())
}

fn press_mouse(ctx: &HandlerContext, params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    let button = button(params)?;
    ctx.input.click(button)?;
    Ok(format!("Clicked {} button", button).into())
}

fn double_press_mouse(ctx: &HandlerContext, params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    let button = button(params)?;
    ctx.input.click(button)?;
    ctx.input.click(button)?;
    Ok(format!("Double-clicked {} button", button).into())
}
