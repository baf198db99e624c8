//! Operator blocks
//!
//! Pure arithmetic, logic and text handlers. Results are returned as the
//! text the editor shows, e.g. `6.0 + 3.0 = 9.0`; `length` and `contain`
//! return a bare integer / boolean.
//!
//! Arithmetic runs on floats and bitwise operators on the integer part of
//! their operands, so `value` mixes both result kinds depending on the
//! operator.

use std::fmt;

use crate::core::block::{BlockError, BlockHandler, BlockOutput, HandlerContext};
use crate::core::format::{fmt_bool, fmt_float};
use crate::core::parameter::{Parameter, ResolvedParams};

use super::{BlockCategory, CategoryModule};

const VALUE_OPERATORS: &[&str] = &["+", "-", "*", "/", "mod", "OR", "AND", "XOR", "NAND", "NOR"];
const BITWISE_OPERATORS: &[&str] = &["OR", "AND", "XOR", "NAND", "NOR"];
const BOOLEAN_OPERATORS: &[&str] = &["=", "!=", "OR", "AND", "XOR", "NAND", "NOR"];
const MATH_FUNCTIONS: &[&str] = &[
    "round", "abs", "floor", "ceiling", "sqrt", "sin", "cos", "tan", "asin", "acos", "atan", "In",
    "log", "e^", "10^",
];

pub fn module() -> CategoryModule {
    CategoryModule::new(
        BlockCategory::Operators,
        vec![
            BlockHandler::new("value", value)
                .param(Parameter::number("value1", 0.0))
                .param(Parameter::choice("operator", "+", VALUE_OPERATORS))
                .param(Parameter::number("value2", 0.0)),
            BlockHandler::new("bitwise_value", bitwise_value)
                .param(Parameter::integer("value1", 0))
                .param(Parameter::choice("operator", "OR", BITWISE_OPERATORS))
                .param(Parameter::integer("value2", 0)),
            BlockHandler::new("bitwise_boolean", bitwise_boolean)
                .param(Parameter::boolean("boolean1", true))
                .param(Parameter::choice("operator", "OR", BOOLEAN_OPERATORS))
                .param(Parameter::boolean("boolean2", false)),
            BlockHandler::new("boolean", boolean).param(Parameter::boolean("state", true)),
            BlockHandler::new("not_boolean", not_boolean).param(Parameter::boolean("boolean", true)),
            BlockHandler::new("not_value", not_value).param(Parameter::integer("value", 1)),
            BlockHandler::new("stuff", stuff)
                .param(Parameter::choice("operator", "round", MATH_FUNCTIONS))
                .param(Parameter::number("value", 0.0)),
            BlockHandler::new("join", join)
                .param(Parameter::string("text1", ""))
                .param(Parameter::string("text2", "")),
            BlockHandler::new("letter", letter)
                .param(Parameter::integer("position", 1))
                .param(Parameter::string("text", "")),
            BlockHandler::new("length", length).param(Parameter::string("text", "")),
            BlockHandler::new("contain", contain)
                .param(Parameter::string("text", ""))
                .param(Parameter::string("contains", "")),
        ],
    )
}

/// Result of a numeric operator: integer-valued operators stay integers.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Number {
    Int(i64),
    Float(f64),
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(x) => f.write_str(&fmt_float(*x)),
        }
    }
}

fn failed(message: &str) -> BlockError {
    BlockError::ExecutionError(message.to_string())
}

/// Floored modulo: the result takes the sign of the divisor.
fn floored_mod(a: f64, b: f64) -> f64 {
    let r = a % b;
    if r != 0.0 && (r < 0.0) != (b < 0.0) {
        r + b
    } else {
        r
    }
}

fn bitwise(a: i64, operator: &str, b: i64) -> Option<i64> {
    let result = match operator {
        "OR" => a | b,
        "AND" => a & b,
        "XOR" => a ^ b,
        "NAND" => !(a & b),
        "NOR" => !(a | b),
        _ => return None,
    };
    Some(result)
}

fn value(_ctx: &HandlerContext, params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    let v1 = params.number("value1")?;
    let operator = params.text("operator")?;
    let v2 = params.number("value2")?;

    let result = match operator {
        "+" => Number::Float(v1 + v2),
        "-" => Number::Float(v1 - v2),
        "*" => Number::Float(v1 * v2),
        "/" if v2 == 0.0 => return Err(failed("division by zero")),
        "/" => Number::Float(v1 / v2),
        "mod" if v2 == 0.0 => return Err(failed("modulo by zero")),
        "mod" => Number::Float(floored_mod(v1, v2)),
        bitwise_op => {
            if !v1.is_finite() || !v2.is_finite() {
                return Err(failed("cannot convert non-finite value to integer"));
            }
            let r = bitwise(v1 as i64, bitwise_op, v2 as i64)
                .ok_or_else(|| failed("unsupported operator"))?;
            Number::Int(r)
        }
    };

    Ok(format!("{} {} {} = {}", fmt_float(v1), operator, fmt_float(v2), result).into())
}

fn bitwise_value(_ctx: &HandlerContext, params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    let v1 = params.integer("value1")?;
    let operator = params.text("operator")?;
    let v2 = params.integer("value2")?;
    let result = bitwise(v1, operator, v2).ok_or_else(|| failed("unsupported operator"))?;
    Ok(format!("{} {} {} = {}", v1, operator, v2, result).into())
}

fn bitwise_boolean(_ctx: &HandlerContext, params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    let b1 = params.boolean("boolean1")?;
    let operator = params.text("operator")?;
    let b2 = params.boolean("boolean2")?;

    let result = match operator {
        "=" => b1 == b2,
        "!=" => b1 != b2,
        "OR" => b1 || b2,
        "AND" => b1 && b2,
        "XOR" => b1 ^ b2,
        "NAND" => !(b1 && b2),
        "NOR" => !(b1 || b2),
        _ => return Err(failed("unsupported operator")),
    };

    Ok(format!(
        "{} {} {} = {}",
        fmt_bool(b1),
        operator,
        fmt_bool(b2),
        fmt_bool(result)
    )
    .into())
}

fn boolean(_ctx: &HandlerContext, params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    Ok(format!("Boolean: {}", fmt_bool(params.boolean("state")?)).into())
}

fn not_boolean(_ctx: &HandlerContext, params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    let b = params.boolean("boolean")?;
    Ok(format!("not {} = {}", fmt_bool(b), fmt_bool(!b)).into())
}

fn not_value(_ctx: &HandlerContext, params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    let v = params.integer("value")?;
    Ok(format!("not {} = {}", v, !v).into())
}

fn to_int(x: f64) -> Result<Number, BlockError> {
    if x.is_finite() {
        Ok(Number::Int(x as i64))
    } else {
        Err(failed("cannot convert non-finite value to integer"))
    }
}

fn stuff(_ctx: &HandlerContext, params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    let operator = params.text("operator")?;
    let x = params.number("value")?;

    let result = match operator {
        "round" => to_int(x.round_ties_even())?,
        "abs" => Number::Float(x.abs()),
        "floor" => to_int(x.floor())?,
        "ceiling" => to_int(x.ceil())?,
        "sqrt" => Number::Float(x.sqrt()),
        "sin" => Number::Float(x.sin()),
        "cos" => Number::Float(x.cos()),
        "tan" => Number::Float(x.tan()),
        "asin" => Number::Float(x.asin()),
        "acos" => Number::Float(x.acos()),
        "atan" => Number::Float(x.atan()),
        "In" if x == 0.0 => return Err(failed("math domain error")),
        "In" => Number::Float(x.ln()),
        "log" if x == 0.0 => return Err(failed("math domain error")),
        "log" => Number::Float(x.log10()),
        "e^" => Number::Float(x.exp()),
        "10^" => Number::Float(10f64.powf(x)),
        _ => Number::Float(x),
    };

    if let Number::Float(r) = result {
        if r.is_nan() && !x.is_nan() {
            return Err(failed("math domain error"));
        }
        if r.is_infinite() && x.is_finite() {
            return Err(failed("math range error"));
        }
    }

    Ok(format!("{} of {} = {}", operator, fmt_float(x), result).into())
}

fn join(_ctx: &HandlerContext, params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    Ok(format!("{}{}", params.text("text1")?, params.text("text2")?).into())
}

fn letter(_ctx: &HandlerContext, params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    let position = params.integer("position")?;
    let text = params.text("text")?;
    // Positions are 1-based; anything out of range yields an empty string.
    let letter = position
        .checked_sub(1)
        .and_then(|index| usize::try_from(index).ok())
        .and_then(|index| text.chars().nth(index))
        .map(String::from)
        .unwrap_or_default();
    Ok(BlockOutput::Text(letter))
}

fn length(_ctx: &HandlerContext, params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    let count = params.text("text")?.chars().count();
    Ok(BlockOutput::Integer(count as i64))
}

fn contain(_ctx: &HandlerContext, params: &ResolvedParams) -> Result<BlockOutput, BlockError> {
    let text = params.text("text")?;
    let needle = params.text("contains")?;
    Ok(BlockOutput::Boolean(text.contains(needle)))
}
