//! Text rendering for handler results
//!
//! The editor's console shows results exactly as the agent has always
//! printed them: floats keep a trailing `.0`, large and tiny magnitudes use
//! a signed two-digit exponent, and booleans are capitalized.

/// Render a float the way the editor console expects (`6.0`, `0.5`, `1e+20`).
pub fn fmt_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".into();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf".into() } else { "-inf".into() };
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0".into() } else { "0.0".into() };
    }

    let magnitude = value.abs();
    if (1e-4..1e16).contains(&magnitude) {
        if value.fract() == 0.0 {
            format!("{:.1}", value)
        } else {
            format!("{}", value)
        }
    } else {
        scientific(value)
    }
}

fn scientific(value: f64) -> String {
    let raw = format!("{:e}", value);
    match raw.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        None => raw,
    }
}

/// Render a boolean as `True` / `False`.
pub fn fmt_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}
