//! Key names
//!
//! Blocks name keys the way the editor shows them (`a`, `enter`, `ctrl`,
//! `f5`, ...). Combinations are joined with `+`, e.g. `ctrl+shift+s`.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::DeviceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Key {
    /// A printable character; ASCII letters are stored lowercase
    Char(char),
    Ctrl,
    Shift,
    Alt,
    Meta,
    Enter,
    Space,
    Tab,
    Escape,
    Backspace,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    CapsLock,
    PrintScreen,
    /// Function key F1..=F12
    F(u8),
}

impl Key {
    pub fn is_modifier(&self) -> bool {
        matches!(self, Key::Ctrl | Key::Shift | Key::Alt | Key::Meta)
    }
}

impl FromStr for Key {
    type Err = DeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return match c {
                ' ' => Ok(Key::Space),
                '\n' => Ok(Key::Enter),
                '\t' => Ok(Key::Tab),
                c if c.is_control() => Err(DeviceError::UnknownKey(s.to_string())),
                c => Ok(Key::Char(c.to_ascii_lowercase())),
            };
        }

        let name = s.trim().to_ascii_lowercase();
        let key = match name.as_str() {
            "ctrl" | "control" | "ctl" => Key::Ctrl,
            "shift" => Key::Shift,
            "alt" | "option" => Key::Alt,
            "meta" | "win" | "windows" | "cmd" | "command" | "super" => Key::Meta,
            "enter" | "return" => Key::Enter,
            "space" | "spacebar" => Key::Space,
            "tab" => Key::Tab,
            "esc" | "escape" => Key::Escape,
            "backspace" => Key::Backspace,
            "delete" | "del" => Key::Delete,
            "insert" | "ins" => Key::Insert,
            "home" => Key::Home,
            "end" => Key::End,
            "pageup" | "page up" | "pgup" => Key::PageUp,
            "pagedown" | "page down" | "pgdn" => Key::PageDown,
            "up" | "up arrow" | "arrowup" => Key::Up,
            "down" | "down arrow" | "arrowdown" => Key::Down,
            "left" | "left arrow" | "arrowleft" => Key::Left,
            "right" | "right arrow" | "arrowright" => Key::Right,
            "caps lock" | "capslock" => Key::CapsLock,
            "print screen" | "printscreen" | "prtsc" => Key::PrintScreen,
            _ => return parse_function_key(&name).ok_or_else(|| DeviceError::UnknownKey(s.to_string())),
        };
        Ok(key)
    }
}

fn parse_function_key(name: &str) -> Option<Key> {
    let number: u8 = name.strip_prefix('f')?.parse().ok()?;
    (1..=12).contains(&number).then_some(Key::F(number))
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{}", c),
            Key::F(n) => write!(f, "f{}", n),
            Key::Ctrl => f.write_str("ctrl"),
            Key::Shift => f.write_str("shift"),
            Key::Alt => f.write_str("alt"),
            Key::Meta => f.write_str("meta"),
            Key::Enter => f.write_str("enter"),
            Key::Space => f.write_str("space"),
            Key::Tab => f.write_str("tab"),
            Key::Escape => f.write_str("esc"),
            Key::Backspace => f.write_str("backspace"),
            Key::Delete => f.write_str("delete"),
            Key::Insert => f.write_str("insert"),
            Key::Home => f.write_str("home"),
            Key::End => f.write_str("end"),
            Key::PageUp => f.write_str("page up"),
            Key::PageDown => f.write_str("page down"),
            Key::Up => f.write_str("up"),
            Key::Down => f.write_str("down"),
            Key::Left => f.write_str("left"),
            Key::Right => f.write_str("right"),
            Key::CapsLock => f.write_str("caps lock"),
            Key::PrintScreen => f.write_str("print screen"),
        }
    }
}

/// Parse `ctrl+shift+s` style combinations. A lone `+` is the plus key.
pub fn parse_combo(combo: &str) -> Result<Vec<Key>, DeviceError> {
    if combo.is_empty() {
        return Err(DeviceError::UnknownKey(String::new()));
    }
    if combo == "+" {
        return Ok(vec![Key::Char('+')]);
    }

    let mut keys = Vec::new();
    let mut parts = combo.split('+').peekable();
    while let Some(part) = parts.next() {
        // "ctrl++" ends with an empty segment pair standing for the plus key.
        if part.is_empty() {
            if parts.peek().is_some_and(|next| next.is_empty()) {
                parts.next();
                keys.push(Key::Char('+'));
                continue;
            }
            return Err(DeviceError::UnknownKey(combo.to_string()));
        }
        keys.push(part.parse()?);
    }
    Ok(keys)
}
