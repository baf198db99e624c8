//! Device collaborators
//!
//! Keyboard, mouse and volume control are reached through the [`InputDriver`]
//! and [`VolumeControl`] traits. The default build ships a recording driver
//! and an in-process mixer; the `native-input` feature adds a driver that
//! synthesizes real OS input events.

pub mod keys;
pub mod mixer;
pub mod recording;

#[cfg(feature = "native-input")]
pub mod native;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use keys::{parse_combo, Key};
pub use mixer::SoftwareMixer;
pub use recording::{InputAction, RecordingDriver};

#[cfg(feature = "native-input")]
pub use native::NativeInputDriver;

/// Mouse buttons addressable from blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub fn as_str(&self) -> &'static str {
        match self {
            MouseButton::Left => "left",
            MouseButton::Right => "right",
            MouseButton::Middle => "middle",
        }
    }
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MouseButton {
    type Err = DeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(MouseButton::Left),
            "right" => Ok(MouseButton::Right),
            "middle" => Ok(MouseButton::Middle),
            other => Err(DeviceError::UnknownButton(other.to_string())),
        }
    }
}

/// Device errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum DeviceError {
    #[error("invalid key: '{0}'")]
    UnknownKey(String),

    #[error("invalid mouse button: '{0}'")]
    UnknownButton(String),

    #[error("cannot type character {0:?}")]
    UnsupportedCharacter(char),

    #[error("{0} is not supported by this driver")]
    Unsupported(String),

    #[error("input simulation failed: {0}")]
    Simulation(String),
}

/// Keyboard and mouse output.
///
/// Implementations must be callable from several request threads; a single
/// block's calls arrive in order from one thread.
pub trait InputDriver: Send + Sync {
    fn key_down(&self, key: &Key) -> Result<(), DeviceError>;

    fn key_up(&self, key: &Key) -> Result<(), DeviceError>;

    fn type_text(&self, text: &str) -> Result<(), DeviceError>;

    fn move_to(&self, x: i32, y: i32) -> Result<(), DeviceError>;

    /// Last known cursor position, if the driver tracks one.
    fn cursor_position(&self) -> Option<(i32, i32)>;

    /// Positive values scroll up.
    fn scroll(&self, delta: i64) -> Result<(), DeviceError>;

    fn button_down(&self, button: MouseButton) -> Result<(), DeviceError>;

    fn button_up(&self, button: MouseButton) -> Result<(), DeviceError>;

    /// Block until `key` (or any key when `None`) is pressed.
    fn wait_for_key(&self, key: Option<&Key>) -> Result<(), DeviceError>;

    /// Press every key in order, then release them in reverse.
    fn tap(&self, keys: &[Key]) -> Result<(), DeviceError> {
        for key in keys {
            self.key_down(key)?;
        }
        for key in keys.iter().rev() {
            self.key_up(key)?;
        }
        Ok(())
    }

    fn click(&self, button: MouseButton) -> Result<(), DeviceError> {
        self.button_down(button)?;
        self.button_up(button)
    }
}

/// System output volume, as a percentage.
pub trait VolumeControl: Send + Sync {
    fn level(&self) -> Result<u8, DeviceError>;

    /// `level` is already clamped to 0..=100 by callers.
    fn set_level(&self, level: u8) -> Result<(), DeviceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mouse_button_parsing() {
        assert_eq!("left".parse::<MouseButton>().unwrap(), MouseButton::Left);
        assert_eq!(" Right ".parse::<MouseButton>().unwrap(), MouseButton::Right);
        assert!(matches!(
            "side".parse::<MouseButton>(),
            Err(DeviceError::UnknownButton(_))
        ));
    }

    #[test]
    fn test_tap_releases_in_reverse() {
        let driver = RecordingDriver::new();
        let combo = parse_combo("ctrl+shift+s").unwrap();
        driver.tap(&combo).unwrap();

        let actions = driver.actions();
        assert_eq!(actions.len(), 6);
        assert_eq!(actions[0], InputAction::KeyDown(Key::Ctrl));
        assert_eq!(actions[2], InputAction::KeyDown(Key::Char('s')));
        assert_eq!(actions[3], InputAction::KeyUp(Key::Char('s')));
        assert_eq!(actions[5], InputAction::KeyUp(Key::Ctrl));
    }
}
