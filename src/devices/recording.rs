//! Recording input driver
//!
//! Logs and records every action instead of touching the OS. Used when the
//! agent is built without `native-input`, and by tests to observe what a
//! block did.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::debug;

use super::{DeviceError, InputDriver, Key, MouseButton};

/// One recorded input action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum InputAction {
    KeyDown(Key),
    KeyUp(Key),
    Type(String),
    MoveTo(i32, i32),
    Scroll(i64),
    ButtonDown(MouseButton),
    ButtonUp(MouseButton),
    WaitForKey(Option<Key>),
}

#[derive(Debug, Default)]
pub struct RecordingDriver {
    actions: Mutex<Vec<InputAction>>,
    cursor: Mutex<(i32, i32)>,
    queued_keys: Mutex<VecDeque<Key>>,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, oldest first.
    pub fn actions(&self) -> Vec<InputAction> {
        self.actions.lock().clone()
    }

    pub fn clear(&self) {
        self.actions.lock().clear();
    }

    /// Make a key press available to a later `wait_for_key`.
    pub fn queue_key_press(&self, key: Key) {
        self.queued_keys.lock().push_back(key);
    }

    fn record(&self, action: InputAction) {
        debug!(?action, "recorded input");
        self.actions.lock().push(action);
    }
}

impl InputDriver for RecordingDriver {
    fn key_down(&self, key: &Key) -> Result<(), DeviceError> {
        self.record(InputAction::KeyDown(*key));
        Ok(())
    }

    fn key_up(&self, key: &Key) -> Result<(), DeviceError> {
        self.record(InputAction::KeyUp(*key));
        Ok(())
    }

    fn type_text(&self, text: &str) -> Result<(), DeviceError> {
        self.record(InputAction::Type(text.to_string()));
        Ok(())
    }

    fn move_to(&self, x: i32, y: i32) -> Result<(), DeviceError> {
        *self.cursor.lock() = (x, y);
        self.record(InputAction::MoveTo(x, y));
        Ok(())
    }

    fn cursor_position(&self) -> Option<(i32, i32)> {
        Some(*self.cursor.lock())
    }

    fn scroll(&self, delta: i64) -> Result<(), DeviceError> {
        self.record(InputAction::Scroll(delta));
        Ok(())
    }

    fn button_down(&self, button: MouseButton) -> Result<(), DeviceError> {
        self.record(InputAction::ButtonDown(button));
        Ok(())
    }

    fn button_up(&self, button: MouseButton) -> Result<(), DeviceError> {
        self.record(InputAction::ButtonUp(button));
        Ok(())
    }

    /// Consumes queued presses up to and including the first match. Without
    /// a match there is nothing to wait on, so this fails instead of hanging.
    fn wait_for_key(&self, key: Option<&Key>) -> Result<(), DeviceError> {
        self.record(InputAction::WaitForKey(key.copied()));
        let mut queued = self.queued_keys.lock();
        while let Some(pressed) = queued.pop_front() {
            if key.map_or(true, |wanted| *wanted == pressed) {
                return Ok(());
            }
        }
        Err(DeviceError::Unsupported(
            "waiting for a physical key press".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let driver = RecordingDriver::new();
        driver.move_to(10, 20).unwrap();
        driver.click(MouseButton::Left).unwrap();
        driver.type_text("hi").unwrap();

        assert_eq!(
            driver.actions(),
            vec![
                InputAction::MoveTo(10, 20),
                InputAction::ButtonDown(MouseButton::Left),
                InputAction::ButtonUp(MouseButton::Left),
                InputAction::Type("hi".into()),
            ]
        );
        assert_eq!(driver.cursor_position(), Some((10, 20)));
    }

    #[test]
    fn test_wait_for_key_uses_queue() {
        let driver = RecordingDriver::new();
        driver.queue_key_press(Key::Char('a'));
        driver.queue_key_press(Key::Enter);

        assert!(driver.wait_for_key(Some(&Key::Enter)).is_ok());
        // Queue is drained now.
        assert!(driver.wait_for_key(None).is_err());
    }
}
