//! Native input driver backed by `rdev`
//!
//! Events are synthesized with `rdev::simulate`. Waiting for a key uses a
//! single global `rdev::listen` thread, started on first use, that publishes
//! every key press to waiting callers.

use parking_lot::{Condvar, Mutex};
use rdev::{Button, EventType};
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

use super::{DeviceError, InputDriver, Key, MouseButton};

/// Pause between synthesized events; some platforms drop events sent
/// back to back.
const EVENT_GAP: Duration = Duration::from_millis(15);

#[derive(Default)]
struct KeyFeed {
    /// (number of presses seen, last key pressed)
    last: Mutex<(u64, Option<rdev::Key>)>,
    pressed: Condvar,
}

static KEY_FEED: OnceLock<Arc<KeyFeed>> = OnceLock::new();

fn key_feed() -> Arc<KeyFeed> {
    KEY_FEED
        .get_or_init(|| {
            let feed = Arc::new(KeyFeed::default());
            let publisher = feed.clone();
            thread::Builder::new()
                .name("macro-agent-key-listener".into())
                .spawn(move || {
                    info!("listening for physical key presses");
                    let result = rdev::listen(move |event| {
                        if let EventType::KeyPress(key) = event.event_type {
                            let mut last = publisher.last.lock();
                            last.0 += 1;
                            last.1 = Some(key);
                            publisher.pressed.notify_all();
                        }
                    });
                    if let Err(error) = result {
                        warn!(?error, "key listener stopped");
                    }
                })
                .map_err(|error| warn!(%error, "could not start key listener"))
                .ok();
            feed
        })
        .clone()
}

#[derive(Default)]
pub struct NativeInputDriver {
    cursor: Mutex<Option<(i32, i32)>>,
}

impl NativeInputDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn send(&self, event: &EventType) -> Result<(), DeviceError> {
        rdev::simulate(event)
            .map_err(|_| DeviceError::Simulation(format!("{:?}", event)))?;
        thread::sleep(EVENT_GAP);
        Ok(())
    }
}

impl InputDriver for NativeInputDriver {
    fn key_down(&self, key: &Key) -> Result<(), DeviceError> {
        self.send(&EventType::KeyPress(to_rdev_key(key)?))
    }

    fn key_up(&self, key: &Key) -> Result<(), DeviceError> {
        self.send(&EventType::KeyRelease(to_rdev_key(key)?))
    }

    fn type_text(&self, text: &str) -> Result<(), DeviceError> {
        // Validate the whole string before sending anything.
        let strokes = text
            .chars()
            .map(char_stroke)
            .collect::<Result<Vec<_>, _>>()?;

        for (key, shifted) in strokes {
            if shifted {
                self.send(&EventType::KeyPress(rdev::Key::ShiftLeft))?;
            }
            self.send(&EventType::KeyPress(key))?;
            self.send(&EventType::KeyRelease(key))?;
            if shifted {
                self.send(&EventType::KeyRelease(rdev::Key::ShiftLeft))?;
            }
        }
        Ok(())
    }

    fn move_to(&self, x: i32, y: i32) -> Result<(), DeviceError> {
        self.send(&EventType::MouseMove {
            x: x as f64,
            y: y as f64,
        })?;
        *self.cursor.lock() = Some((x, y));
        Ok(())
    }

    fn cursor_position(&self) -> Option<(i32, i32)> {
        *self.cursor.lock()
    }

    fn scroll(&self, delta: i64) -> Result<(), DeviceError> {
        self.send(&EventType::Wheel {
            delta_x: 0,
            delta_y: delta,
        })
    }

    fn button_down(&self, button: MouseButton) -> Result<(), DeviceError> {
        self.send(&EventType::ButtonPress(to_rdev_button(button)))
    }

    fn button_up(&self, button: MouseButton) -> Result<(), DeviceError> {
        self.send(&EventType::ButtonRelease(to_rdev_button(button)))
    }

    fn wait_for_key(&self, key: Option<&Key>) -> Result<(), DeviceError> {
        let wanted = key.map(to_rdev_key).transpose()?;
        let feed = key_feed();
        let mut last = feed.last.lock();
        let mut seen = last.0;
        loop {
            feed.pressed.wait(&mut last);
            if last.0 == seen {
                continue;
            }
            seen = last.0;
            match (wanted, last.1) {
                (None, _) => return Ok(()),
                (Some(w), Some(pressed)) if w == pressed => return Ok(()),
                _ => {}
            }
        }
    }
}

fn to_rdev_button(button: MouseButton) -> Button {
    match button {
        MouseButton::Left => Button::Left,
        MouseButton::Right => Button::Right,
        MouseButton::Middle => Button::Middle,
    }
}

fn to_rdev_key(key: &Key) -> Result<rdev::Key, DeviceError> {
    use rdev::Key as K;
    let mapped = match key {
        Key::Ctrl => K::ControlLeft,
        Key::Shift => K::ShiftLeft,
        Key::Alt => K::Alt,
        Key::Meta => K::MetaLeft,
        Key::Enter => K::Return,
        Key::Space => K::Space,
        Key::Tab => K::Tab,
        Key::Escape => K::Escape,
        Key::Backspace => K::Backspace,
        Key::Delete => K::Delete,
        Key::Insert => K::Insert,
        Key::Home => K::Home,
        Key::End => K::End,
        Key::PageUp => K::PageUp,
        Key::PageDown => K::PageDown,
        Key::Up => K::UpArrow,
        Key::Down => K::DownArrow,
        Key::Left => K::LeftArrow,
        Key::Right => K::RightArrow,
        Key::CapsLock => K::CapsLock,
        Key::PrintScreen => K::PrintScreen,
        Key::F(n) => match n {
            1 => K::F1,
            2 => K::F2,
            3 => K::F3,
            4 => K::F4,
            5 => K::F5,
            6 => K::F6,
            7 => K::F7,
            8 => K::F8,
            9 => K::F9,
            10 => K::F10,
            11 => K::F11,
            12 => K::F12,
            _ => return Err(DeviceError::UnknownKey(key.to_string())),
        },
        Key::Char(c) => {
            let (mapped, shifted) = char_stroke(*c)?;
            if shifted {
                // Shifted symbols need a modifier; a lone key event cannot carry it.
                return Err(DeviceError::UnsupportedCharacter(*c));
            }
            mapped
        }
    };
    Ok(mapped)
}

/// US layout: the physical key for `c`, and whether shift is held.
fn char_stroke(c: char) -> Result<(rdev::Key, bool), DeviceError> {
    use rdev::Key as K;
    let shifted = c.is_ascii_uppercase();
    let stroke = match c.to_ascii_lowercase() {
        'a' => (K::KeyA, shifted),
        'b' => (K::KeyB, shifted),
        'c' => (K::KeyC, shifted),
        'd' => (K::KeyD, shifted),
        'e' => (K::KeyE, shifted),
        'f' => (K::KeyF, shifted),
        'g' => (K::KeyG, shifted),
        'h' => (K::KeyH, shifted),
        'i' => (K::KeyI, shifted),
        'j' => (K::KeyJ, shifted),
        'k' => (K::KeyK, shifted),
        'l' => (K::KeyL, shifted),
        'm' => (K::KeyM, shifted),
        'n' => (K::KeyN, shifted),
        'o' => (K::KeyO, shifted),
        'p' => (K::KeyP, shifted),
        'q' => (K::KeyQ, shifted),
        'r' => (K::KeyR, shifted),
        's' => (K::KeyS, shifted),
        't' => (K::KeyT, shifted),
        'u' => (K::KeyU, shifted),
        'v' => (K::KeyV, shifted),
        'w' => (K::KeyW, shifted),
        'x' => (K::KeyX, shifted),
        'y' => (K::KeyY, shifted),
        'z' => (K::KeyZ, shifted),
        '1' => (K::Num1, false),
        '2' => (K::Num2, false),
        '3' => (K::Num3, false),
        '4' => (K::Num4, false),
        '5' => (K::Num5, false),
        '6' => (K::Num6, false),
        '7' => (K::Num7, false),
        '8' => (K::Num8, false),
        '9' => (K::Num9, false),
        '0' => (K::Num0, false),
        '!' => (K::Num1, true),
        '@' => (K::Num2, true),
        '#' => (K::Num3, true),
        '$' => (K::Num4, true),
        '%' => (K::Num5, true),
        '^' => (K::Num6, true),
        '&' => (K::Num7, true),
        '*' => (K::Num8, true),
        '(' => (K::Num9, true),
        ')' => (K::Num0, true),
        ' ' => (K::Space, false),
        '\n' => (K::Return, false),
        '\t' => (K::Tab, false),
        '-' => (K::Minus, false),
        '_' => (K::Minus, true),
        '=' => (K::Equal, false),
        '+' => (K::Equal, true),
        '[' => (K::LeftBracket, false),
        '{' => (K::LeftBracket, true),
        ']' => (K::RightBracket, false),
        '}' => (K::RightBracket, true),
        ';' => (K::SemiColon, false),
        ':' => (K::SemiColon, true),
        '\'' => (K::Quote, false),
        '"' => (K::Quote, true),
        '\\' => (K::BackSlash, false),
        '|' => (K::BackSlash, true),
        ',' => (K::Comma, false),
        '<' => (K::Comma, true),
        '.' => (K::Dot, false),
        '>' => (K::Dot, true),
        '/' => (K::Slash, false),
        '?' => (K::Slash, true),
        '`' => (K::BackQuote, false),
        '~' => (K::BackQuote, true),
        _ => return Err(DeviceError::UnsupportedCharacter(c)),
    };
    Ok(stroke)
}
