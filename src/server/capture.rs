//! Selected capture source
//!
//! The editor picks a screen, window or camera to show; the agent only
//! remembers which one. Capturing and streaming are done elsewhere.

use parking_lot::Mutex;

#[derive(Debug, Default)]
pub struct CaptureState {
    source: Mutex<Option<String>>,
}

impl CaptureState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&self, source_id: impl Into<String>) {
        *self.source.lock() = Some(source_id.into());
    }

    pub fn current(&self) -> Option<String> {
        self.source.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_selection_wins() {
        let capture = CaptureState::new();
        assert_eq!(capture.current(), None);
        capture.select("screen:0");
        capture.select("camera:1");
        assert_eq!(capture.current().as_deref(), Some("camera:1"));
    }
}
