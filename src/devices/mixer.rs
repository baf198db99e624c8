//! In-process volume level
//!
//! Stands in for the OS mixer when no native volume backend is available.

use parking_lot::Mutex;
use tracing::info;

use super::{DeviceError, VolumeControl};

#[derive(Debug)]
pub struct SoftwareMixer {
    level: Mutex<u8>,
}

impl SoftwareMixer {
    pub fn new(level: u8) -> Self {
        Self {
            level: Mutex::new(level.min(100)),
        }
    }
}

impl Default for SoftwareMixer {
    fn default() -> Self {
        Self::new(50)
    }
}

impl VolumeControl for SoftwareMixer {
    fn level(&self) -> Result<u8, DeviceError> {
        Ok(*self.level.lock())
    }

    fn set_level(&self, level: u8) -> Result<(), DeviceError> {
        let level = level.min(100);
        *self.level.lock() = level;
        info!(level, "volume level set");
        Ok(())
    }
}
