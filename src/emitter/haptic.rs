// Copyright 2026 Daniel Pelikan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Physical vibration pulses.

use anyhow::Result;
use std::time::Duration;
use tracing::{debug, error};

use super::PulseEmitter;
use crate::config::{millis, Config};

/// Highest amplitude a vibrator accepts.
pub const MAX_AMPLITUDE: u8 = 255;

/// Above this level the device default is requested instead; some drivers
/// round high explicit values down.
const DEFAULT_AMPLITUDE_THRESHOLD: u8 = 240;

/// Vibration strength requested from the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Amplitude {
    /// Let the device use its default (maximum) strength.
    Default,
    /// Explicit level in `1..=255`.
    Level(u8),
}

impl Amplitude {
    /// Map an intensity percentage linearly onto the device range.
    pub fn from_intensity(percent: f32) -> Self {
        let scaled = (f64::from(percent) * 2.55) as i32;
        let level = scaled.clamp(1, MAX_AMPLITUDE as i32) as u8;
        if level > DEFAULT_AMPLITUDE_THRESHOLD {
            Amplitude::Default
        } else {
            Amplitude::Level(level)
        }
    }
}

/// Vibration hardware backend.
pub trait VibratorDevice: Send + Sync {
    fn name(&self) -> &'static str;

    /// Start a one-shot vibration. Must not block for `duration`.
    fn vibrate(&self, duration: Duration, amplitude: Amplitude) -> Result<()>;
}

/// Emitter driving a vibrator device.
pub struct HapticEmitter {
    device: Box<dyn VibratorDevice>,
}

impl HapticEmitter {
    pub fn new(device: Box<dyn VibratorDevice>) -> Self {
        Self { device }
    }
}

impl PulseEmitter for HapticEmitter {
    fn backend_name(&self) -> &'static str {
        self.device.name()
    }

    fn emit_pulse(&self, config: &Config, ordinal: u32) {
        let duration = millis(config.pulse_duration_ms);
        let amplitude = Amplitude::from_intensity(config.vibration_intensity_percent);
        debug!("Vibrate #{}: {:?} at {:?}", ordinal, duration, amplitude);

        if let Err(e) = self.device.vibrate(duration, amplitude) {
            error!("Vibration failed on {}: {}", self.device.name(), e);
        }
    }
}
