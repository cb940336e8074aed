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

//! Configuration module.
//!
//! Handles loading and saving pulse settings, and the shared handle through
//! which the UI layer and the sequencer observe the same live values.

use anyhow::Result;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Pulse duration range in milliseconds.
pub const PULSE_DURATION_RANGE: (f32, f32) = (50.0, 1000.0);

/// Spacing between pulses of one train, in milliseconds.
pub const PULSE_SPACING_RANGE: (f32, f32) = (50.0, 2000.0);

/// Pause after each question, in milliseconds.
pub const QUESTION_SPACING_RANGE: (f32, f32) = (1000.0, 10000.0);

/// Countdown before transmission, in milliseconds.
pub const COUNTDOWN_RANGE: (f32, f32) = (0.0, 30000.0);

/// Vibration intensity in percent.
pub const INTENSITY_RANGE: (f32, f32) = (1.0, 100.0);

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Show the floating pulse button.
    pub floating_button_enabled: bool,

    /// Send notifications (e.g. to a paired band) instead of vibrating.
    pub use_notification_mode: bool,

    /// Length of one pulse in milliseconds.
    pub pulse_duration_ms: f32,

    /// Gap between pulses of the same train in milliseconds.
    pub pulse_spacing_ms: f32,

    /// Pause after each transmitted answer in milliseconds.
    pub inter_question_spacing_ms: f32,

    /// Countdown before the first answer in milliseconds.
    pub countdown_ms: f32,

    /// Vibration strength, 1-100.
    pub vibration_intensity_percent: f32,

    /// UI only.
    pub dark_mode_preference: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            floating_button_enabled: false,
            use_notification_mode: true,
            pulse_duration_ms: 300.0,
            pulse_spacing_ms: 300.0,
            inter_question_spacing_ms: 3000.0,
            countdown_ms: 10000.0,
            vibration_intensity_percent: 100.0,
            dark_mode_preference: true,
        }
    }
}

/// Convert a millisecond setting into a duration, truncating fractions.
/// Negative and NaN values become zero.
pub fn millis(value: f32) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::from_millis(value as u64)
    } else {
        Duration::ZERO
    }
}

fn clamp_range(value: f32, (min, max): (f32, f32)) -> f32 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

impl Config {
    /// Fold every numeric setting into the range the settings screen allows.
    pub fn clamped(mut self) -> Self {
        self.pulse_duration_ms = clamp_range(self.pulse_duration_ms, PULSE_DURATION_RANGE);
        self.pulse_spacing_ms = clamp_range(self.pulse_spacing_ms, PULSE_SPACING_RANGE);
        self.inter_question_spacing_ms =
            clamp_range(self.inter_question_spacing_ms, QUESTION_SPACING_RANGE);
        self.countdown_ms = clamp_range(self.countdown_ms, COUNTDOWN_RANGE);
        self.vibration_intensity_percent =
            clamp_range(self.vibration_intensity_percent, INTENSITY_RANGE);
        self
    }

    /// Keep values inside their valid domain: durations finite and
    /// non-negative, pulse at least 1 ms, intensity 1-100.
    pub fn sanitized(mut self) -> Self {
        let non_negative = |v: f32| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        self.pulse_duration_ms = non_negative(self.pulse_duration_ms).max(1.0);
        self.pulse_spacing_ms = non_negative(self.pulse_spacing_ms);
        self.inter_question_spacing_ms = non_negative(self.inter_question_spacing_ms);
        self.countdown_ms = non_negative(self.countdown_ms);
        self.vibration_intensity_percent =
            clamp_range(self.vibration_intensity_percent, INTENSITY_RANGE);
        self
    }

    /// Wait after each pulse of a train.
    pub fn pulse_step(&self) -> Duration {
        millis(self.pulse_duration_ms) + millis(self.pulse_spacing_ms)
    }

    /// Whole seconds of countdown.
    pub fn countdown_seconds(&self) -> u32 {
        u32::try_from(millis(self.countdown_ms).as_secs()).unwrap_or(u32::MAX)
    }

    /// Default location of the config file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vibratoque")
            .join("config.toml")
    }

    /// Load configuration from file or create default.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load configuration from `path`, writing defaults there if it is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str::<Self>(&content)?.clamped()
        } else {
            let config = Self::default();
            config.save_to(path)?;
            config
        };

        Ok(config)
    }

    /// Save configuration to file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Live configuration shared between the UI layer and running sequences.
///
/// Readers always see the latest values; a run re-reads on every pulse and
/// every wait, so edits take effect mid-run.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<Config>>,
}

impl SharedConfig {
    pub fn new(config: Config) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Copy of the current values.
    pub fn snapshot(&self) -> Config {
        self.inner.read().clone()
    }

    /// Read a single value without copying the whole record.
    pub fn read<T>(&self, f: impl FnOnce(&Config) -> T) -> T {
        f(&self.inner.read())
    }

    /// Edit the configuration in place. Values are sanitized afterwards.
    pub fn update(&self, f: impl FnOnce(&mut Config)) {
        let mut guard = self.inner.write();
        f(&mut guard);
        *guard = guard.clone().sanitized();
    }

    /// Replace the whole configuration.
    pub fn replace(&self, config: Config) {
        *self.inner.write() = config.sanitized();
    }
}
