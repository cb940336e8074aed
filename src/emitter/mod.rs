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

//! Pulse emission abstraction and factory.
//!
//! A pulse is either a physical vibration or a notification (which a paired
//! wearable turns into a vibration). The channel is picked from the
//! configuration on every single pulse.

mod haptic;
mod notification;
mod stub;

pub use haptic::{Amplitude, HapticEmitter, VibratorDevice};
pub use notification::{NotificationEmitter, Notifier, PulseNotification};
pub use stub::{LogNotifier, LogVibrator};

use tracing::info;

use crate::config::Config;

/// Trait for pulse emission backends.
///
/// `emit_pulse` triggers one pulse and returns right away; waiting out the
/// pulse is the caller's job. Failures are logged by the implementation and
/// never surfaced.
pub trait PulseEmitter: Send + Sync {
    /// Get the backend name (e.g., "Haptic", "Notification").
    fn backend_name(&self) -> &'static str;

    /// Fire one pulse. `ordinal` is the 1-based position within the current
    /// pulse train, or 0 for a pulse outside any train.
    fn emit_pulse(&self, config: &Config, ordinal: u32);
}

/// Emitter that chooses between vibration and notification per pulse.
pub struct ChannelEmitter {
    haptic: HapticEmitter,
    notification: NotificationEmitter,
}

impl ChannelEmitter {
    pub fn new(vibrator: Box<dyn VibratorDevice>, notifier: Box<dyn Notifier>) -> Self {
        Self {
            haptic: HapticEmitter::new(vibrator),
            notification: NotificationEmitter::new(notifier),
        }
    }

    fn select(&self, config: &Config) -> &dyn PulseEmitter {
        if config.use_notification_mode {
            &self.notification
        } else {
            &self.haptic
        }
    }
}

impl PulseEmitter for ChannelEmitter {
    fn backend_name(&self) -> &'static str {
        "Channel (haptic/notification)"
    }

    fn emit_pulse(&self, config: &Config, ordinal: u32) {
        self.select(config).emit_pulse(config, ordinal);
    }
}

/// Create the emitter used when no device backends are available.
///
/// Both channels log what they would do.
pub fn create_emitter() -> Box<dyn PulseEmitter> {
    let emitter = ChannelEmitter::new(Box::new(LogVibrator), Box::new(LogNotifier));
    info!(
        "Pulse emitter: {} ({} / {})",
        emitter.backend_name(),
        emitter.haptic.backend_name(),
        emitter.notification.backend_name()
    );
    Box::new(emitter)
}
