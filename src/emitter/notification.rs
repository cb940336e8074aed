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

//! Notification pulses.
//!
//! Each pulse is posted as a separate high-priority notification so that a
//! paired wearable vibrates once per notification. Ids must differ between
//! pulses or the system collapses them into one alert.

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, error};

use super::PulseEmitter;
use crate::config::Config;

/// Window of the timestamp part of a notification id.
const ID_WINDOW_MS: i64 = 100_000;

/// Notification title.
pub const NOTIFICATION_TITLE: &str = "VibraToque";

/// One notification to post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PulseNotification {
    pub id: u32,
    pub title: String,
    pub text: String,
}

impl PulseNotification {
    /// Build the notification for pulse `ordinal` at the current time.
    pub fn for_pulse(ordinal: u32) -> Self {
        Self::at(Utc::now().timestamp_millis(), ordinal)
    }

    /// Build the notification for pulse `ordinal` at `now_ms`.
    pub fn at(now_ms: i64, ordinal: u32) -> Self {
        let base = now_ms.rem_euclid(ID_WINDOW_MS) as u32;
        Self {
            id: base + ordinal,
            title: NOTIFICATION_TITLE.to_string(),
            text: format!("Signal {}", ordinal),
        }
    }
}

/// Notification backend.
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;

    /// Post a notification and return immediately.
    fn notify(&self, notification: &PulseNotification) -> Result<()>;
}

/// Emitter posting one notification per pulse.
pub struct NotificationEmitter {
    notifier: Box<dyn Notifier>,
}

impl NotificationEmitter {
    pub fn new(notifier: Box<dyn Notifier>) -> Self {
        Self { notifier }
    }
}

impl PulseEmitter for NotificationEmitter {
    fn backend_name(&self) -> &'static str {
        self.notifier.name()
    }

    fn emit_pulse(&self, _config: &Config, ordinal: u32) {
        let notification = PulseNotification::for_pulse(ordinal);
        debug!("Notify #{}: id={}", ordinal, notification.id);

        if let Err(e) = self.notifier.notify(&notification) {
            error!("Notification failed on {}: {}", self.notifier.name(), e);
        }
    }
}
