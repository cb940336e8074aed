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

//! Logging backends for hosts without vibration or notification support.

use anyhow::Result;
use std::time::Duration;
use tracing::info;

use super::{Amplitude, Notifier, PulseNotification, VibratorDevice};

/// Stub vibrator that only logs.
pub struct LogVibrator;

impl VibratorDevice for LogVibrator {
    fn name(&self) -> &'static str {
        "Stub vibrator (log)"
    }

    fn vibrate(&self, duration: Duration, amplitude: Amplitude) -> Result<()> {
        info!("[STUB] Would vibrate {:?} at {:?}", duration, amplitude);
        Ok(())
    }
}

/// Stub notifier that only logs.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "Stub notifier (log)"
    }

    fn notify(&self, notification: &PulseNotification) -> Result<()> {
        info!(
            "[STUB] Would notify #{}: {} - {}",
            notification.id, notification.title, notification.text
        );
        Ok(())
    }
}
