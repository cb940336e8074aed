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

//! Application state management.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::sequencer::SequenceObserver;

/// Display text before the first run.
pub const DISPLAY_READY: &str = "READY";

/// Display text after a run completes.
pub const DISPLAY_END: &str = "END";

/// Display text after a run is stopped.
pub const DISPLAY_STOP: &str = "STOP";

/// Highest status index; the progress indicator has four segments.
pub const MAX_STATUS_INDEX: u8 = 4;

/// Phase of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Validate,
    Alert,
    Countdown,
    Transmit,
    Finished,
    Cancelled,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Validate => "Validate",
            Phase::Alert => "Alert",
            Phase::Countdown => "Countdown",
            Phase::Transmit => "Transmit",
            Phase::Finished => "Finished",
            Phase::Cancelled => "Cancelled",
        }
    }
}

/// State owned by one run of the sequencer. Dropped when the run ends.
#[derive(Debug)]
pub struct RunState {
    pub phase: Phase,
    pub status_index: u8,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            phase: Phase::Validate,
            status_index: 0,
        }
    }
}

/// Shared state read by the UI layer.
#[derive(Debug)]
pub struct AppState {
    /// Text currently shown on the main display.
    pub display: RwLock<String>,

    /// Progress indicator position, 0-4.
    pub status_index: RwLock<u8>,

    /// Whether a run is in progress.
    pub running: RwLock<bool>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            display: RwLock::new(DISPLAY_READY.to_string()),
            status_index: RwLock::new(0),
            running: RwLock::new(false),
        }
    }
}

impl AppState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_running(&self, running: bool) {
        *self.running.write() = running;
    }

    pub fn is_running(&self) -> bool {
        *self.running.read()
    }

    pub fn set_display(&self, text: impl Into<String>) {
        *self.display.write() = text.into();
    }

    pub fn get_display(&self) -> String {
        self.display.read().clone()
    }

    pub fn set_status_index(&self, index: u8) {
        *self.status_index.write() = index.min(MAX_STATUS_INDEX);
    }

    pub fn get_status_index(&self) -> u8 {
        *self.status_index.read()
    }

    /// Reset after the user stops a run.
    pub fn set_stopped(&self) {
        self.set_running(false);
        self.set_display(DISPLAY_STOP);
        self.set_status_index(0);
    }
}

impl SequenceObserver for AppState {
    fn on_display(&self, text: &str) {
        self.set_display(text);
    }

    fn on_status_index(&self, index: u8) {
        self.set_status_index(index);
    }

    fn on_finished(&self) {
        self.set_running(false);
        self.set_display(DISPLAY_END);
        self.set_status_index(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = AppState::new();
        assert_eq!(state.get_display(), DISPLAY_READY);
        assert_eq!(state.get_status_index(), 0);
        assert!(!state.is_running());
    }

    #[test]
    fn test_observer_updates_state() {
        let state = AppState::new();
        state.set_running(true);

        state.on_display("01-C");
        state.on_status_index(3);
        assert_eq!(state.get_display(), "01-C");
        assert_eq!(state.get_status_index(), 3);

        state.on_finished();
        assert_eq!(state.get_display(), DISPLAY_END);
        assert_eq!(state.get_status_index(), 0);
        assert!(!state.is_running());
    }

    #[test]
    fn test_status_index_capped() {
        let state = AppState::new();
        state.set_status_index(9);
        assert_eq!(state.get_status_index(), MAX_STATUS_INDEX);
    }

    #[test]
    fn test_stopped() {
        let state = AppState::new();
        state.set_running(true);
        state.set_status_index(2);
        state.set_stopped();
        assert_eq!(state.get_display(), DISPLAY_STOP);
        assert_eq!(state.get_status_index(), 0);
        assert!(!state.is_running());
    }
}
