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

//! Run control.
//!
//! Starts and stops sequences on behalf of the UI, keeping at most one run
//! active at a time.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::answers;
use crate::config::SharedConfig;
use crate::emitter::PulseEmitter;
use crate::events::ObserverSet;
use crate::sequencer::{RunOutcome, SequenceObserver, SignalSequencer};
use crate::state::AppState;

struct ActiveRun {
    id: u64,
    token: CancellationToken,
    handle: Option<JoinHandle<RunOutcome>>,
}

/// Id of the run allowed to report progress; 0 when none is.
///
/// Updates are forwarded while holding the lock, so a run replaced or
/// stopped by `start`/`stop` can no longer touch the shared state.
#[derive(Default)]
struct RunGate {
    current: Mutex<u64>,
}

/// Per-run observer that drops updates once its run is no longer current.
struct GatedObserver {
    id: u64,
    gate: Arc<RunGate>,
    inner: Arc<ObserverSet>,
}

impl GatedObserver {
    fn forward(&self, f: impl FnOnce(&ObserverSet)) {
        let current = self.gate.current.lock();
        if *current == self.id {
            f(&self.inner);
        } else {
            debug!("Dropping update from stale run {} (current {})", self.id, *current);
        }
    }
}

impl SequenceObserver for GatedObserver {
    fn on_display(&self, text: &str) {
        self.forward(|o| o.on_display(text));
    }

    fn on_status_index(&self, index: u8) {
        self.forward(|o| o.on_status_index(index));
    }

    fn on_finished(&self) {
        self.forward(|o| o.on_finished());
    }
}

/// Starts, stops and tracks the active run.
pub struct RelayController {
    config: SharedConfig,
    emitter: Arc<dyn PulseEmitter>,
    state: Arc<AppState>,
    observers: Arc<ObserverSet>,
    gate: Arc<RunGate>,
    active: Mutex<Option<ActiveRun>>,
    next_id: Mutex<u64>,
}

impl RelayController {
    /// Create a controller. `state` always observes runs.
    pub fn new(config: SharedConfig, emitter: Arc<dyn PulseEmitter>, state: Arc<AppState>) -> Self {
        Self::with_observers(config, emitter, state, Vec::new())
    }

    /// Create a controller with additional observers notified after `state`.
    pub fn with_observers(
        config: SharedConfig,
        emitter: Arc<dyn PulseEmitter>,
        state: Arc<AppState>,
        extra: Vec<Arc<dyn SequenceObserver>>,
    ) -> Self {
        let mut observers = ObserverSet::new();
        observers.push(state.clone());
        for observer in extra {
            observers.push(observer);
        }

        Self {
            config,
            emitter,
            state,
            observers: Arc::new(observers),
            gate: Arc::new(RunGate::default()),
            active: Mutex::new(None),
            next_id: Mutex::new(0),
        }
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Start a run for `text`, cancelling any run still in progress.
    ///
    /// Must be called from within a tokio runtime. Returns the run id.
    pub fn start(&self, text: &str) -> u64 {
        let answers = answers::parse(text);
        info!("Starting run with {} answers", answers.len());

        let id = {
            let mut next = self.next_id.lock();
            *next += 1;
            *next
        };
        let token = CancellationToken::new();

        let mut active = self.active.lock();
        if let Some(old) = active.take() {
            debug!("Cancelling previous run {}", old.id);
            old.token.cancel();
        }

        {
            let mut current = self.gate.current.lock();
            *current = id;
            self.state.set_running(true);
        }
        let observer = GatedObserver {
            id,
            gate: self.gate.clone(),
            inner: self.observers.clone(),
        };
        let sequencer =
            SignalSequencer::new(self.config.clone(), self.emitter.clone(), Arc::new(observer));
        let run_token = token.clone();
        let handle = tokio::spawn(async move { sequencer.run(&answers, &run_token).await });

        *active = Some(ActiveRun {
            id,
            token,
            handle: Some(handle),
        });
        id
    }

    /// Stop the active run, if any.
    pub fn stop(&self) {
        if let Some(run) = self.active.lock().as_ref() {
            info!("Stopping run {}", run.id);
            run.token.cancel();
        }
        let mut current = self.gate.current.lock();
        *current = 0;
        self.state.set_stopped();
    }

    /// Start when idle, stop when running. Returns whether a run is now active.
    pub fn toggle(&self, text: &str) -> bool {
        if self.is_running() {
            self.stop();
            false
        } else {
            self.start(text);
            true
        }
    }

    /// Wait for the active run to end and return how it ended.
    ///
    /// Returns `None` if there is no run to wait for.
    pub async fn join(&self) -> Option<RunOutcome> {
        let handle = self.active.lock().as_mut().and_then(|run| run.handle.take())?;
        match handle.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!("Run task failed: {}", e);
                None
            }
        }
    }

    /// Fire one pulse outside any run, as the floating button does.
    ///
    /// Returns `false` without pulsing when the floating button is disabled.
    pub fn fire_manual_pulse(&self) -> bool {
        let config = self.config.snapshot();
        if !config.floating_button_enabled {
            debug!("Floating button disabled, ignoring manual pulse");
            return false;
        }
        self.emitter.emit_pulse(&config, 0);
        true
    }
}

impl Drop for RelayController {
    fn drop(&mut self) {
        if let Some(run) = self.active.get_mut().take() {
            run.token.cancel();
        }
    }
}
