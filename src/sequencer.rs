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

//! Signal sequencer.
//!
//! Turns a parsed answer key into a timed series of pulses:
//!
//! 1. Validate - an empty key shows `ERROR` for two seconds and finishes.
//! 2. Alert - two pulses announce the start.
//! 3. Countdown - `START n` once per second.
//! 4. Transmit - one pulse train per answer, `count` pulses for its letter.
//!
//! A run can be cancelled at any wait or pulse. Cancelled runs never call
//! [`SequenceObserver::on_finished`].

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::answers::AnswerItem;
use crate::config::{millis, SharedConfig};
use crate::emitter::PulseEmitter;
use crate::state::{Phase, RunState, MAX_STATUS_INDEX};

/// Display text for an empty answer key.
pub const DISPLAY_ERROR: &str = "ERROR";

/// Display text during the alert pulses.
pub const DISPLAY_ALERT: &str = "ALERT";

/// Display text when transmission begins.
pub const DISPLAY_TRANSMIT: &str = "...";

/// How long `ERROR` stays up before the run finishes.
pub const ERROR_HOLD: Duration = Duration::from_millis(2000);

/// Pulses in the alert train.
pub const ALERT_PULSES: u32 = 2;

const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

/// Receives progress from a running sequence.
pub trait SequenceObserver: Send + Sync {
    /// Human-readable status changed.
    fn on_display(&self, text: &str);

    /// Progress indicator moved (0-4).
    fn on_status_index(&self, index: u8);

    /// Run completed normally. Called at most once per run.
    fn on_finished(&self);
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every answer was transmitted.
    Completed,
    /// No answers; `ERROR` was shown and the run finished.
    EmptyInput,
    /// Cancelled before completion. `on_finished` was not called.
    Cancelled,
}

/// Marker for an observed cancellation; lets steps bail out with `?`.
#[derive(Debug)]
struct Cancelled;

type Step = Result<(), Cancelled>;

/// Drives pulse sequences through an emitter.
pub struct SignalSequencer {
    config: SharedConfig,
    emitter: Arc<dyn PulseEmitter>,
    observer: Arc<dyn SequenceObserver>,
}

impl SignalSequencer {
    pub fn new(
        config: SharedConfig,
        emitter: Arc<dyn PulseEmitter>,
        observer: Arc<dyn SequenceObserver>,
    ) -> Self {
        Self {
            config,
            emitter,
            observer,
        }
    }

    /// Run the full sequence for `answers`.
    ///
    /// Settings are read from the shared configuration at every pulse and
    /// every wait, so edits made during the run apply from the next step.
    pub async fn run(&self, answers: &[AnswerItem], cancel: &CancellationToken) -> RunOutcome {
        let mut run = Run {
            sequencer: self,
            cancel,
            state: RunState::default(),
        };

        let result = run.execute(answers).await;
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(Cancelled) => {
                run.enter(Phase::Cancelled);
                RunOutcome::Cancelled
            }
        };

        info!("Sequence ended: {:?}", outcome);
        outcome
    }
}

/// A single in-flight run.
struct Run<'a> {
    sequencer: &'a SignalSequencer,
    cancel: &'a CancellationToken,
    state: RunState,
}

impl Run<'_> {
    async fn execute(&mut self, answers: &[AnswerItem]) -> Result<RunOutcome, Cancelled> {
        if answers.is_empty() {
            self.display(DISPLAY_ERROR);
            self.wait(ERROR_HOLD).await?;
            self.finish()?;
            return Ok(RunOutcome::EmptyInput);
        }

        self.enter(Phase::Alert);
        self.display(DISPLAY_ALERT);
        self.pulse_train(ALERT_PULSES).await?;

        self.enter(Phase::Countdown);
        let seconds = self.sequencer.config.read(|c| c.countdown_seconds());
        for i in (1..=seconds).rev() {
            self.display(&format!("START {}", i));
            self.wait(COUNTDOWN_TICK).await?;
        }

        self.enter(Phase::Transmit);
        self.display(DISPLAY_TRANSMIT);
        for item in answers {
            self.display(&item.label());
            let count = item.letter.pulse_count();
            if count > 0 {
                self.pulse_train(count).await?;
            }
            self.set_status(0);
            let spacing = self
                .sequencer
                .config
                .read(|c| millis(c.inter_question_spacing_ms));
            self.wait(spacing).await?;
        }

        self.finish()?;
        Ok(RunOutcome::Completed)
    }

    /// Emit `count` pulses, each followed by pulse duration + spacing.
    async fn pulse_train(&mut self, count: u32) -> Step {
        for i in 1..=count {
            self.set_status(i.min(MAX_STATUS_INDEX as u32) as u8);
            self.pulse(i)?;
            let step = self.sequencer.config.read(|c| c.pulse_step());
            self.wait(step).await?;
        }
        Ok(())
    }

    fn pulse(&self, ordinal: u32) -> Step {
        self.check()?;
        let config = self.sequencer.config.snapshot();
        debug!("Pulse {} ({:?})", ordinal, self.state.phase);
        self.sequencer.emitter.emit_pulse(&config, ordinal);
        Ok(())
    }

    async fn wait(&self, duration: Duration) -> Step {
        self.check()?;
        tokio::select! {
            _ = self.cancel.cancelled() => Err(Cancelled),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }

    fn check(&self) -> Step {
        if self.cancel.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    fn finish(&mut self) -> Step {
        self.check()?;
        self.enter(Phase::Finished);
        self.sequencer.observer.on_finished();
        Ok(())
    }

    fn enter(&mut self, phase: Phase) {
        info!("Phase: {} -> {}", self.state.phase.as_str(), phase.as_str());
        self.state.phase = phase;
    }

    fn display(&self, text: &str) {
        debug!("Display: {}", text);
        self.sequencer.observer.on_display(text);
    }

    fn set_status(&mut self, index: u8) {
        self.state.status_index = index;
        self.sequencer.observer.on_status_index(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::parse;
    use crate::config::Config;
    use parking_lot::Mutex;
    use tokio::time::Instant;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Display(String),
        Status(u8),
        Pulse(u32),
        Finished,
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<(Instant, Event)>>,
    }

    impl Recorder {
        fn push(&self, event: Event) {
            self.events.lock().push((Instant::now(), event));
        }

        fn events(&self) -> Vec<Event> {
            self.events.lock().iter().map(|(_, e)| e.clone()).collect()
        }

        fn pulses(&self) -> Vec<Instant> {
            self.events
                .lock()
                .iter()
                .filter(|(_, e)| matches!(e, Event::Pulse(_)))
                .map(|(t, _)| *t)
                .collect()
        }

        fn displays(&self) -> Vec<String> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    Event::Display(text) => Some(text),
                    _ => None,
                })
                .collect()
        }

        fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
            self.events().iter().filter(|e| pred(e)).count()
        }
    }

    impl SequenceObserver for Recorder {
        fn on_display(&self, text: &str) {
            self.push(Event::Display(text.to_string()));
        }

        fn on_status_index(&self, index: u8) {
            self.push(Event::Status(index));
        }

        fn on_finished(&self) {
            self.push(Event::Finished);
        }
    }

    struct RecordingEmitter(Arc<Recorder>);

    impl PulseEmitter for RecordingEmitter {
        fn backend_name(&self) -> &'static str {
            "recording"
        }

        fn emit_pulse(&self, _config: &Config, ordinal: u32) {
            self.0.push(Event::Pulse(ordinal));
        }
    }

    fn short_config() -> Config {
        Config {
            pulse_duration_ms: 10.0,
            pulse_spacing_ms: 10.0,
            countdown_ms: 0.0,
            inter_question_spacing_ms: 10.0,
            ..Config::default()
        }
    }

    fn setup(config: Config) -> (SignalSequencer, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let sequencer = SignalSequencer::new(
            SharedConfig::new(config),
            Arc::new(RecordingEmitter(recorder.clone())),
            recorder.clone(),
        );
        (sequencer, recorder)
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_input_shows_error() {
        let (sequencer, recorder) = setup(short_config());
        let start = Instant::now();

        let outcome = sequencer.run(&[], &CancellationToken::new()).await;

        assert_eq!(outcome, RunOutcome::EmptyInput);
        assert_eq!(start.elapsed(), ERROR_HOLD);
        assert_eq!(
            recorder.events(),
            vec![Event::Display(DISPLAY_ERROR.to_string()), Event::Finished]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_answer_run() {
        let (sequencer, recorder) = setup(short_config());
        let answers = parse("1-A");

        let outcome = sequencer.run(&answers, &CancellationToken::new()).await;

        assert_eq!(outcome, RunOutcome::Completed);
        assert_eq!(
            recorder.events(),
            vec![
                Event::Display(DISPLAY_ALERT.to_string()),
                Event::Status(1),
                Event::Pulse(1),
                Event::Status(2),
                Event::Pulse(2),
                Event::Display(DISPLAY_TRANSMIT.to_string()),
                Event::Display("1-A".to_string()),
                Event::Status(1),
                Event::Pulse(1),
                Event::Status(0),
                Event::Finished,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_pulse_train_for_c() {
        let config = Config {
            pulse_duration_ms: 100.0,
            pulse_spacing_ms: 50.0,
            ..short_config()
        };
        let (sequencer, recorder) = setup(config);

        sequencer
            .run(&parse("5 C"), &CancellationToken::new())
            .await;

        let events = recorder.events();
        let transmit_start = events
            .iter()
            .position(|e| *e == Event::Display("5-C".to_string()))
            .unwrap();
        let statuses: Vec<u8> = events[transmit_start..]
            .iter()
            .filter_map(|e| match e {
                Event::Status(i) => Some(*i),
                _ => None,
            })
            .collect();
        assert_eq!(statuses, vec![1, 2, 3, 0]);

        let pulses = recorder.pulses();
        assert_eq!(pulses.len(), 2 + 3);
        let train = &pulses[2..];
        assert_eq!(train[1] - train[0], Duration::from_millis(150));
        assert_eq!(train[2] - train[1], Duration::from_millis(150));
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_index_capped_at_four() {
        let (sequencer, recorder) = setup(short_config());

        sequencer.run(&parse("9-E"), &CancellationToken::new()).await;

        let statuses: Vec<u8> = recorder
            .events()
            .into_iter()
            .skip_while(|e| *e != Event::Display("9-E".to_string()))
            .filter_map(|e| match e {
                Event::Status(i) => Some(i),
                _ => None,
            })
            .collect();
        assert_eq!(statuses, vec![1, 2, 3, 4, 4, 0]);
        assert_eq!(recorder.count(|e| matches!(e, Event::Pulse(_))), 2 + 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown() {
        let config = Config {
            countdown_ms: 3000.0,
            ..short_config()
        };
        let (sequencer, recorder) = setup(config);

        sequencer.run(&parse("1-A"), &CancellationToken::new()).await;

        let starts: Vec<(Instant, String)> = recorder
            .events
            .lock()
            .iter()
            .filter_map(|(t, e)| match e {
                Event::Display(text) if text.starts_with("START") => Some((*t, text.clone())),
                _ => None,
            })
            .collect();
        let labels: Vec<&str> = starts.iter().map(|(_, s)| s.as_str()).collect();
        assert_eq!(labels, vec!["START 3", "START 2", "START 1"]);
        assert_eq!(starts[1].0 - starts[0].0, Duration::from_secs(1));
        assert_eq!(starts[2].0 - starts[1].0, Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_below_one_second_skipped() {
        let config = Config {
            countdown_ms: 999.0,
            ..short_config()
        };
        let (sequencer, recorder) = setup(config);

        sequencer.run(&parse("1-A"), &CancellationToken::new()).await;

        assert!(recorder.displays().iter().all(|d| !d.starts_with("START")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_total_duration() {
        let (sequencer, _recorder) = setup(short_config());
        let start = Instant::now();

        sequencer
            .run(&parse("1-B 2-A"), &CancellationToken::new())
            .await;

        // alert 2 steps, B 2 steps, A 1 step, 20 ms each, plus 2 x 10 ms spacing
        assert_eq!(start.elapsed(), Duration::from_millis(5 * 20 + 2 * 10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_mid_transmit() {
        let config = Config {
            pulse_duration_ms: 100.0,
            pulse_spacing_ms: 100.0,
            inter_question_spacing_ms: 1000.0,
            ..short_config()
        };
        let (sequencer, recorder) = setup(config);
        let sequencer = Arc::new(sequencer);
        let cancel = CancellationToken::new();

        let handle = {
            let sequencer = sequencer.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { sequencer.run(&parse("1-E 2-E"), &cancel).await })
        };

        // Alert takes 400 ms; stop partway through the first E.
        tokio::time::sleep(Duration::from_millis(650)).await;
        let pulses_at_cancel = recorder.pulses().len();
        cancel.cancel();

        let outcome = handle.await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(outcome, RunOutcome::Cancelled);
        assert_eq!(pulses_at_cancel, 2 + 2);
        assert_eq!(recorder.pulses().len(), pulses_at_cancel);
        assert_eq!(recorder.count(|e| *e == Event::Finished), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_start() {
        let (sequencer, recorder) = setup(short_config());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = sequencer.run(&parse("1-A"), &cancel).await;

        assert_eq!(outcome, RunOutcome::Cancelled);
        assert_eq!(recorder.count(|e| matches!(e, Event::Pulse(_))), 0);
        assert_eq!(recorder.count(|e| *e == Event::Finished), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_error_hold() {
        let (sequencer, recorder) = setup(short_config());
        let sequencer = Arc::new(sequencer);
        let cancel = CancellationToken::new();

        let handle = {
            let sequencer = sequencer.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { sequencer.run(&[], &cancel).await })
        };
        tokio::time::sleep(Duration::from_millis(500)).await;
        cancel.cancel();

        assert_eq!(handle.await.unwrap(), RunOutcome::Cancelled);
        assert_eq!(recorder.count(|e| *e == Event::Finished), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_config_applies_mid_run() {
        let recorder = Arc::new(Recorder::default());
        let config = SharedConfig::new(Config {
            pulse_duration_ms: 100.0,
            pulse_spacing_ms: 100.0,
            ..short_config()
        });
        let sequencer = Arc::new(SignalSequencer::new(
            config.clone(),
            Arc::new(RecordingEmitter(recorder.clone())),
            recorder.clone(),
        ));

        let handle = {
            let sequencer = sequencer.clone();
            tokio::spawn(async move { sequencer.run(&parse("1-C"), &CancellationToken::new()).await })
        };

        // After the first alert pulse, shorten every step.
        tokio::time::sleep(Duration::from_millis(50)).await;
        config.update(|c| {
            c.pulse_duration_ms = 10.0;
            c.pulse_spacing_ms = 0.0;
        });

        assert_eq!(handle.await.unwrap(), RunOutcome::Completed);
        let pulses = recorder.pulses();
        assert_eq!(pulses[1] - pulses[0], Duration::from_millis(200));
        assert_eq!(pulses[2] - pulses[1], Duration::from_millis(10));
    }
}
