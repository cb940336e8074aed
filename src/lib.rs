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

//! VibraToque core.
//!
//! Parses an answer key and plays it back as timed pulse trains through a
//! vibration or notification backend.

pub mod answers;
pub mod config;
pub mod controller;
pub mod emitter;
pub mod events;
pub mod sequencer;
pub mod state;

pub use answers::{parse, AnswerItem, AnswerLetter};
pub use config::{Config, SharedConfig};
pub use controller::RelayController;
pub use emitter::{create_emitter, ChannelEmitter, PulseEmitter};
pub use events::{ChannelObserver, SequenceEvent};
pub use sequencer::{RunOutcome, SequenceObserver, SignalSequencer};
pub use state::AppState;
