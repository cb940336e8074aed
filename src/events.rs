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

//! Sequence events and observer plumbing.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

use crate::sequencer::SequenceObserver;

/// Progress event emitted by a running sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceEvent {
    Display(String),
    StatusIndex(u8),
    Finished,
}

/// Observer that forwards every callback over a channel.
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<SequenceEvent>,
}

impl ChannelObserver {
    /// Create an observer and the receiving end of its channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SequenceEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: SequenceEvent) {
        if self.tx.send(event).is_err() {
            warn!("Sequence event dropped: receiver closed");
        }
    }
}

impl SequenceObserver for ChannelObserver {
    fn on_display(&self, text: &str) {
        self.send(SequenceEvent::Display(text.to_string()));
    }

    fn on_status_index(&self, index: u8) {
        self.send(SequenceEvent::StatusIndex(index));
    }

    fn on_finished(&self) {
        self.send(SequenceEvent::Finished);
    }
}

/// Fans callbacks out to several observers, in insertion order.
#[derive(Default)]
pub struct ObserverSet {
    observers: Vec<Arc<dyn SequenceObserver>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, observer: Arc<dyn SequenceObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl SequenceObserver for ObserverSet {
    fn on_display(&self, text: &str) {
        for observer in &self.observers {
            observer.on_display(text);
        }
    }

    fn on_status_index(&self, index: u8) {
        for observer in &self.observers {
            observer.on_status_index(index);
        }
    }

    fn on_finished(&self) {
        for observer in &self.observers {
            observer.on_finished();
        }
    }
}
