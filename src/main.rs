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

//! VibraToque console host.
//!
//! Each line read from stdin is an answer key and starts a new run.
//! `stop` stops the active run, `pulse` fires a manual pulse, `quit` exits.

use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vibratoque::config::{Config, SharedConfig};
use vibratoque::events::{ChannelObserver, SequenceEvent};
use vibratoque::emitter::{self, PulseEmitter};
use vibratoque::{AppState, RelayController, SequenceObserver};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vibratoque=info".parse()?),
        )
        .init();

    info!("Starting VibraToque v{}...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = SharedConfig::new(Config::load()?);
    info!("Configuration loaded");

    let emitter: Arc<dyn PulseEmitter> = Arc::from(emitter::create_emitter());
    let state = AppState::new();
    let (observer, mut event_rx) = ChannelObserver::new();
    let observer: Arc<dyn SequenceObserver> = Arc::new(observer);
    let controller = RelayController::with_observers(config, emitter, state.clone(), vec![observer]);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    info!("Ready. Enter an answer key (e.g. 01-A, 02-B).");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("Input closed");
                    break;
                };
                match line.trim() {
                    "" => {}
                    "quit" => break,
                    "stop" => controller.stop(),
                    "pulse" => {
                        if !controller.fire_manual_pulse() {
                            warn!("Manual pulse needs floating_button_enabled");
                        }
                    }
                    key => {
                        controller.start(key);
                    }
                }
            }
            Some(event) = event_rx.recv() => {
                match event {
                    SequenceEvent::Display(text) => println!("{}", text),
                    SequenceEvent::StatusIndex(index) => {
                        let bar: String = (1..=4).map(|i| if i <= index { '#' } else { '.' }).collect();
                        println!("[{}]", bar);
                    }
                    SequenceEvent::Finished => println!("{}", state.get_display()),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    controller.stop();
    info!("VibraToque stopped");
    Ok(())
}
