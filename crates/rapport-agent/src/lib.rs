// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn engine and engine loop for rapport.
//!
//! The [`EngineLoop`] receives messages from a channel and routes each to
//! the command layer or the [`TurnEngine`] on its own task. Per-user leases
//! in the context store keep turns for one user in order while different
//! users proceed in parallel.

pub mod cache;
pub mod commands;
pub mod engine;
pub mod pacing;
pub mod prompt;
pub mod recording;
pub mod shutdown;
pub mod stats;
pub mod store;
pub mod sweep;

use std::sync::Arc;
use std::time::Duration;

use rapport_config::model::TypingConfig;
use rapport_core::{ChannelAdapter, ChatId, InboundMessage, OutboundMessage, RapportError};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, trace, warn};

pub use cache::{Fingerprint, ResponseCache};
pub use commands::{Command, Route};
pub use engine::{TurnEngine, TurnOutcome, TurnReply};
pub use stats::RelationshipStats;
pub use store::{ContextStore, UserLease};

/// Default time given to running turns on shutdown.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Receives messages and answers each on its own task.
pub struct EngineLoop {
    channel: Arc<dyn ChannelAdapter>,
    engine: Arc<TurnEngine>,
    typing: TypingConfig,
    tracker: TaskTracker,
    drain_timeout: Duration,
}

impl EngineLoop {
    pub fn new(channel: Arc<dyn ChannelAdapter>, engine: Arc<TurnEngine>, typing: TypingConfig) -> Self {
        Self {
            channel,
            engine,
            typing,
            tracker: TaskTracker::new(),
            drain_timeout: DRAIN_TIMEOUT,
        }
    }

    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Runs until the channel closes or `cancel` fires, then drains
    /// running turns.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), RapportError> {
        info!("engine loop running");

        loop {
            tokio::select! {
                msg = self.channel.receive() => {
                    match msg {
                        Ok(inbound) => self.dispatch(inbound),
                        Err(e) => {
                            if e.to_string().contains("closed") {
                                info!("channel closed, stopping engine loop");
                                break;
                            }
                            error!(error = %e, "channel receive error");
                        }
                    }
                }
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping engine loop");
                    break;
                }
            }
        }

        shutdown::drain_turns(&self.tracker, self.drain_timeout).await;
        info!("engine loop stopped");
        Ok(())
    }

    fn dispatch(&self, inbound: InboundMessage) {
        let route = commands::route(&inbound.text);
        let channel = self.channel.clone();
        let engine = self.engine.clone();
        match route {
            Route::Ignore => {
                trace!(user_id = %inbound.user_id, "message ignored");
            }
            Route::Command(command) => {
                self.tracker.spawn(async move {
                    match engine.handle_command(command, &inbound).await {
                        Ok(text) => deliver(channel.as_ref(), inbound.chat_id, text).await,
                        Err(e) => {
                            error!(
                                user_id = %inbound.user_id,
                                command = command.as_str(),
                                error = %e,
                                "command failed"
                            );
                        }
                    }
                });
            }
            Route::Turn => {
                let typing = self.typing.clone();
                self.tracker.spawn(async move {
                    answer_turn(channel.as_ref(), &engine, &typing, inbound).await;
                });
            }
        }
    }
}

/// Typing indicator, turn, pacing delay, delivery.
async fn answer_turn(
    channel: &dyn ChannelAdapter,
    engine: &TurnEngine,
    typing: &TypingConfig,
    inbound: InboundMessage,
) {
    if let Err(e) = channel.send_typing(inbound.chat_id).await {
        debug!(error = %e, "failed to send typing indicator");
    }

    let reply = engine.handle_turn(&inbound).await;
    if let Some(delay) = pacing::typing_delay(&reply.text, typing) {
        tokio::time::sleep(delay).await;
    }
    deliver(channel, inbound.chat_id, reply.text).await;
}

async fn deliver(channel: &dyn ChannelAdapter, chat_id: ChatId, text: String) {
    if let Err(e) = channel.send(OutboundMessage { chat_id, text }).await {
        warn!(%chat_id, error = %e, "failed to deliver reply");
    }
}
