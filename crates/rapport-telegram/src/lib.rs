// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel adapter for rapport.
//!
//! Implements [`ChannelAdapter`] for the Telegram Bot API via teloxide:
//! long polling for text messages, plain-text replies and typing actions.
//! Before polling starts, a preflight `getUpdates` call detects another
//! process polling with the same token, and updates queued while the bot
//! was offline are dropped unless `telegram.drop_pending_updates` is off.

pub mod handler;

use std::sync::Mutex;

use async_trait::async_trait;
use rapport_config::model::TelegramConfig;
use rapport_core::{
    AdapterType, ChannelAdapter, ChatId, HealthStatus, InboundMessage, MessageId, OutboundMessage,
    PluginAdapter, RapportError,
};
use teloxide::prelude::*;
use teloxide::types::{ChatAction, ChatId as TgChatId};
use teloxide::{ApiError, RequestError};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Telegram channel adapter implementing [`ChannelAdapter`].
pub struct TelegramChannel {
    bot: Bot,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundMessage>>,
    inbound_tx: mpsc::Sender<InboundMessage>,
    polling_handle: Mutex<Option<tokio::task::JoinHandle<()>>>,
    drop_pending_updates: bool,
}

impl TelegramChannel {
    /// Creates a new Telegram channel adapter.
    ///
    /// Requires `config.bot_token` to be set.
    pub fn new(config: &TelegramConfig) -> Result<Self, RapportError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            RapportError::Config("telegram.bot_token is required for Telegram adapter".into())
        })?;

        if token.trim().is_empty() {
            return Err(RapportError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let mut bot = Bot::new(token);
        if let Some(raw) = config.api_url.as_deref() {
            let url = url::Url::parse(raw).map_err(|e| {
                RapportError::Config(format!("telegram.api_url is not a valid URL: {e}"))
            })?;
            bot = bot.set_api_url(url);
        }
        let (inbound_tx, inbound_rx) = mpsc::channel(config.inbound_capacity.max(1));

        Ok(Self {
            bot,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling_handle: Mutex::new(None),
            drop_pending_updates: config.drop_pending_updates,
        })
    }

    /// Fails with [`RapportError::DuplicateProcessInstance`] when another
    /// process is already polling this bot.
    ///
    /// With `drop_pending_updates` set, the backlog is then discarded so
    /// stale messages never reach the engine.
    async fn preflight(&self) -> Result<(), RapportError> {
        match self.bot.get_updates().limit(1).timeout(0).await {
            Ok(_) => {}
            Err(e) if is_conflict(&e) => {
                return Err(RapportError::DuplicateProcessInstance(format!(
                    "Telegram rejected getUpdates: {e}"
                )));
            }
            Err(e) => {
                return Err(RapportError::Channel {
                    message: format!("Telegram preflight failed: {e}"),
                    source: Some(Box::new(e)),
                });
            }
        }

        if self.drop_pending_updates {
            self.bot
                .delete_webhook()
                .drop_pending_updates(true)
                .await
                .map_err(|e| RapportError::Channel {
                    message: format!("failed to drop pending updates: {e}"),
                    source: Some(Box::new(e)),
                })?;
            info!("dropped pending Telegram updates");
        }
        Ok(())
    }
}

/// True when Telegram reports that a concurrent `getUpdates` took over.
pub fn is_conflict(err: &RequestError) -> bool {
    matches!(err, RequestError::Api(ApiError::TerminatedByOtherGetUpdates))
}

fn to_tg_chat(chat_id: ChatId) -> TgChatId {
    TgChatId(chat_id.0)
}

#[async_trait]
impl PluginAdapter for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, RapportError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), RapportError> {
        debug!("Telegram channel shutting down");
        let handle = self
            .polling_handle
            .lock()
            .map_err(|_| RapportError::Internal("polling handle lock poisoned".into()))?
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for TelegramChannel {
    async fn connect(&mut self) -> Result<(), RapportError> {
        if self
            .polling_handle
            .get_mut()
            .map_err(|_| RapportError::Internal("polling handle lock poisoned".into()))?
            .is_some()
        {
            return Ok(()); // Already connected
        }

        self.preflight().await?;

        let bot = self.bot.clone();
        let tx = self.inbound_tx.clone();

        info!("starting Telegram long polling");

        let handle = tokio::spawn(async move {
            let handler = Update::filter_message().endpoint(move |msg: Message| {
                let tx = tx.clone();
                async move {
                    match handler::to_inbound_message(&msg) {
                        Some(inbound) => {
                            metrics::counter!("rapport_telegram_messages_received_total")
                                .increment(1);
                            if tx.send(inbound).await.is_err() {
                                warn!("inbound channel closed, dropping message");
                            }
                        }
                        None => {
                            debug!(msg_id = msg.id.0, "ignoring non-text message");
                        }
                    }
                    respond(())
                }
            });

            Dispatcher::builder(bot, handler)
                .default_handler(|_| async {}) // Silently ignore non-message updates
                .build()
                .dispatch()
                .await;
        });

        *self
            .polling_handle
            .get_mut()
            .map_err(|_| RapportError::Internal("polling handle lock poisoned".into()))? =
            Some(handle);
        Ok(())
    }

    async fn receive(&self) -> Result<InboundMessage, RapportError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| RapportError::Channel {
            message: "Telegram inbound channel closed".into(),
            source: None,
        })
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, RapportError> {
        let sent = self
            .bot
            .send_message(to_tg_chat(msg.chat_id), msg.text)
            .await
            .map_err(|e| RapportError::Channel {
                message: format!("failed to send message: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(MessageId(sent.id.0.to_string()))
    }

    async fn send_typing(&self, chat_id: ChatId) -> Result<(), RapportError> {
        self.bot
            .send_chat_action(to_tg_chat(chat_id), ChatAction::Typing)
            .await
            .map_err(|e| RapportError::Channel {
                message: format!("failed to send typing indicator: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(())
    }
}
