// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel adapter for deterministic testing.
//!
//! `MockChannel` implements `ChannelAdapter` with injectable inbound messages
//! and captured outbound messages and typing signals for assertion in tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use rapport_core::{
    AdapterType, ChannelAdapter, ChatId, HealthStatus, InboundMessage, MessageId, OutboundMessage,
    PluginAdapter, RapportError,
};

/// A mock messaging channel for testing.
///
/// Provides three queues:
/// - **inbound**: Messages injected via `inject_message()` are returned by `receive()`
/// - **sent**: Messages passed to `send()` are captured and retrievable via `sent_messages()`
/// - **typing**: Chats passed to `send_typing()`
///
/// After [`close`](MockChannel::close), `receive()` drains what is queued
/// and then fails with a "closed" channel error.
pub struct MockChannel {
    inbound: Arc<Mutex<VecDeque<InboundMessage>>>,
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
    typing: Arc<Mutex<Vec<ChatId>>>,
    notify: Arc<Notify>,
    closed: AtomicBool,
    next_id: AtomicUsize,
}

impl MockChannel {
    /// Create a new mock channel with empty queues.
    pub fn new() -> Self {
        Self {
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            sent: Arc::new(Mutex::new(Vec::new())),
            typing: Arc::new(Mutex::new(Vec::new())),
            notify: Arc::new(Notify::new()),
            closed: AtomicBool::new(false),
            next_id: AtomicUsize::new(1),
        }
    }

    /// Inject an inbound message into the receive queue.
    pub async fn inject_message(&self, msg: InboundMessage) {
        self.inbound.lock().await.push_back(msg);
        self.notify.notify_one();
    }

    /// Ends the inbound stream once the queue is empty.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    /// Get all messages that were sent through `send()`.
    pub async fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Chats that received a typing indicator, in order.
    pub async fn typing_signals(&self) -> Vec<ChatId> {
        self.typing.lock().await.clone()
    }

    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, RapportError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RapportError> {
        self.close();
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    async fn connect(&mut self) -> Result<(), RapportError> {
        Ok(())
    }

    async fn receive(&self) -> Result<InboundMessage, RapportError> {
        loop {
            {
                let mut queue = self.inbound.lock().await;
                if let Some(msg) = queue.pop_front() {
                    return Ok(msg);
                }
                if self.closed.load(Ordering::SeqCst) {
                    return Err(RapportError::Channel {
                        message: "mock inbound channel closed".to_string(),
                        source: None,
                    });
                }
            }
            // Wait for notification that a new message was injected
            self.notify.notified().await;
        }
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, RapportError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().await.push(msg);
        Ok(MessageId(format!("mock-msg-{id}")))
    }

    async fn send_typing(&self, chat_id: ChatId) -> Result<(), RapportError> {
        self.typing.lock().await.push(chat_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::harness::inbound;

    #[tokio::test]
    async fn receive_returns_injected_messages_in_order() {
        let channel = MockChannel::new();
        channel.inject_message(inbound(1, "первое")).await;
        channel.inject_message(inbound(1, "второе")).await;

        assert_eq!(channel.receive().await.unwrap().text, "первое");
        assert_eq!(channel.receive().await.unwrap().text, "второе");
    }

    #[tokio::test]
    async fn send_captures_outbound_messages() {
        let channel = MockChannel::new();
        let msg = OutboundMessage {
            chat_id: ChatId(7),
            text: "ответ".to_string(),
        };

        let id = channel.send(msg.clone()).await.unwrap();
        assert!(id.0.starts_with("mock-msg-"));
        assert_eq!(channel.sent_messages().await, vec![msg]);

        channel.clear_sent().await;
        assert_eq!(channel.sent_count().await, 0);
    }

    #[tokio::test]
    async fn typing_signals_are_recorded() {
        let channel = MockChannel::new();
        channel.send_typing(ChatId(3)).await.unwrap();
        assert_eq!(channel.typing_signals().await, vec![ChatId(3)]);
    }

    #[tokio::test]
    async fn close_drains_then_errors() {
        let channel = MockChannel::new();
        channel.inject_message(inbound(1, "последнее")).await;
        channel.close();

        assert!(channel.receive().await.is_ok());
        let err = channel.receive().await.unwrap_err();
        assert!(err.to_string().contains("closed"));
    }

    #[tokio::test]
    async fn receive_waits_for_injection() {
        let channel = Arc::new(MockChannel::new());
        let channel_clone = channel.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            channel_clone.inject_message(inbound(2, "позже")).await;
        });

        let received = tokio::time::timeout(Duration::from_secs(2), channel.receive())
            .await
            .expect("receive timed out")
            .unwrap();
        assert_eq!(received.text, "позже");
    }
}
