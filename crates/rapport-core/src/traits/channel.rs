// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat transport adapter trait.

use async_trait::async_trait;

use crate::error::RapportError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChatId, InboundMessage, MessageId, OutboundMessage};

/// Adapter for the chat transport that delivers user messages and replies.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Establishes a connection to the messaging platform.
    async fn connect(&mut self) -> Result<(), RapportError>;

    /// Receives the next inbound message from the channel.
    async fn receive(&self) -> Result<InboundMessage, RapportError>;

    /// Sends a reply through the channel.
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, RapportError>;

    /// Shows a typing indicator in the given chat.
    async fn send_typing(&self, chat_id: ChatId) -> Result<(), RapportError>;
}
