// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the engine.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifier of an end user on the chat transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the chat a reply should be delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Completion,
    Storage,
}

/// Communication style assigned to a single turn.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StyleTag {
    #[default]
    Neutral,
    Friendly,
    Sarcastic,
    Aggressive,
    Flirtatious,
    Technical,
    Caring,
    Affectionate,
    Angry,
    Hurt,
}

impl StyleTag {
    /// Every style, in declaration order.
    pub const ALL: [StyleTag; 10] = [
        StyleTag::Neutral,
        StyleTag::Friendly,
        StyleTag::Sarcastic,
        StyleTag::Aggressive,
        StyleTag::Flirtatious,
        StyleTag::Technical,
        StyleTag::Caring,
        StyleTag::Affectionate,
        StyleTag::Angry,
        StyleTag::Hurt,
    ];

    /// Styles in which the persona is offended or under attack.
    pub fn is_hostile(self) -> bool {
        matches!(self, StyleTag::Aggressive | StyleTag::Angry | StyleTag::Hurt)
    }
}

/// Discrete relationship stage derived from the relationship score.
///
/// Ordered: `Stranger < Acquaintance < Friend < CloseFriend < BestFriend`.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipLevel {
    #[default]
    Stranger,
    Acquaintance,
    Friend,
    CloseFriend,
    BestFriend,
}

impl RelationshipLevel {
    /// All levels from lowest to highest.
    pub const ALL: [RelationshipLevel; 5] = [
        RelationshipLevel::Stranger,
        RelationshipLevel::Acquaintance,
        RelationshipLevel::Friend,
        RelationshipLevel::CloseFriend,
        RelationshipLevel::BestFriend,
    ];

    /// Minimum score at which this level is reached.
    pub const fn threshold(self) -> i64 {
        match self {
            RelationshipLevel::Stranger => 0,
            RelationshipLevel::Acquaintance => 10,
            RelationshipLevel::Friend => 30,
            RelationshipLevel::CloseFriend => 60,
            RelationshipLevel::BestFriend => 100,
        }
    }

    /// Maps a score to its level. Scores below zero are strangers.
    pub fn from_score(score: i64) -> Self {
        Self::ALL
            .iter()
            .rev()
            .copied()
            .find(|level| score >= level.threshold())
            .unwrap_or(RelationshipLevel::Stranger)
    }

    /// Zero-based position in the ordering, used to index per-level tables.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Mood detected in the latest user message.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Positive,
    Negative,
    #[default]
    Neutral,
}

/// An inbound chat message delivered by the transport.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub id: MessageId,
    pub user_id: UserId,
    pub chat_id: ChatId,
    pub text: String,
    /// Raw name the transport knows the sender by, before sanitizing.
    pub display_name_hint: Option<String>,
    pub received_at: DateTime<Utc>,
}

/// A reply to be delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub chat_id: ChatId,
    pub text: String,
}

/// A request to the completion collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_text: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Text returned by the completion collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    pub text: String,
    pub model: String,
}
