// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user conversational state.
//!
//! A [`UserContext`] is created lazily for an unseen user, mutated by every
//! successful turn, and persisted through the storage adapter. The relationship
//! level and trust are derived on read and never stored.

use std::collections::{BTreeSet, VecDeque};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Mood, RelationshipLevel, StyleTag, UserId};

/// One completed exchange between the user and the persona.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub user_text: String,
    pub bot_text: String,
    pub style: StyleTag,
    pub timestamp: DateTime<Utc>,
}

/// Facts extracted from the user's messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub interests: BTreeSet<String>,
    pub places: BTreeSet<String>,
}

impl UserInfo {
    /// Adds an interest, returning whether it was new.
    pub fn add_interest(&mut self, interest: impl Into<String>) -> bool {
        self.interests.insert(interest.into())
    }

    /// Adds a place, returning whether it was new.
    pub fn add_place(&mut self, place: impl Into<String>) -> bool {
        self.places.insert(place.into())
    }

    pub fn is_empty(&self) -> bool {
        self.interests.is_empty() && self.places.is_empty()
    }
}

/// Cool-down state for inserting the user's name into replies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameUsage {
    pub count: u32,
    pub last_used_at: Option<DateTime<Utc>>,
}

/// Everything the engine remembers about one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: UserId,
    /// Sanitized name the persona addresses the user by.
    pub display_name: Option<String>,
    /// Most recent turns, oldest first.
    pub history: VecDeque<Turn>,
    pub relationship_score: i64,
    pub messages_count: u64,
    pub positive_interactions: u64,
    pub negative_interactions: u64,
    pub mood: Mood,
    pub offense_count: u32,
    pub mat_count: u32,
    pub last_offense_at: Option<DateTime<Utc>>,
    pub user_info: UserInfo,
    pub name_usage: NameUsage,
    pub first_interaction: bool,
    pub conversation_depth: u64,
    /// Whether the previous delivered reply ended with a question.
    pub last_reply_asked: bool,
    pub created_at: DateTime<Utc>,
    pub last_interaction: DateTime<Utc>,
}

impl UserContext {
    /// Creates the default context for a user seen for the first time.
    pub fn new(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            display_name: None,
            history: VecDeque::new(),
            relationship_score: 0,
            messages_count: 0,
            positive_interactions: 0,
            negative_interactions: 0,
            mood: Mood::Neutral,
            offense_count: 0,
            mat_count: 0,
            last_offense_at: None,
            user_info: UserInfo::default(),
            name_usage: NameUsage::default(),
            first_interaction: true,
            conversation_depth: 0,
            last_reply_asked: false,
            created_at: now,
            last_interaction: now,
        }
    }

    /// Level derived from the current score.
    pub fn relationship_level(&self) -> RelationshipLevel {
        RelationshipLevel::from_score(self.relationship_score)
    }

    /// Share of positive interactions as a percentage in `[0, 100]`.
    pub fn trust_level(&self) -> f64 {
        if self.messages_count == 0 {
            return 0.0;
        }
        let ratio = self.positive_interactions as f64 / self.messages_count as f64;
        (ratio * 100.0).clamp(0.0, 100.0)
    }

    /// Style of the most recent recorded turn.
    pub fn last_style(&self) -> Option<StyleTag> {
        self.history.back().map(|turn| turn.style)
    }

    /// Appends a turn, evicting the oldest ones beyond `limit`.
    pub fn push_turn(&mut self, turn: Turn, limit: usize) {
        self.history.push_back(turn);
        while self.history.len() > limit {
            self.history.pop_front();
        }
    }

    /// Zeroes the moderation counters. Returns `false` if they were already clean.
    ///
    /// Score, history and interaction counts are left untouched.
    pub fn reset_counters(&mut self) -> bool {
        let had_offenses = self.mat_count > 0 || self.offense_count > 0;
        self.mat_count = 0;
        self.offense_count = 0;
        self.last_offense_at = None;
        had_offenses
    }

    /// True if the user has not written for at least `max_age`.
    pub fn is_idle(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        now - self.last_interaction >= max_age
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(n: usize) -> Turn {
        Turn {
            user_text: format!("msg {n}"),
            bot_text: format!("reply {n}"),
            style: StyleTag::Neutral,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn new_context_has_defaults() {
        let ctx = UserContext::new(UserId(7), Utc::now());
        assert!(ctx.first_interaction);
        assert_eq!(ctx.relationship_level(), RelationshipLevel::Stranger);
        assert_eq!(ctx.mood, Mood::Neutral);
        assert!(ctx.history.is_empty());
        assert!(ctx.user_info.is_empty());
    }

    #[test]
    fn trust_is_zero_without_messages() {
        let ctx = UserContext::new(UserId(1), Utc::now());
        assert_eq!(ctx.trust_level(), 0.0);
    }

    #[test]
    fn trust_is_positive_share() {
        let mut ctx = UserContext::new(UserId(1), Utc::now());
        ctx.messages_count = 4;
        ctx.positive_interactions = 3;
        assert!((ctx.trust_level() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn history_is_bounded_fifo() {
        let mut ctx = UserContext::new(UserId(1), Utc::now());
        for n in 0..13 {
            ctx.push_turn(turn(n), 10);
        }
        assert_eq!(ctx.history.len(), 10);
        assert_eq!(ctx.history.front().unwrap().user_text, "msg 3");
        assert_eq!(ctx.history.back().unwrap().user_text, "msg 12");
    }

    #[test]
    fn last_style_follows_history() {
        let mut ctx = UserContext::new(UserId(1), Utc::now());
        assert_eq!(ctx.last_style(), None);
        let mut t = turn(0);
        t.style = StyleTag::Caring;
        ctx.push_turn(t, 10);
        assert_eq!(ctx.last_style(), Some(StyleTag::Caring));
    }

    #[test]
    fn reset_counters_leaves_score_alone() {
        let mut ctx = UserContext::new(UserId(1), Utc::now());
        ctx.relationship_score = 42;
        ctx.mat_count = 3;
        ctx.offense_count = 2;
        ctx.last_offense_at = Some(Utc::now());

        assert!(ctx.reset_counters());
        assert_eq!(ctx.mat_count, 0);
        assert_eq!(ctx.offense_count, 0);
        assert!(ctx.last_offense_at.is_none());
        assert_eq!(ctx.relationship_score, 42);

        assert!(!ctx.reset_counters(), "second reset finds nothing to clear");
    }

    #[test]
    fn user_info_has_set_semantics() {
        let mut info = UserInfo::default();
        assert!(info.add_interest("музыка"));
        assert!(!info.add_interest("музыка"));
        assert_eq!(info.interests.len(), 1);
    }

    #[test]
    fn idle_detection() {
        let now = Utc::now();
        let mut ctx = UserContext::new(UserId(1), now);
        ctx.last_interaction = now - Duration::hours(25);
        assert!(ctx.is_idle(now, Duration::hours(24)));
        ctx.last_interaction = now - Duration::hours(1);
        assert!(!ctx.is_idle(now, Duration::hours(24)));
    }

    #[test]
    fn json_round_trip_is_lossless() {
        let mut ctx = UserContext::new(UserId(99), Utc::now());
        ctx.push_turn(turn(1), 10);
        ctx.user_info.add_place("Москве");
        ctx.display_name = Some("Анна".into());

        let json = serde_json::to_string(&ctx).unwrap();
        let back: UserContext = serde_json::from_str(&json).unwrap();
        assert_eq!(ctx, back);
    }
}
