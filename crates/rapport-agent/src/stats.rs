// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only view of a user's relationship state.

use chrono::{DateTime, Utc};
use rapport_core::{Mood, RelationshipLevel, StyleTag, UserContext, UserId};

/// Snapshot served to the command layer. Building one never mutates state.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipStats {
    pub user_id: UserId,
    pub messages_count: u64,
    pub level: RelationshipLevel,
    pub score: i64,
    pub trust: f64,
    pub positive_interactions: u64,
    pub negative_interactions: u64,
    pub offense_count: u32,
    pub mat_count: u32,
    pub last_offense_at: Option<DateTime<Utc>>,
    pub last_style: Option<StyleTag>,
    pub mood: Mood,
}

impl From<&UserContext> for RelationshipStats {
    fn from(ctx: &UserContext) -> Self {
        Self {
            user_id: ctx.user_id,
            messages_count: ctx.messages_count,
            level: ctx.relationship_level(),
            score: ctx.relationship_score,
            trust: ctx.trust_level(),
            positive_interactions: ctx.positive_interactions,
            negative_interactions: ctx.negative_interactions,
            offense_count: ctx.offense_count,
            mat_count: ctx.mat_count,
            last_offense_at: ctx.last_offense_at,
            last_style: ctx.last_style(),
            mood: ctx.mood,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_level_and_trust() {
        let mut ctx = UserContext::new(UserId(3), Utc::now());
        ctx.relationship_score = 35;
        ctx.messages_count = 8;
        ctx.positive_interactions = 6;
        ctx.negative_interactions = 1;

        let stats = RelationshipStats::from(&ctx);
        assert_eq!(stats.level, RelationshipLevel::Friend);
        assert_eq!(stats.trust, 75.0);
        assert_eq!(stats.last_style, None);
        assert_eq!(stats.negative_interactions, 1);
    }
}
