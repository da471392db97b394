// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Relationship scoring.
//!
//! `delta = base + style_modifier + bonus * positive_hits - penalty * negative_hits`,
//! where hits count each distinct keyword once and negative hits include
//! profanity stems. The new score is clamped at the configured floor.

use rapport_config::model::ScoringConfig;
use rapport_core::{RelationshipLevel, StyleTag, UserContext};

use crate::lexicon;

/// Score adjustment contributed by the turn's style alone.
pub const fn style_modifier(style: StyleTag) -> i64 {
    match style {
        StyleTag::Friendly => 2,
        StyleTag::Affectionate => 3,
        StyleTag::Flirtatious => 2,
        StyleTag::Caring => 1,
        StyleTag::Technical | StyleTag::Neutral => 0,
        StyleTag::Sarcastic => -1,
        StyleTag::Aggressive => -5,
        StyleTag::Angry | StyleTag::Hurt => -7,
    }
}

/// Result of scoring one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreOutcome {
    pub delta: i64,
    pub new_score: i64,
    pub previous_level: RelationshipLevel,
    pub new_level: RelationshipLevel,
}

impl ScoreOutcome {
    pub fn level_changed(&self) -> bool {
        self.previous_level != self.new_level
    }
}

#[derive(Debug, Clone)]
pub struct RelationshipScorer {
    config: ScoringConfig,
}

impl RelationshipScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Computes the delta without touching the context.
    pub fn delta(&self, style: StyleTag, message: &str) -> i64 {
        let lower = message.to_lowercase();
        let positive = lexicon::matches(&lower, lexicon::POSITIVE_WORDS).len() as i64;
        let negative = lexicon::matches(&lower, lexicon::NEGATIVE_WORDS).len() as i64
            + i64::from(lexicon::count_profanity(&lower));
        self.config.base_points + style_modifier(style) + self.config.positive_bonus * positive
            - self.config.negative_penalty * negative
    }

    /// Applies one turn to the score and interaction counters.
    pub fn score(&self, style: StyleTag, message: &str, ctx: &mut UserContext) -> ScoreOutcome {
        let previous_level = ctx.relationship_level();
        let delta = self.delta(style, message);

        let mut new_score = ctx.relationship_score.saturating_add(delta);
        if let Some(floor) = self.config.score_floor {
            new_score = new_score.max(floor);
        }
        ctx.relationship_score = new_score;
        ctx.messages_count += 1;
        if delta > 0 {
            ctx.positive_interactions += 1;
        } else if delta < 0 {
            ctx.negative_interactions += 1;
        }

        ScoreOutcome {
            delta,
            new_score,
            previous_level,
            new_level: RelationshipLevel::from_score(new_score),
        }
    }
}
