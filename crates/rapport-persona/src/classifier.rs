// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Style classification.
//!
//! Rules are tried in a fixed order and the first match wins:
//!
//! 1. Profanity: `angry`, or `hurt` at `CLOSE_FRIEND` and above.
//! 2. Keyword triggers, in [`STYLE_TRIGGERS`](crate::lexicon::STYLE_TRIGGERS) order.
//! 3. Mood fallback: negative mood gives `caring`, positive gives `friendly`,
//!    each with the configured probability.
//! 4. Persistence: the previous turn's style, with the configured probability.
//! 5. `neutral`.
//!
//! Randomness is only consulted by rules 3 and 4.

use rand::Rng;
use rapport_config::model::ClassifierConfig;
use rapport_core::{Mood, RelationshipLevel, StyleTag, UserContext};

use crate::lexicon;

/// Which rule produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationRule {
    Profanity,
    Trigger(&'static str),
    MoodFallback,
    Persistence,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub style: StyleTag,
    pub rule: ClassificationRule,
}

#[derive(Debug, Clone)]
pub struct StyleClassifier {
    mood_fallback_probability: f64,
    persistence_probability: f64,
}

impl StyleClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            mood_fallback_probability: config.mood_fallback_probability.clamp(0.0, 1.0),
            persistence_probability: config.persistence_probability.clamp(0.0, 1.0),
        }
    }

    pub fn classify<R: Rng + ?Sized>(
        &self,
        message: &str,
        ctx: &UserContext,
        rng: &mut R,
    ) -> Classification {
        let lower = message.to_lowercase();

        if lexicon::contains_profanity(&lower) {
            let style = if ctx.relationship_level() >= RelationshipLevel::CloseFriend {
                StyleTag::Hurt
            } else {
                StyleTag::Angry
            };
            return Classification {
                style,
                rule: ClassificationRule::Profanity,
            };
        }

        for (style, triggers) in lexicon::STYLE_TRIGGERS {
            if let Some(trigger) = lexicon::first_match(&lower, triggers) {
                return Classification {
                    style: *style,
                    rule: ClassificationRule::Trigger(trigger),
                };
            }
        }

        let mood_style = match lexicon::detect_mood(&lower) {
            Mood::Negative => Some(StyleTag::Caring),
            Mood::Positive => Some(StyleTag::Friendly),
            Mood::Neutral => None,
        };
        if let Some(style) = mood_style
            && roll(rng, self.mood_fallback_probability)
        {
            return Classification {
                style,
                rule: ClassificationRule::MoodFallback,
            };
        }

        if let Some(style) = ctx.last_style()
            && roll(rng, self.persistence_probability)
        {
            return Classification {
                style,
                rule: ClassificationRule::Persistence,
            };
        }

        Classification {
            style: StyleTag::Neutral,
            rule: ClassificationRule::Default,
        }
    }
}

fn roll<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    p > 0.0 && rng.gen_bool(p)
}
