// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Profanity escalation.
//!
//! `mat_count` grows by the number of distinct profanity stems in each
//! message. Once it reaches the warning threshold the gate answers with a
//! fixed warning, and from the block threshold on with a fixed block text.
//! Both replies bypass the completion service. The block is soft: nothing
//! is enforced at the transport level.

use chrono::{DateTime, Utc};
use rapport_config::model::ModerationConfig;
use rapport_core::UserContext;

use crate::lexicon;
use crate::persona::{BLOCKED_TEXT, FINAL_WARNING_TEXT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationVerdict {
    /// No profanity in this message.
    Clean,
    /// Profanity counted; the turn continues normally.
    Noted { hits: u32 },
    /// Reply with the final warning instead of a completion.
    FinalWarning,
    /// Reply with the block text instead of a completion.
    Blocked,
}

impl ModerationVerdict {
    /// Fixed reply for verdicts that bypass the completion service.
    pub fn bypass_text(self) -> Option<&'static str> {
        match self {
            ModerationVerdict::FinalWarning => Some(FINAL_WARNING_TEXT),
            ModerationVerdict::Blocked => Some(BLOCKED_TEXT),
            ModerationVerdict::Clean | ModerationVerdict::Noted { .. } => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModerationVerdict::Clean => "clean",
            ModerationVerdict::Noted { .. } => "noted",
            ModerationVerdict::FinalWarning => "final_warning",
            ModerationVerdict::Blocked => "blocked",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModerationGate {
    warning_threshold: u32,
    block_threshold: u32,
}

impl ModerationGate {
    pub fn new(config: &ModerationConfig) -> Self {
        Self {
            warning_threshold: config.warning_threshold,
            block_threshold: config.block_threshold,
        }
    }

    /// Counts profanity in `message` and returns the escalation step.
    ///
    /// Counters only move when the message itself contains profanity, so a
    /// clean message after a warning is answered normally.
    pub fn inspect(&self, message: &str, ctx: &mut UserContext, now: DateTime<Utc>) -> ModerationVerdict {
        let hits = lexicon::count_profanity(&message.to_lowercase());
        if hits == 0 {
            return ModerationVerdict::Clean;
        }

        ctx.mat_count = ctx.mat_count.saturating_add(hits);
        ctx.offense_count = ctx.offense_count.saturating_add(1);
        ctx.last_offense_at = Some(now);

        if ctx.mat_count >= self.block_threshold {
            ModerationVerdict::Blocked
        } else if ctx.mat_count >= self.warning_threshold {
            ModerationVerdict::FinalWarning
        } else {
            ModerationVerdict::Noted { hits }
        }
    }
}
