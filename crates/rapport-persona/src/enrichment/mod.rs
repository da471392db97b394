// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply enrichment.
//!
//! A raw completion passes through these stages in order, each gated by
//! its own probability:
//!
//! 1. Name insertion (forced on the first interaction).
//! 2. Emotional reaction prefix.
//! 3. Self-correction splice.
//! 4. Typo injection.
//! 5. Mood framing.
//! 6. Follow-up question, as a separate paragraph.
//! 7. Natural ending.
//! 8. Emoji, at the end of the body paragraph.
//!
//! `angry` replies skip stages 2 through 8 and have their `.`/`?` turned
//! into `!`. A level-transition phrase, when present, is prepended as its
//! own paragraph last.
//!
//! Every stage is a free function taking an explicit RNG so it can be
//! tested in isolation.

pub mod templates;

use std::sync::LazyLock;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use rapport_config::model::EnrichmentConfig;
use rapport_core::{Mood, StyleTag, UserContext, UserInfo};
use regex::Regex;
use tracing::trace;

use crate::extractor::VERB_MARKERS;
use crate::persona::{self, LevelShift};
use templates::NamePlacement;

static TYPO_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    templates::TYPOS
        .iter()
        .map(|(word, typo)| (Regex::new(&format!(r"(?i)\b{word}\b")).unwrap(), *typo))
        .collect()
});

/// Applies the enrichment stages to raw completions.
#[derive(Debug, Clone)]
pub struct EnrichmentPipeline {
    config: EnrichmentConfig,
}

impl EnrichmentPipeline {
    pub fn new(config: EnrichmentConfig) -> Self {
        Self { config }
    }

    /// Turns `raw` into the final reply.
    ///
    /// Updates `ctx.name_usage` when the name is used and records whether
    /// the reply ends in a question in `ctx.last_reply_asked`.
    pub fn enrich<R: Rng + ?Sized>(
        &self,
        raw: &str,
        style: StyleTag,
        shift: Option<LevelShift>,
        ctx: &mut UserContext,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> String {
        let mut body = raw.trim().to_string();

        if let Some(name) = ctx.display_name.clone().filter(|n| !n.is_empty())
            && roll(rng, self.name_probability(style, ctx, now))
        {
            let placements = templates::name_placements(style, ctx.relationship_level());
            if let Some(placement) = placements.choose(rng) {
                body = insert_name(&body, &name, *placement);
                ctx.name_usage.count += 1;
                ctx.name_usage.last_used_at = Some(now);
                trace!(stage = "name", ?placement, "enrichment stage applied");
            }
        }

        let mut question = None;
        if style == StyleTag::Angry {
            body = angry_punctuation(&body);
        } else {
            let c = &self.config;
            if roll(rng, c.reaction_probability) {
                body = emotional_reaction(&body, style, rng);
                trace!(stage = "reaction", "enrichment stage applied");
            }
            if roll(rng, c.correction_probability)
                && let Some(corrected) = self_correction(&body, rng)
            {
                body = corrected;
                trace!(stage = "correction", "enrichment stage applied");
            }
            if roll(rng, c.typo_probability)
                && let Some(typoed) = inject_typo(&body, rng)
            {
                body = typoed;
                trace!(stage = "typo", "enrichment stage applied");
            }
            if roll(rng, c.mood_framing_probability)
                && let Some(framed) = mood_framing(&body, ctx.mood, rng)
            {
                body = framed;
                trace!(stage = "mood", "enrichment stage applied");
            }
            if self.question_allowed(&body, style, ctx)
                && roll(rng, self.question_probability(ctx))
            {
                question = Some(follow_up_question(&ctx.user_info, rng));
                trace!(stage = "question", "enrichment stage applied");
            }
            if question.is_none()
                && roll(rng, c.ending_probability)
                && let Some(ended) = natural_ending(&body, rng)
            {
                body = ended;
                trace!(stage = "ending", "enrichment stage applied");
            }
            if roll(rng, c.emoji_probability)
                && let Some(decorated) = append_emoji(&body, style, rng)
            {
                body = decorated;
                trace!(stage = "emoji", "enrichment stage applied");
            }
        }

        let phrase = shift.map(|shift| persona::level_phrase(shift, rng));
        let reply = render(phrase, &body, question.as_deref());
        ctx.last_reply_asked = reply.trim_end().ends_with('?');
        reply
    }

    /// Probability of inserting the user's name this turn.
    pub fn name_probability(&self, style: StyleTag, ctx: &UserContext, now: DateTime<Utc>) -> f64 {
        if ctx.first_interaction {
            return 1.0;
        }
        if style.is_hostile() {
            return 0.0;
        }
        let mut p = self
            .config
            .name_probabilities
            .get(ctx.relationship_level().index())
            .copied()
            .unwrap_or(0.0);
        let cooldown = Duration::seconds(self.config.name_cooldown_secs as i64);
        if let Some(last) = ctx.name_usage.last_used_at
            && now - last < cooldown
        {
            p *= 0.5;
        }
        p
    }

    /// Probability of asking a follow-up, halved early in a conversation.
    pub fn question_probability(&self, ctx: &UserContext) -> f64 {
        if ctx.conversation_depth < self.config.shallow_depth {
            self.config.question_probability * 0.5
        } else {
            self.config.question_probability
        }
    }

    fn question_allowed(&self, body: &str, style: StyleTag, ctx: &UserContext) -> bool {
        !style.is_hostile() && !body.contains('?') && !ctx.last_reply_asked
    }
}

fn roll<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    p > 0.0 && rng.gen_bool(p.min(1.0))
}

fn render(phrase: Option<&str>, body: &str, question: Option<&str>) -> String {
    let mut out = String::new();
    if let Some(phrase) = phrase.filter(|p| !p.is_empty()) {
        out.push_str(phrase);
        out.push_str("\n\n");
    }
    out.push_str(body);
    if let Some(question) = question {
        out.push_str("\n\n");
        out.push_str(question);
    }
    out
}

fn lowercase_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Places `name` in `text` according to `placement`.
pub fn insert_name(text: &str, name: &str, placement: NamePlacement) -> String {
    match placement {
        NamePlacement::Prefix => format!("{name}, {}", lowercase_first(text)),
        NamePlacement::Suffix => {
            let trimmed = text.trim_end();
            let core = trimmed.trim_end_matches(['.', '!', '?', '…']);
            let tail = &trimmed[core.len()..];
            format!("{core}, {name}{tail}")
        }
        NamePlacement::Interjection(word) => format!("{word}, {name}, {}", lowercase_first(text)),
    }
}

/// Prefixes a reaction keyed by style.
pub fn emotional_reaction<R: Rng + ?Sized>(text: &str, style: StyleTag, rng: &mut R) -> String {
    match templates::reactions(style).choose(rng) {
        Some(reaction) => format!("{reaction} {text}"),
        None => text.to_string(),
    }
}

/// Splices a hedging phrase between words, away from both ends.
///
/// `None` for texts of 20 characters or fewer, or five words or fewer.
pub fn self_correction<R: Rng + ?Sized>(text: &str, rng: &mut R) -> Option<String> {
    if text.chars().count() <= 20 {
        return None;
    }
    let mut words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= 5 {
        return None;
    }
    let position = rng.gen_range(2..=words.len() - 3);
    let phrase = templates::CORRECTIONS.choose(rng).copied()?;
    words.insert(position, phrase);
    Some(words.join(" "))
}

/// Replaces one applicable word with its colloquial misspelling.
pub fn inject_typo<R: Rng + ?Sized>(text: &str, rng: &mut R) -> Option<String> {
    let applicable: Vec<&(Regex, &str)> = TYPO_PATTERNS
        .iter()
        .filter(|(pattern, _)| pattern.is_match(text))
        .collect();
    let (pattern, typo) = applicable.choose(rng)?;
    let found = pattern.find(text)?;
    let replacement = if found.as_str().starts_with(char::is_uppercase) {
        let mut chars = typo.chars();
        chars
            .next()
            .map(|c| c.to_uppercase().chain(chars).collect::<String>())
            .unwrap_or_default()
    } else {
        typo.to_string()
    };
    Some(format!(
        "{}{}{}",
        &text[..found.start()],
        replacement,
        &text[found.end()..]
    ))
}

/// Prepends a sympathetic or celebratory phrase. `None` for neutral mood.
pub fn mood_framing<R: Rng + ?Sized>(text: &str, mood: Mood, rng: &mut R) -> Option<String> {
    templates::mood_phrases(mood)
        .choose(rng)
        .map(|phrase| format!("{phrase} {text}"))
}

/// Builds a question about a known interest, else a place, else anything.
pub fn follow_up_question<R: Rng + ?Sized>(info: &UserInfo, rng: &mut R) -> String {
    let starter = templates::QUESTION_STARTERS.choose(rng).copied().unwrap_or("А");

    let interests: Vec<&String> = info
        .interests
        .iter()
        .filter(|i| is_askable(i, 20))
        .collect();
    if let Some(interest) = interests.choose(rng) {
        return format!("{starter} как твои дела с {interest}?");
    }

    let places: Vec<&String> = info.places.iter().filter(|p| is_askable(p, 25)).collect();
    if let Some(place) = places.choose(rng) {
        return format!("{starter} часто бываешь в {place}?");
    }

    let generic = templates::GENERIC_QUESTIONS
        .choose(rng)
        .copied()
        .unwrap_or("как прошел твой день?");
    format!("{starter} {generic}")
}

fn is_askable(candidate: &str, max_chars: usize) -> bool {
    let lower = candidate.to_lowercase();
    candidate.chars().count() <= max_chars
        && candidate
            .chars()
            .all(|c| c.is_alphabetic() || c == ' ' || c == '-')
        && !VERB_MARKERS.iter().any(|v| lower.contains(v))
}

/// Appends a filler clause. `None` when the text ends with a question.
pub fn natural_ending<R: Rng + ?Sized>(text: &str, rng: &mut R) -> Option<String> {
    let trimmed = text.trim_end();
    if trimmed.ends_with('?') {
        return None;
    }
    let ending = templates::ENDINGS.choose(rng)?;
    Some(format!("{}{ending}", trimmed.trim_end_matches('.')))
}

/// Appends a style emoji. `None` for hostile styles.
pub fn append_emoji<R: Rng + ?Sized>(text: &str, style: StyleTag, rng: &mut R) -> Option<String> {
    templates::emojis(style)
        .choose(rng)
        .map(|emoji| format!("{text} {emoji}"))
}

/// Turns sentence punctuation into exclamations.
pub fn angry_punctuation(text: &str) -> String {
    text.replace(['.', '?'], "!")
}
