// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entity extraction: places, interests, and per-message mood.
//!
//! Places and interests come from pattern matches over prepositional
//! phrases and interest verbs. A second, deliberately noisy pass samples
//! generic nouns into `interests` with an independent probability each;
//! it trades precision for variety and is only reproducible with a seeded
//! RNG.

use std::sync::LazyLock;

use rand::Rng;
use rapport_config::model::ExtractionConfig;
use rapport_core::UserContext;
use regex::Regex;
use tracing::trace;

use crate::lexicon;

static PLACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^\p{L}])(?:в|из|на)\s+([\p{L}-]{3,})").unwrap()
});

static INTEREST_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)(?:люблю|нравится|увлекаюсь|занимаюсь|обожаю)\s+([а-яё]{3,20}(?:\s+[а-яё]{3,20})?)")
            .unwrap(),
        Regex::new(r"(?i)(?:хобби|увлечение|интерес)\s*[:-]?\s*([а-яё]{3,20}(?:\s+[а-яё]{3,20})?)")
            .unwrap(),
        Regex::new(r"(?i)(?:играю|занимаюсь)\s+на\s+([а-яё]{3,15})").unwrap(),
        Regex::new(r"(?i)(?:слушаю|люблю)\s+([а-яё]{3,15})\s+музыку").unwrap(),
    ]
});

static NOUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b([а-яА-ЯёЁ]{4,15})\b").unwrap());

static TRAILING_PREPOSITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+(?:на|в|за|под|к|по|с|со|у|о|об|от)$").unwrap()
});

const PLACE_STOPLIST: &[&str] = &["меня", "тебя", "себя", "нас", "вас", "него", "неё", "них", "гитаре"];

const INTEREST_STOPLIST: &[&str] = &["ты", "вы", "мне", "тебе", "меня", "тебя", "себя"];

/// Verb forms that mean a capture swallowed another trigger.
pub const VERB_MARKERS: &[&str] = &["играю", "люблю", "нравится", "занимаюсь"];

const NOUN_STOPLIST: &[&str] = &["гитаре", "играю", "люблю"];

/// Pulls user facts and mood out of each message.
#[derive(Debug, Clone)]
pub struct EntityExtractor {
    noun_sample_probability: f64,
}

impl EntityExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            noun_sample_probability: config.noun_sample_probability.clamp(0.0, 1.0),
        }
    }

    /// Updates `ctx.user_info` and `ctx.mood` from `message`.
    ///
    /// Repeating the same message never adds duplicates; the noun sampler
    /// may add new entries on each call.
    pub fn extract<R: Rng + ?Sized>(&self, message: &str, ctx: &mut UserContext, rng: &mut R) {
        let lower = message.to_lowercase();
        ctx.mood = lexicon::detect_mood(&lower);

        for place in extract_places(message) {
            if ctx.user_info.add_place(place.clone()) {
                trace!(user_id = %ctx.user_id, place = %place, "place extracted");
            }
        }
        for interest in extract_interests(message) {
            if ctx.user_info.add_interest(interest.clone()) {
                trace!(user_id = %ctx.user_id, interest = %interest, "interest extracted");
            }
        }
        for noun in NOUN.captures_iter(message).map(|c| c[1].to_lowercase()) {
            if NOUN_STOPLIST.contains(&noun.as_str()) {
                continue;
            }
            if self.noun_sample_probability > 0.0 && rng.gen_bool(self.noun_sample_probability) {
                ctx.user_info.add_interest(noun);
            }
        }
    }
}

/// Places named after `в`, `из`, or `на`, minus pronouns.
pub fn extract_places(message: &str) -> Vec<String> {
    PLACE
        .captures_iter(message)
        .map(|c| c[1].trim_matches('-').to_string())
        .filter(|place| place.chars().count() > 2)
        .filter(|place| !PLACE_STOPLIST.contains(&place.to_lowercase().as_str()))
        .collect()
}

/// Interests introduced by fixed trigger verbs, lowercased.
pub fn extract_interests(message: &str) -> Vec<String> {
    let mut found = Vec::new();
    for pattern in INTEREST_PATTERNS.iter() {
        for caps in pattern.captures_iter(message) {
            let raw = caps[1].trim().to_lowercase();
            let first_word = raw.split_whitespace().next().unwrap_or_default();
            if raw.chars().count() <= 2
                || INTEREST_STOPLIST.contains(&first_word)
                || VERB_MARKERS.iter().any(|v| raw.contains(v))
            {
                continue;
            }
            let interest = TRAILING_PREPOSITION.replace(&raw, "").trim().to_string();
            if !interest.is_empty() && !found.contains(&interest) {
                found.push(interest);
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rapport_core::{Mood, UserId};

    use super::*;

    fn quiet() -> EntityExtractor {
        EntityExtractor {
            noun_sample_probability: 0.0,
        }
    }

    #[test]
    fn places_follow_prepositions() {
        assert_eq!(extract_places("Я живу в Москве"), vec!["Москве"]);
        assert_eq!(extract_places("Я из Казани, а отдыхал на Байкале"), vec!["Казани", "Байкале"]);
    }

    #[test]
    fn place_stoplist_drops_pronouns() {
        assert!(extract_places("посмотри на меня").is_empty());
        assert!(extract_places("играю на гитаре").is_empty());
    }

    #[test]
    fn prepositions_inside_words_are_ignored() {
        // "нов" must not yield a place from the "в" inside it.
        assert!(extract_places("новый день").is_empty());
    }

    #[test]
    fn interests_from_trigger_verbs() {
        assert_eq!(extract_interests("Я обожаю рисование"), vec!["рисование"]);
        assert_eq!(extract_interests("играю на гитаре"), vec!["гитаре"]);
        assert_eq!(extract_interests("слушаю джазовую музыку"), vec!["джазовую"]);
    }

    #[test]
    fn interest_stoplist_drops_pronouns() {
        assert!(extract_interests("люблю тебя").is_empty());
        assert!(extract_interests("мне нравится люблю").is_empty());
    }

    #[test]
    fn extraction_is_idempotent_without_noun_sampling() {
        let extractor = quiet();
        let mut rng = StdRng::seed_from_u64(7);
        let mut ctx = UserContext::new(UserId(1), Utc::now());
        extractor.extract("Я живу в Москве и обожаю рисование", &mut ctx, &mut rng);
        let snapshot = ctx.user_info.clone();
        extractor.extract("Я живу в Москве и обожаю рисование", &mut ctx, &mut rng);
        assert_eq!(ctx.user_info, snapshot);
        assert!(ctx.user_info.places.contains("Москве"));
        assert!(ctx.user_info.interests.contains("рисование"));
    }

    #[test]
    fn mood_reflects_only_current_message() {
        let extractor = quiet();
        let mut rng = StdRng::seed_from_u64(7);
        let mut ctx = UserContext::new(UserId(1), Utc::now());
        extractor.extract("мне грустно и плохо", &mut ctx, &mut rng);
        assert_eq!(ctx.mood, Mood::Negative);
        extractor.extract("просто сообщение", &mut ctx, &mut rng);
        assert_eq!(ctx.mood, Mood::Neutral);
    }

    #[test]
    fn noun_sampler_is_noisy_but_seeded() {
        let extractor = EntityExtractor {
            noun_sample_probability: 0.3,
        };
        let message = "сегодня смотрела кино потом читала книгу про океан";
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut ctx = UserContext::new(UserId(1), Utc::now());
            extractor.extract(message, &mut ctx, &mut rng);
            ctx.user_info.interests
        };
        assert_eq!(run(11), run(11));

        let always = EntityExtractor {
            noun_sample_probability: 1.0,
        };
        let mut rng = StdRng::seed_from_u64(0);
        let mut ctx = UserContext::new(UserId(1), Utc::now());
        always.extract("сегодня смотрела сон", &mut ctx, &mut rng);
        assert!(ctx.user_info.interests.contains("сегодня"));
        assert!(ctx.user_info.interests.contains("смотрела"));
        // Words shorter than four letters are never sampled.
        assert!(!ctx.user_info.interests.contains("сон"));
    }
}
