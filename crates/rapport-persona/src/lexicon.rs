// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword tables shared by the extractor, classifier, scorer, and gate.
//!
//! Lookups run over the lowercased message and are anchored at the start of
//! a word, so stems like `программ` match all inflections while `рубля` is
//! not read as `бля`.

use std::sync::LazyLock;

use rapport_core::{Mood, StyleTag};
use regex::{Captures, Regex};

/// Words that push mood toward positive and earn a scoring bonus.
pub const POSITIVE_WORDS: &[&str] = &[
    "хорошо",
    "отлично",
    "рад",
    "счастлив",
    "люблю",
    "нравится",
    "прекрасно",
    "замечательно",
];

/// Words that push mood toward negative and cost a scoring penalty.
pub const NEGATIVE_WORDS: &[&str] = &[
    "плохо",
    "грустно",
    "устал",
    "бесит",
    "ненавижу",
    "злой",
    "сердит",
    "отвратительно",
];

/// Profanity stems. Each distinct stem present counts as one hit.
pub const PROFANITY_STEMS: &[&str] = &[
    "бля", "хуй", "хуе", "пизд", "ебат", "ебан", "сука", "мудак", "гандон",
];

/// Verb prefixes that may precede a profanity stem inside one word.
const PROFANITY_PREFIXES: &[&str] = &[
    "при", "раз", "рас", "под", "на", "по", "за", "вы", "от", "до", "об", "съ", "ни", "у", "о",
];

/// Word beginnings that share a stem but are not profanity.
const PROFANITY_EXCLUSIONS: &[&str] = &["бляха", "бляхи", "бляху", "бляхой", "бляш"];

/// Keyword triggers in classification priority order.
///
/// The first style with any matching trigger wins, so a message with both
/// a friendly and a caring trigger is `friendly`.
pub const STYLE_TRIGGERS: &[(StyleTag, &[&str])] = &[
    (
        StyleTag::Friendly,
        &["привет", "здравствуй", "как дела", "спасибо", "добрый день", "доброе утро"],
    ),
    (
        StyleTag::Sarcastic,
        &["ну конечно", "ага", "конечно", "очень смешно", "гениально"],
    ),
    (
        StyleTag::Aggressive,
        &["тупой", "дура", "идиот", "заткнись", "отстань", "бесишь"],
    ),
    (
        StyleTag::Flirtatious,
        &["красивая", "милая", "свидание", "симпатичная"],
    ),
    (
        StyleTag::Technical,
        &["код", "программ", "компьютер", "python", "алгоритм"],
    ),
    (
        StyleTag::Caring,
        &["грустно", "плохо", "одиноко", "устал", "болею"],
    ),
    (
        StyleTag::Affectionate,
        &["люблю тебя", "скучаю", "обнимаю", "целую"],
    ),
];

/// Colloquial tokens and their canonical form.
const SLANG: &[(&str, &str)] = &[
    ("щас", "сейчас"),
    ("ща", "сейчас"),
    ("чё", "что"),
    ("чо", "что"),
    ("шо", "что"),
    ("норм", "нормально"),
    ("спс", "спасибо"),
    ("пжл", "пожалуйста"),
    ("плз", "пожалуйста"),
    ("оч", "очень"),
    ("прив", "привет"),
    ("кст", "кстати"),
    ("тож", "тоже"),
    ("тыщ", "тысяч"),
    ("ваще", "вообще"),
    ("комп", "компьютер"),
];

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\p{L}]+").unwrap());

/// True when `term` occurs in `lower` starting at a word boundary.
///
/// Multi-word terms like `как дела` match when the first word lines up.
pub fn contains_term(lower: &str, term: &str) -> bool {
    WORD.find_iter(lower).any(|word| lower[word.start()..].starts_with(term))
}

/// Returns the distinct entries of `words` found at a word start in `lower`.
pub fn matches<'a>(lower: &str, words: &[&'a str]) -> Vec<&'a str> {
    words.iter().copied().filter(|w| contains_term(lower, w)).collect()
}

/// First entry of `words` found at a word start in `lower`.
pub fn first_match<'a>(lower: &str, words: &[&'a str]) -> Option<&'a str> {
    words.iter().copied().find(|w| contains_term(lower, w))
}

fn profanity_stem(word: &str) -> Option<&'static str> {
    if PROFANITY_EXCLUSIONS.iter().any(|e| word.starts_with(e)) {
        return None;
    }
    let stem_at = |rest: &str| PROFANITY_STEMS.iter().copied().find(|s| rest.starts_with(s));
    stem_at(word).or_else(|| {
        PROFANITY_PREFIXES
            .iter()
            .filter_map(|p| word.strip_prefix(*p))
            .find_map(stem_at)
    })
}

/// Number of distinct profanity stems in the message.
pub fn count_profanity(lower: &str) -> u32 {
    let mut stems: Vec<&str> = WORD
        .find_iter(lower)
        .filter_map(|word| profanity_stem(word.as_str()))
        .collect();
    stems.sort_unstable();
    stems.dedup();
    stems.len() as u32
}

pub fn contains_profanity(lower: &str) -> bool {
    WORD.find_iter(lower).any(|word| profanity_stem(word.as_str()).is_some())
}

/// Mood of a single message from positive/negative keyword counts.
/// Ties, including zero hits on both sides, are neutral.
pub fn detect_mood(lower: &str) -> Mood {
    let positive = matches(lower, POSITIVE_WORDS).len();
    let negative = matches(lower, NEGATIVE_WORDS).len();
    match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => Mood::Positive,
        std::cmp::Ordering::Less => Mood::Negative,
        std::cmp::Ordering::Equal => Mood::Neutral,
    }
}

/// Replaces whole-word slang tokens with their canonical form.
///
/// Deterministic: each token has exactly one canonical replacement.
pub fn normalize_slang(text: &str) -> String {
    WORD.replace_all(text, |caps: &Captures| {
        let word = &caps[0];
        let lower = word.to_lowercase();
        SLANG
            .iter()
            .find(|(slang, _)| *slang == lower)
            .map(|(_, canonical)| canonical.to_string())
            .unwrap_or_else(|| word.to_string())
    })
    .into_owned()
}

/// Lowercases, collapses whitespace, and normalizes slang.
pub fn normalize_message(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    normalize_slang(&collapsed.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mood_ties_are_neutral() {
        assert_eq!(detect_mood("всё хорошо, но я устал"), Mood::Neutral);
        assert_eq!(detect_mood("просто текст"), Mood::Neutral);
    }

    #[test]
    fn mood_uses_counts() {
        assert_eq!(detect_mood("отлично и замечательно"), Mood::Positive);
        assert_eq!(detect_mood("грустно и плохо, хотя отлично"), Mood::Negative);
    }

    #[test]
    fn profanity_counts_distinct_stems() {
        assert_eq!(count_profanity("сука сука"), 1);
        assert_eq!(count_profanity("сука бля"), 2);
        assert_eq!(count_profanity("привет"), 0);
    }

    #[test]
    fn profanity_stems_inside_ordinary_words_are_ignored() {
        assert_eq!(count_profanity("стоит два рубля"), 0);
        assert_eq!(count_profanity("на борту корабля"), 0);
        assert_eq!(count_profanity("не надо оскорблять"), 0);
        assert_eq!(count_profanity("хлебать суп"), 0);
        assert_eq!(count_profanity("ремень с бляхой"), 0);
        assert!(!contains_profanity("стоит два рубля"));
    }

    #[test]
    fn profanity_behind_a_verb_prefix_still_counts() {
        assert_eq!(count_profanity("пошёл нахуй"), 1);
        assert_eq!(count_profanity("выебан, сука"), 2);
        assert!(contains_profanity("Бля".to_lowercase().as_str()));
    }

    #[test]
    fn terms_match_only_at_word_start() {
        assert!(!contains_term("зайду в магазин", "ага"));
        assert!(!contains_term("это бесконечно", "конечно"));
        assert!(contains_term("ну, конечно", "конечно"));
        assert!(contains_term("привет, как дела?", "как дела"));
        assert!(contains_term("пишу программу", "программ"));
        assert_eq!(first_match("это бесконечно, ага", &["конечно", "ага"]), Some("ага"));
        assert_eq!(matches("плохо, но не очень плохо", NEGATIVE_WORDS), vec!["плохо"]);
    }

    #[test]
    fn slang_is_replaced_on_word_boundaries() {
        assert_eq!(normalize_slang("Чё щас делаешь?"), "что сейчас делаешь?");
        // "оч" inside a longer word is left alone.
        assert_eq!(normalize_slang("очки"), "очки");
    }

    #[test]
    fn normalized_message_collapses_whitespace() {
        assert_eq!(normalize_message("  Привет   КАК   дела  "), "привет как дела");
    }

    #[test]
    fn trigger_table_starts_with_friendly() {
        assert_eq!(STYLE_TRIGGERS[0].0, StyleTag::Friendly);
        assert!(STYLE_TRIGGERS.iter().all(|(s, _)| !s.is_hostile() || *s == StyleTag::Aggressive));
    }
}
