// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed phrase tables for the enrichment stages.

use rapport_core::{Mood, RelationshipLevel, StyleTag};

/// Where the display name goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamePlacement {
    /// `Анна, текст`
    Prefix,
    /// `текст, Анна!`
    Suffix,
    /// `Знаешь, Анна, текст`
    Interjection(&'static str),
}

/// Name placements available for a style at a level.
///
/// Strangers only get the plain prefix; warmer styles unlock interjections
/// once the user is a friend.
pub fn name_placements(style: StyleTag, level: RelationshipLevel) -> &'static [NamePlacement] {
    use NamePlacement::*;

    if level == RelationshipLevel::Stranger {
        return &[Prefix];
    }
    let warm = matches!(
        style,
        StyleTag::Friendly | StyleTag::Affectionate | StyleTag::Flirtatious | StyleTag::Caring
    );
    match (warm, level >= RelationshipLevel::Friend) {
        (true, true) => &[Prefix, Suffix, Interjection("Знаешь"), Interjection("Слушай")],
        (true, false) => &[Prefix, Suffix],
        (false, true) => &[Prefix, Suffix, Interjection("Знаешь")],
        (false, false) => &[Prefix, Suffix],
    }
}

/// Emotional reaction prefixes, keyed by style.
pub fn reactions(style: StyleTag) -> &'static [&'static str] {
    match style {
        StyleTag::Friendly => &["Ух ты!", "Вау!", "Класс!", "Ура!"],
        StyleTag::Caring => &["Ох...", "Эх...", "Понимаю тебя...", "Бедняжка..."],
        StyleTag::Hurt => &["Мне обидно...", "Это было больно...", "Не ожидала от тебя..."],
        _ => &["Ого!", "Надо же!", "Ничего себе!", "Хм..."],
    }
}

/// Hedging phrases spliced between words.
pub const CORRECTIONS: &[&str] = &["вернее,", "точнее,", "то есть,", "в смысле,", "точнее говоря,"];

/// Colloquial misspellings: (word, typo).
pub const TYPOS: &[(&str, &str)] = &[
    ("что", "чо"),
    ("конечно", "конэчно"),
    ("сейчас", "щас"),
    ("чтобы", "чтоб"),
    ("тогда", "тода"),
    ("меня", "мене"),
];

/// Framing phrases prepended for a non-neutral mood.
pub fn mood_phrases(mood: Mood) -> &'static [&'static str] {
    match mood {
        Mood::Positive => &[
            "Это же просто замечательно!",
            "Как здорово!",
            "Восхитительно!",
            "Я рада за тебя!",
        ],
        Mood::Negative => &[
            "Мне жаль это слышать...",
            "Понимаю, как тебе тяжело...",
            "Сочувствую...",
            "Это действительно непросто...",
        ],
        Mood::Neutral => &[],
    }
}

/// Openers for follow-up questions.
pub const QUESTION_STARTERS: &[&str] = &["Кстати,", "Слушай,", "А", "Интересно,"];

/// Questions used when nothing is known about the user.
pub const GENERIC_QUESTIONS: &[&str] = &[
    "как прошел твой день?",
    "что интересного было сегодня?",
    "какие планы на выходные?",
    "чем увлекаешься в свободное время?",
    "какую музыку любишь слушать?",
];

/// Filler clauses closing a reply.
pub const ENDINGS: &[&str] = &[
    " вот так вот.",
    " как-то так.",
    " примерно так.",
    " в общем.",
    " ну да.",
    " в принципе.",
];

/// Emoji keyed by style. Hostile styles have none.
pub fn emojis(style: StyleTag) -> &'static [&'static str] {
    match style {
        StyleTag::Neutral => &["🙂", "😌"],
        StyleTag::Friendly => &["😊", "🙂", "✨", "😄"],
        StyleTag::Sarcastic => &["🙄", "😏"],
        StyleTag::Flirtatious => &["😉", "😏", "💕"],
        StyleTag::Technical => &["🤓", "💻"],
        StyleTag::Caring => &["🤗", "💙"],
        StyleTag::Affectionate => &["🥰", "❤️", "🤗"],
        StyleTag::Aggressive | StyleTag::Angry | StyleTag::Hurt => &[],
    }
}
