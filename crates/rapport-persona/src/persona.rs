// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The persona profile and its fixed text tables.
//!
//! Everything the bot says without asking the completion service comes
//! from here: FAQ answers, moderation replies, fallbacks, level phrases,
//! and the per-style prompt instructions.

use rand::Rng;
use rand::seq::SliceRandom;
use rapport_config::model::PersonaConfig;
use rapport_core::{RelationshipLevel, StyleTag};

/// Reply used when the gate issues its last warning.
pub const FINAL_WARNING_TEXT: &str = "Я же просила не материться! Последнее предупреждение!";

/// Reply used once the user is soft-blocked.
pub const BLOCKED_TEXT: &str = "Я предупреждала! С тобой бесполезно разговаривать. Блокирую!";

/// Fixed replies sent instead of a completion when a turn cannot finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// The completion call exceeded its deadline.
    Timeout,
    /// The completion service failed or answered with garbage.
    Unavailable,
    /// Anything else went wrong inside the turn.
    Internal,
}

impl Fallback {
    pub fn text(self) -> &'static str {
        match self {
            Fallback::Timeout => "Ой, я задумалась... Что-то сложное ты спросил!",
            Fallback::Unavailable => "Что-то я сегодня не в форме... Давай попозже поговорим?",
            Fallback::Internal => "Ой, что-то пошло не так... Давай начнем заново?",
        }
    }
}

/// Prompt instruction and sampling temperature for one style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleProfile {
    pub instruction: &'static str,
    pub temperature: f32,
}

/// Which way the relationship level moved this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelShift {
    Up(RelationshipLevel),
    Down(RelationshipLevel),
}

impl LevelShift {
    pub fn between(previous: RelationshipLevel, current: RelationshipLevel) -> Option<Self> {
        match current.cmp(&previous) {
            std::cmp::Ordering::Greater => Some(LevelShift::Up(current)),
            std::cmp::Ordering::Less => Some(LevelShift::Down(current)),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Question patterns with canned answers, checked in order.
enum FaqTopic {
    Name,
    Age,
    City,
    Occupation,
    Bot,
}

const FAQ: &[(&[&str], FaqTopic)] = &[
    (&["как тебя зовут", "твое имя", "твоё имя"], FaqTopic::Name),
    (&["сколько тебе лет", "твой возраст"], FaqTopic::Age),
    (&["откуда ты", "где ты живешь", "где ты живёшь"], FaqTopic::City),
    (&["кем работаешь", "кем ты работаешь", "где работаешь"], FaqTopic::Occupation),
    (&["ты бот", "ты робот", "ты человек", "ты нейросеть"], FaqTopic::Bot),
];

/// The configured persona.
#[derive(Debug, Clone)]
pub struct Persona {
    config: PersonaConfig,
}

impl Persona {
    pub fn new(config: PersonaConfig) -> Self {
        Self { config }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn default_user_name(&self) -> &str {
        &self.config.default_user_name
    }

    /// Biography paragraph that opens every system prompt.
    pub fn bio(&self) -> String {
        let c = &self.config;
        format!(
            "Ты {name} ({full_name}), тебе {age} лет, ты живешь в городе {city}. \
             Профессия: {profession}. Образование: {education}. \
             Увлечения: {hobbies}. Домашние животные: {pets}. \
             Любимая музыка: {music}. Любимая еда: {food}. \
             Ты живой человек, а не ассистент: отвечай коротко, по-разговорному, \
             от первого лица и в женском роде.",
            name = c.name,
            full_name = c.full_name,
            age = c.age,
            city = c.city,
            profession = c.profession,
            education = c.education,
            hobbies = c.hobbies.join(", "),
            pets = c.pets,
            music = c.favorite_music,
            food = c.favorite_food,
        )
    }

    /// Text for the `/about` command.
    pub fn about(&self) -> String {
        let c = &self.config;
        format!(
            "👋 Привет! Я {name} ({full_name}), {age} лет из {city}\n\n\
             🎨 Профессия: {profession}\n\
             🎓 Образование: {education}\n\
             ❤️ Увлечения: {hobbies}\n\
             🐾 Домашние животные: {pets}\n\
             🎵 Любимая музыка: {music}\n\
             🍕 Любимая еда: {food}\n\n\
             Давай знакомиться!",
            name = c.name,
            full_name = c.full_name,
            age = c.age,
            city = c.city,
            profession = c.profession,
            education = c.education,
            hobbies = c.hobbies.join(", "),
            pets = c.pets,
            music = c.favorite_music,
            food = c.favorite_food,
        )
    }

    /// Canned answer for a known question, given the normalized message.
    pub fn faq_answer(&self, normalized: &str) -> Option<String> {
        let c = &self.config;
        let (_, topic) = FAQ
            .iter()
            .find(|(patterns, _)| patterns.iter().any(|p| normalized.contains(p)))?;
        Some(match topic {
            FaqTopic::Name => format!("Меня зовут {}! А полностью {}.", c.name, c.full_name),
            FaqTopic::Age => format!("Мне {} лет.", c.age),
            FaqTopic::City => format!("Я живу в городе {}. Очень люблю его!", c.city),
            FaqTopic::Occupation => format!("Я {}. Мне очень нравится моя работа!", c.profession),
            FaqTopic::Bot => format!(
                "Нет, я {}, обычная девушка из города {}. Просто много переписываюсь!",
                c.name, c.city
            ),
        })
    }

    /// Sanitizes a transport display-name hint into the name used in replies.
    ///
    /// Keeps the first word, letters only, with the first letter capitalized.
    pub fn display_name(&self, hint: Option<&str>) -> String {
        sanitize_display_name(hint).unwrap_or_else(|| self.config.default_user_name.clone())
    }
}

/// First word of `hint`, letters only, capitalized. `None` when nothing is left.
pub fn sanitize_display_name(hint: Option<&str>) -> Option<String> {
    let first = hint?.trim().trim_start_matches('@').split_whitespace().next()?;
    let letters: String = first.chars().filter(|c| c.is_alphabetic()).collect();
    let mut chars = letters.chars();
    let head = chars.next()?;
    Some(head.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect())
}

/// Instruction and temperature for a style.
pub fn style_profile(style: StyleTag) -> StyleProfile {
    let (instruction, temperature) = match style {
        StyleTag::Neutral => ("Общайся спокойно и естественно.", 0.6),
        StyleTag::Friendly => ("Будь дружелюбной и теплой, проявляй интерес к собеседнику.", 0.7),
        StyleTag::Sarcastic => ("Отвечай с легкой иронией, но без злобы.", 0.8),
        StyleTag::Aggressive => (
            "Тебя задели. Отвечай холодно и сдержанно, не оскорбляй в ответ.",
            0.5,
        ),
        StyleTag::Flirtatious => ("Можно слегка пофлиртовать, оставаясь собой.", 0.8),
        StyleTag::Technical => ("Отвечай четко и по делу, можно с примерами.", 0.3),
        StyleTag::Caring => ("Поддержи собеседника, прояви заботу и сочувствие.", 0.6),
        StyleTag::Affectionate => ("Отвечай нежно и тепло.", 0.7),
        StyleTag::Angry => ("Ты злишься из-за грубости. Отвечай резко и коротко.", 0.4),
        StyleTag::Hurt => (
            "Тебе обидно, что близкий человек грубит. Покажи, что тебе больно.",
            0.5,
        ),
    };
    StyleProfile {
        instruction,
        temperature,
    }
}

/// Tone guidance for the system prompt at each level.
pub fn relationship_modifier(level: RelationshipLevel) -> &'static str {
    match level {
        RelationshipLevel::Stranger => "Мы только что познакомились. Будь вежливой, но сдержанной.",
        RelationshipLevel::Acquaintance => "Мы знакомы немного. Можно быть немного более открытой.",
        RelationshipLevel::Friend => "Мы друзья. Можно общаться более непринужденно и доверительно.",
        RelationshipLevel::CloseFriend => {
            "Мы близкие друзья. Можно быть очень открытой и эмоциональной."
        }
        RelationshipLevel::BestFriend => {
            "Мы лучшие друзья. Можно быть полностью собой, очень открытой и эмоциональной."
        }
    }
}

/// One-line description shown by `/relationship`.
pub fn level_description(level: RelationshipLevel) -> &'static str {
    match level {
        RelationshipLevel::Stranger => "Мы только познакомились",
        RelationshipLevel::Acquaintance => "Мы знакомы",
        RelationshipLevel::Friend => "Мы друзья",
        RelationshipLevel::CloseFriend => "Мы близкие друзья",
        RelationshipLevel::BestFriend => "Мы лучшие друзья!",
    }
}

fn warm_phrases(level: RelationshipLevel) -> &'static [&'static str] {
    match level {
        RelationshipLevel::Stranger => &["Приятно познакомиться!"],
        RelationshipLevel::Acquaintance => &[
            "Кажется, мы начинаем узнавать друг друга!",
            "С тобой интересно общаться!",
        ],
        RelationshipLevel::Friend => &[
            "Мне кажется, мы подружились!",
            "Я рада, что мы теперь друзья!",
        ],
        RelationshipLevel::CloseFriend => &[
            "Ты стал для меня по-настоящему близким человеком!",
            "Мне так легко с тобой!",
        ],
        RelationshipLevel::BestFriend => &[
            "Ты мой самый лучший друг!",
            "Не представляю, что бы я без тебя делала!",
        ],
    }
}

fn cooling_phrases(level: RelationshipLevel) -> &'static [&'static str] {
    match level {
        RelationshipLevel::Stranger => &[
            "Мне кажется, мы стали совсем чужими...",
            "Давай начнем сначала...",
        ],
        RelationshipLevel::Acquaintance => &["Что-то мы отдалились друг от друга..."],
        RelationshipLevel::Friend => &["Мне немного грустно, что между нами стало прохладнее..."],
        RelationshipLevel::CloseFriend => &["Я думала, мы ближе..."],
        RelationshipLevel::BestFriend => &["Ты все еще мой лучший друг, но мне обидно..."],
    }
}

/// Paragraph prepended to the reply when the level moves.
pub fn level_phrase<R: Rng + ?Sized>(shift: LevelShift, rng: &mut R) -> &'static str {
    let pool = match shift {
        LevelShift::Up(level) => warm_phrases(level),
        LevelShift::Down(level) => cooling_phrases(level),
    };
    pool.choose(rng).copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn persona() -> Persona {
        Persona::new(PersonaConfig::default())
    }

    #[test]
    fn display_name_takes_first_word_letters_only() {
        assert_eq!(sanitize_display_name(Some("анна-мария smith")), Some("Аннамария".into()));
        assert_eq!(sanitize_display_name(Some("@ivan_99")), Some("Ivan".into()));
        assert_eq!(sanitize_display_name(Some("ПЁТР")), Some("Пётр".into()));
        assert_eq!(sanitize_display_name(Some("123")), None);
        assert_eq!(sanitize_display_name(Some("   ")), None);
        assert_eq!(sanitize_display_name(None), None);
    }

    #[test]
    fn display_name_falls_back_to_default() {
        let p = persona();
        assert_eq!(p.display_name(Some("42")), "Незнакомец");
        assert_eq!(p.display_name(Some("олег")), "Олег");
    }

    #[test]
    fn display_name_is_stable() {
        let p = persona();
        let first = p.display_name(Some("мария"));
        for _ in 0..10 {
            assert_eq!(p.display_name(Some("мария")), first);
        }
    }

    #[test]
    fn faq_matches_in_order() {
        let p = persona();
        let answer = p.faq_answer("привет, как тебя зовут?").unwrap();
        assert!(answer.contains("Юля"));
        assert!(p.faq_answer("ты бот?").unwrap().starts_with("Нет"));
        assert!(p.faq_answer("расскажи анекдот").is_none());
    }

    #[test]
    fn level_shift_direction() {
        use RelationshipLevel::*;
        assert_eq!(LevelShift::between(Stranger, Acquaintance), Some(LevelShift::Up(Acquaintance)));
        assert_eq!(LevelShift::between(Friend, Acquaintance), Some(LevelShift::Down(Acquaintance)));
        assert_eq!(LevelShift::between(Friend, Friend), None);
    }

    #[test]
    fn level_phrases_differ_by_direction() {
        let mut rng = StdRng::seed_from_u64(1);
        let up = level_phrase(LevelShift::Up(RelationshipLevel::Friend), &mut rng);
        let down = level_phrase(LevelShift::Down(RelationshipLevel::Friend), &mut rng);
        assert!(warm_phrases(RelationshipLevel::Friend).contains(&up));
        assert!(cooling_phrases(RelationshipLevel::Friend).contains(&down));
    }

    #[test]
    fn technical_is_coolest_style() {
        let coolest = StyleTag::ALL
            .iter()
            .map(|s| style_profile(*s).temperature)
            .fold(f32::MAX, f32::min);
        assert_eq!(coolest, style_profile(StyleTag::Technical).temperature);
    }
}
