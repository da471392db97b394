// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Slash commands over the relationship query surface.

use rapport_persona::persona::level_description;

use crate::stats::RelationshipStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Stats,
    ResetMat,
    About,
    Relationship,
}

impl Command {
    /// Parses `/name` or `/name@bot`. Arguments after the name are ignored.
    pub fn parse(text: &str) -> Option<Self> {
        let name = text.trim().strip_prefix('/')?.split_whitespace().next()?;
        let name = name.split('@').next().unwrap_or(name).to_lowercase();
        match name.as_str() {
            "stats" => Some(Command::Stats),
            "reset_mat" => Some(Command::ResetMat),
            "about" | "julia" | "юля" | "info" => Some(Command::About),
            "relationship" | "отношения" | "уровень" => Some(Command::Relationship),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Command::Stats => "stats",
            Command::ResetMat => "reset_mat",
            Command::About => "about",
            Command::Relationship => "relationship",
        }
    }
}

/// Where an inbound text goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Command(Command),
    Turn,
    Ignore,
}

/// Routes a message: commands to the command layer, anything longer than
/// one character to the turn pipeline, the rest nowhere.
pub fn route(text: &str) -> Route {
    let trimmed = text.trim();
    if trimmed.starts_with('/') {
        return Command::parse(trimmed).map_or(Route::Ignore, Route::Command);
    }
    if trimmed.chars().count() > 1 {
        Route::Turn
    } else {
        Route::Ignore
    }
}

pub fn render_stats(stats: &RelationshipStats) -> String {
    let style = stats
        .last_style
        .map(|s| s.to_string())
        .unwrap_or_else(|| "нет".to_string());
    format!(
        "📊 Статистика нашей беседы:\n\
         • Сообщений: {}\n\
         • Уровень отношений: {}\n\
         • Счет отношений: {}\n\
         • Уровень доверия: {:.1}%\n\
         • Положительных взаимодействий: {}\n\
         • Отрицательных взаимодействий: {}\n\
         • Обид: {}\n\
         • Стиль: {}\n\
         • Настроение: {}",
        stats.messages_count,
        stats.level,
        stats.score,
        stats.trust,
        stats.positive_interactions,
        stats.negative_interactions,
        stats.offense_count,
        style,
        stats.mood,
    )
}

pub fn render_relationship(stats: &RelationshipStats) -> String {
    format!(
        "💞 Уровень наших отношений: {}\n{}\n\n\
         📈 Прогресс: {} очков\n\
         🤝 Доверие: {:.1}%\n\n\
         Положительных взаимодействий: {}\n\
         Отрицательных: {}",
        stats.level,
        level_description(stats.level),
        stats.score,
        stats.trust,
        stats.positive_interactions,
        stats.negative_interactions,
    )
}

pub fn reset_reply(had_offenses: bool) -> &'static str {
    if had_offenses {
        "Счетчик матерных слов и обид сброшен. Давай общаться культурно!"
    } else {
        "У тебя и так чистая история общения! 👍"
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rapport_core::{RelationshipLevel, UserContext, UserId};

    use super::*;

    #[test]
    fn parses_aliases_and_bot_suffix() {
        assert_eq!(Command::parse("/stats"), Some(Command::Stats));
        assert_eq!(Command::parse("/stats@julia_bot"), Some(Command::Stats));
        assert_eq!(Command::parse("/Юля"), Some(Command::About));
        assert_eq!(Command::parse("/info"), Some(Command::About));
        assert_eq!(Command::parse("/уровень"), Some(Command::Relationship));
        assert_eq!(Command::parse("/reset_mat please"), Some(Command::ResetMat));
        assert_eq!(Command::parse("/start"), None);
        assert_eq!(Command::parse("stats"), None);
    }

    #[test]
    fn routes_messages() {
        assert_eq!(route("/stats"), Route::Command(Command::Stats));
        assert_eq!(route("/unknown"), Route::Ignore);
        assert_eq!(route("привет"), Route::Turn);
        assert_eq!(route("ок"), Route::Turn);
        assert_eq!(route(" а "), Route::Ignore);
        assert_eq!(route(""), Route::Ignore);
    }

    #[test]
    fn renders_relationship_view() {
        let mut ctx = UserContext::new(UserId(1), Utc::now());
        ctx.relationship_score = 64;
        ctx.messages_count = 10;
        ctx.positive_interactions = 9;
        let stats = RelationshipStats::from(&ctx);
        assert_eq!(stats.level, RelationshipLevel::CloseFriend);

        let text = render_relationship(&stats);
        assert!(text.contains("CLOSE_FRIEND"));
        assert!(text.contains("Мы близкие друзья"));
        assert!(text.contains("64 очков"));
        assert!(text.contains("90.0%"));
    }

    #[test]
    fn renders_stats_view() {
        let ctx = UserContext::new(UserId(1), Utc::now());
        let text = render_stats(&RelationshipStats::from(&ctx));
        assert!(text.contains("Сообщений: 0"));
        assert!(text.contains("STRANGER"));
        assert!(text.contains("Стиль: нет"));
        assert!(text.contains("Настроение: neutral"));
    }
}
