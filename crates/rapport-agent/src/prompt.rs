// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! System prompt assembly for the completion service.

use std::fmt::Write as _;

use rapport_config::model::{CompletionConfig, ContextConfig};
use rapport_core::{CompletionRequest, Mood, StyleTag, UserContext};
use rapport_persona::Persona;
use rapport_persona::lexicon;
use rapport_persona::persona::{relationship_modifier, style_profile};

/// How many entries per `user_info` key make it into the prompt.
const INFO_ITEMS_PER_KEY: usize = 3;

pub struct PromptBuilder {
    persona: Persona,
    history_turns: usize,
    max_input_chars: usize,
    max_tokens: u32,
}

impl PromptBuilder {
    pub fn new(persona: Persona, context: &ContextConfig, completion: &CompletionConfig) -> Self {
        Self {
            persona,
            history_turns: context.prompt_history_turns,
            max_input_chars: completion.max_input_chars,
            max_tokens: completion.max_tokens,
        }
    }

    /// Builds the request for one turn from the already-updated context.
    pub fn build(&self, user_text: &str, style: StyleTag, ctx: &UserContext) -> CompletionRequest {
        let profile = style_profile(style);
        let level = ctx.relationship_level();

        let mut prompt = self.persona.bio();
        prompt.push_str("\n\n");
        prompt.push_str(profile.instruction);
        prompt.push('\n');
        prompt.push_str(relationship_modifier(level));

        let skip = ctx.history.len().saturating_sub(self.history_turns);
        let recent: Vec<_> = ctx.history.iter().skip(skip).collect();
        if !recent.is_empty() {
            prompt.push_str("\n\nПредыдущие сообщения:");
            for turn in recent {
                let _ = write!(prompt, "\nПользователь: {}\nТы: {}", turn.user_text, turn.bot_text);
            }
        }

        let mut facts = Vec::new();
        if !ctx.user_info.interests.is_empty() {
            facts.push(format!("интересы: {}", first_items(&ctx.user_info.interests)));
        }
        if !ctx.user_info.places.is_empty() {
            facts.push(format!("места: {}", first_items(&ctx.user_info.places)));
        }
        if !facts.is_empty() {
            let _ = write!(prompt, "\n\nЧто известно о собеседнике: {}.", facts.join("; "));
        }

        let _ = write!(
            prompt,
            "\n\nНастроение собеседника: {}. Уровень отношений: {}. Доверие: {:.1}%.",
            mood_label(ctx.mood),
            level,
            ctx.trust_level()
        );
        if ctx.offense_count > 0 {
            let _ = write!(prompt, " Собеседник грубил тебе {} раз(а).", ctx.offense_count);
        }
        if let Some(name) = &ctx.display_name {
            let _ = write!(prompt, "\nСобеседника зовут {name}.");
            if !ctx.first_interaction {
                prompt.push_str(" Имя пользователя уже известно, не спрашивай его снова.");
            }
        }
        prompt.push_str("\n\nОтветь естественно.");

        CompletionRequest {
            system_prompt: prompt,
            user_text: self.user_text(user_text),
            temperature: profile.temperature,
            max_tokens: self.max_tokens,
        }
    }

    /// Slang-normalized user text, cut to the input limit.
    fn user_text(&self, text: &str) -> String {
        lexicon::normalize_slang(text.trim())
            .chars()
            .take(self.max_input_chars)
            .collect()
    }
}

fn first_items(items: &std::collections::BTreeSet<String>) -> String {
    items
        .iter()
        .take(INFO_ITEMS_PER_KEY)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn mood_label(mood: Mood) -> &'static str {
    match mood {
        Mood::Positive => "позитивное",
        Mood::Negative => "негативное",
        Mood::Neutral => "нейтральное",
    }
}
