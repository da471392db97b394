// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde cannot express: probability ranges,
//! non-zero capacities, and the presence of the secrets `serve` needs.

use crate::diagnostic::ConfigError;
use crate::model::RapportConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first.
pub fn validate_config(config: &RapportConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(invalid("storage.database_path must not be empty"));
    }

    if config.cache.capacity == 0 {
        errors.push(invalid("cache.capacity must be greater than 0"));
    }
    if config.cache.ttl_secs == 0 {
        errors.push(invalid("cache.ttl_secs must be greater than 0"));
    }
    if config.cache.prefix_chars == 0 {
        errors.push(invalid("cache.prefix_chars must be greater than 0"));
    }

    if config.context.history_limit == 0 {
        errors.push(invalid("context.history_limit must be greater than 0"));
    }
    if config.context.sweep_interval_secs == 0 {
        errors.push(invalid("context.sweep_interval_secs must be greater than 0"));
    }

    if config.completion.timeout_secs == 0 {
        errors.push(invalid("completion.timeout_secs must be greater than 0"));
    }
    if config.completion.max_concurrent == 0 {
        errors.push(invalid("completion.max_concurrent must be greater than 0"));
    }

    if config.moderation.block_threshold <= config.moderation.warning_threshold {
        errors.push(invalid(format!(
            "moderation.block_threshold ({}) must be greater than moderation.warning_threshold ({})",
            config.moderation.block_threshold, config.moderation.warning_threshold
        )));
    }

    let enrichment = &config.enrichment;
    if enrichment.name_probabilities.len() != 5 {
        errors.push(invalid(format!(
            "enrichment.name_probabilities must list one value per relationship level (5), got {}",
            enrichment.name_probabilities.len()
        )));
    }
    for (i, p) in enrichment.name_probabilities.iter().enumerate() {
        check_probability(&mut errors, &format!("enrichment.name_probabilities[{i}]"), *p);
    }

    let probabilities = [
        ("extraction.noun_sample_probability", config.extraction.noun_sample_probability),
        ("classifier.mood_fallback_probability", config.classifier.mood_fallback_probability),
        ("classifier.persistence_probability", config.classifier.persistence_probability),
        ("enrichment.reaction_probability", enrichment.reaction_probability),
        ("enrichment.correction_probability", enrichment.correction_probability),
        ("enrichment.typo_probability", enrichment.typo_probability),
        ("enrichment.mood_framing_probability", enrichment.mood_framing_probability),
        ("enrichment.question_probability", enrichment.question_probability),
        ("enrichment.ending_probability", enrichment.ending_probability),
        ("enrichment.emoji_probability", enrichment.emoji_probability),
    ];
    for (key, p) in probabilities {
        check_probability(&mut errors, key, p);
    }

    if config.typing.min_delay_ms > config.typing.max_delay_ms {
        errors.push(invalid("typing.min_delay_ms must not exceed typing.max_delay_ms"));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Check that the three secrets required to serve traffic are present.
///
/// Missing secrets are fatal at startup; they are not checked by
/// [`validate_config`] so offline commands work without them.
pub fn require_secrets(config: &RapportConfig) -> Result<(), Vec<ConfigError>> {
    let secrets = [
        (
            "telegram.bot_token",
            "RAPPORT_TELEGRAM_BOT_TOKEN",
            config.telegram.bot_token.as_deref(),
        ),
        (
            "completion.api_key",
            "RAPPORT_COMPLETION_API_KEY",
            config.completion.api_key.as_deref(),
        ),
        (
            "completion.folder_id",
            "RAPPORT_COMPLETION_FOLDER_ID",
            config.completion.folder_id.as_deref(),
        ),
    ];

    let errors: Vec<ConfigError> = secrets
        .into_iter()
        .filter(|(_, _, value)| value.is_none_or(|v| v.trim().is_empty()))
        .map(|(key, env_var, _)| ConfigError::MissingKey {
            key: key.to_string(),
            env_var: Some(env_var.to_string()),
        })
        .collect();

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn check_probability(errors: &mut Vec<ConfigError>, key: &str, p: f64) {
    if !(0.0..=1.0).contains(&p) {
        errors.push(invalid(format!("{key} must be within [0, 1], got {p}")));
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        message: message.into(),
    }
}
