// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported at startup instead of silently falling back to a default.

use serde::{Deserialize, Serialize};

/// Top-level configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RapportConfig {
    #[serde(default)]
    pub agent: AgentConfig,

    /// Biography of the persona, used in prompts and the `/about` reply.
    #[serde(default)]
    pub persona: PersonaConfig,

    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Hosted completion endpoint settings.
    #[serde(default)]
    pub completion: CompletionConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    /// Per-user context lifecycle.
    #[serde(default)]
    pub context: ContextConfig,

    #[serde(default)]
    pub extraction: ExtractionConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub moderation: ModerationConfig,

    /// Probabilities of the reply enrichment stages.
    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    /// Simulated typing delay before replies are delivered.
    #[serde(default)]
    pub typing: TypingConfig,
}

/// Process-level settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Seed for the engine RNG. `None` seeds from OS entropy.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            rng_seed: None,
        }
    }
}

fn default_agent_name() -> String {
    "rapport".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// The persona's biography.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PersonaConfig {
    #[serde(default = "default_persona_name")]
    pub name: String,
    #[serde(default = "default_full_name")]
    pub full_name: String,
    #[serde(default = "default_age")]
    pub age: u32,
    #[serde(default = "default_city")]
    pub city: String,
    #[serde(default = "default_profession")]
    pub profession: String,
    #[serde(default = "default_education")]
    pub education: String,
    #[serde(default = "default_hobbies")]
    pub hobbies: Vec<String>,
    #[serde(default = "default_pets")]
    pub pets: String,
    #[serde(default = "default_favorite_music")]
    pub favorite_music: String,
    #[serde(default = "default_favorite_food")]
    pub favorite_food: String,

    /// Name used for users whose transport name yields nothing usable.
    #[serde(default = "default_user_name")]
    pub default_user_name: String,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            name: default_persona_name(),
            full_name: default_full_name(),
            age: default_age(),
            city: default_city(),
            profession: default_profession(),
            education: default_education(),
            hobbies: default_hobbies(),
            pets: default_pets(),
            favorite_music: default_favorite_music(),
            favorite_food: default_favorite_food(),
            default_user_name: default_user_name(),
        }
    }
}

fn default_persona_name() -> String {
    "Юля".to_string()
}

fn default_full_name() -> String {
    "Юлия Смирнова".to_string()
}

fn default_age() -> u32 {
    25
}

fn default_city() -> String {
    "Санкт-Петербург".to_string()
}

fn default_profession() -> String {
    "графический дизайнер".to_string()
}

fn default_education() -> String {
    "СПбГУ, факультет искусств".to_string()
}

fn default_hobbies() -> Vec<String> {
    ["рисование", "фотография", "йога", "путешествия"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_pets() -> String {
    "кот Барсик".to_string()
}

fn default_favorite_music() -> String {
    "инди-рок и джаз".to_string()
}

fn default_favorite_food() -> String {
    "паста и роллы".to_string()
}

fn default_user_name() -> String {
    "Незнакомец".to_string()
}

/// Telegram transport settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Bot API token. Required by `serve`.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Capacity of the inbound message queue between polling and the engine.
    #[serde(default = "default_inbound_capacity")]
    pub inbound_capacity: usize,

    /// Discard updates queued while the bot was offline.
    #[serde(default = "default_drop_pending_updates")]
    pub drop_pending_updates: bool,

    /// Bot API base URL, for a self-hosted Bot API server.
    #[serde(default)]
    pub api_url: Option<String>,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            inbound_capacity: default_inbound_capacity(),
            drop_pending_updates: default_drop_pending_updates(),
            api_url: None,
        }
    }
}

fn default_inbound_capacity() -> usize {
    100
}

fn default_drop_pending_updates() -> bool {
    true
}

/// Completion endpoint settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CompletionConfig {
    /// API key sent as `Authorization: Api-Key ...`. Required by `serve`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Cloud folder that owns the model. Required by `serve`.
    #[serde(default)]
    pub folder_id: Option<String>,

    #[serde(default = "default_completion_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_completion_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Deadline for one completion call, after which the fallback reply is used.
    #[serde(default = "default_completion_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of completion calls in flight across all users.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// User text longer than this is truncated before it is sent.
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            folder_id: None,
            endpoint: default_completion_endpoint(),
            model: default_completion_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_completion_timeout_secs(),
            max_concurrent: default_max_concurrent(),
            max_input_chars: default_max_input_chars(),
        }
    }
}

fn default_completion_endpoint() -> String {
    "https://llm.api.cloud.yandex.net/foundationModels/v1/completion".to_string()
}

fn default_completion_model() -> String {
    "yandexgpt-lite".to_string()
}

fn default_max_tokens() -> u32 {
    400
}

fn default_completion_timeout_secs() -> u64 {
    10
}

fn default_max_concurrent() -> usize {
    16
}

fn default_max_input_chars() -> usize {
    500
}

/// Storage backend settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("rapport").join("rapport.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("rapport.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Response cache settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,

    /// Entry count above which the oldest entry is evicted.
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,

    /// Number of normalized message characters included in the fingerprint.
    #[serde(default = "default_prefix_chars")]
    pub prefix_chars: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl_secs(),
            capacity: default_cache_capacity(),
            prefix_chars: default_prefix_chars(),
        }
    }
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_cache_capacity() -> usize {
    400
}

fn default_prefix_chars() -> usize {
    50
}

/// Per-user context lifecycle settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ContextConfig {
    /// Number of turns kept in a user's history.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Number of recent turns quoted in the system prompt.
    #[serde(default = "default_prompt_history_turns")]
    pub prompt_history_turns: usize,

    /// Inactivity after which a context is swept.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            prompt_history_turns: default_prompt_history_turns(),
            idle_timeout_secs: default_idle_timeout_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_history_limit() -> usize {
    10
}

fn default_prompt_history_turns() -> usize {
    3
}

fn default_idle_timeout_secs() -> u64 {
    24 * 60 * 60
}

fn default_sweep_interval_secs() -> u64 {
    60 * 60
}

/// Entity extraction settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractionConfig {
    /// Chance that each generic noun in a message is stored as an interest.
    #[serde(default = "default_noun_sample_probability")]
    pub noun_sample_probability: f64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            noun_sample_probability: default_noun_sample_probability(),
        }
    }
}

fn default_noun_sample_probability() -> f64 {
    0.3
}

/// Style classifier fallback probabilities.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Chance that a positive/negative mood picks friendly/caring when no trigger matched.
    #[serde(default = "default_mood_fallback_probability")]
    pub mood_fallback_probability: f64,

    /// Chance of reusing the previous turn's style when nothing else matched.
    #[serde(default = "default_persistence_probability")]
    pub persistence_probability: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            mood_fallback_probability: default_mood_fallback_probability(),
            persistence_probability: default_persistence_probability(),
        }
    }
}

fn default_mood_fallback_probability() -> f64 {
    0.7
}

fn default_persistence_probability() -> f64 {
    0.3
}

/// Relationship scoring weights.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Points every message earns before modifiers.
    #[serde(default = "default_base_points")]
    pub base_points: i64,

    /// Points per positive keyword hit.
    #[serde(default = "default_positive_bonus")]
    pub positive_bonus: i64,

    /// Points removed per negative or profane keyword hit.
    #[serde(default = "default_negative_penalty")]
    pub negative_penalty: i64,

    /// Lowest score a user can fall to.
    #[serde(default = "default_score_floor")]
    pub score_floor: Option<i64>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_points: default_base_points(),
            positive_bonus: default_positive_bonus(),
            negative_penalty: default_negative_penalty(),
            score_floor: default_score_floor(),
        }
    }
}

fn default_base_points() -> i64 {
    1
}

fn default_positive_bonus() -> i64 {
    2
}

fn default_negative_penalty() -> i64 {
    3
}

fn default_score_floor() -> Option<i64> {
    Some(0)
}

/// Profanity escalation thresholds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModerationConfig {
    /// `mat_count` at which the final warning is sent.
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold: u32,

    /// `mat_count` from which the blocking reply is sent.
    #[serde(default = "default_block_threshold")]
    pub block_threshold: u32,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            warning_threshold: default_warning_threshold(),
            block_threshold: default_block_threshold(),
        }
    }
}

fn default_warning_threshold() -> u32 {
    2
}

fn default_block_threshold() -> u32 {
    3
}

/// Probabilities of the enrichment stages.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EnrichmentConfig {
    /// Name insertion chance per relationship level, stranger to best friend.
    #[serde(default = "default_name_probabilities")]
    pub name_probabilities: Vec<f64>,

    /// Window after a name insertion during which the chance is halved.
    #[serde(default = "default_name_cooldown_secs")]
    pub name_cooldown_secs: u64,

    #[serde(default = "default_reaction_probability")]
    pub reaction_probability: f64,

    #[serde(default = "default_correction_probability")]
    pub correction_probability: f64,

    #[serde(default = "default_typo_probability")]
    pub typo_probability: f64,

    #[serde(default = "default_mood_framing_probability")]
    pub mood_framing_probability: f64,

    #[serde(default = "default_question_probability")]
    pub question_probability: f64,

    /// Conversations shallower than this ask follow-up questions half as often.
    #[serde(default = "default_shallow_depth")]
    pub shallow_depth: u64,

    #[serde(default = "default_ending_probability")]
    pub ending_probability: f64,

    #[serde(default = "default_emoji_probability")]
    pub emoji_probability: f64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            name_probabilities: default_name_probabilities(),
            name_cooldown_secs: default_name_cooldown_secs(),
            reaction_probability: default_reaction_probability(),
            correction_probability: default_correction_probability(),
            typo_probability: default_typo_probability(),
            mood_framing_probability: default_mood_framing_probability(),
            question_probability: default_question_probability(),
            shallow_depth: default_shallow_depth(),
            ending_probability: default_ending_probability(),
            emoji_probability: default_emoji_probability(),
        }
    }
}

impl EnrichmentConfig {
    /// Every stage disabled. Used by tests that need verbatim completions.
    pub fn disabled() -> Self {
        Self {
            name_probabilities: vec![0.0; 5],
            reaction_probability: 0.0,
            correction_probability: 0.0,
            typo_probability: 0.0,
            mood_framing_probability: 0.0,
            question_probability: 0.0,
            ending_probability: 0.0,
            emoji_probability: 0.0,
            ..Self::default()
        }
    }
}

fn default_name_probabilities() -> Vec<f64> {
    vec![0.1, 0.2, 0.4, 0.6, 0.8]
}

fn default_name_cooldown_secs() -> u64 {
    120
}

fn default_reaction_probability() -> f64 {
    0.3
}

fn default_correction_probability() -> f64 {
    0.15
}

fn default_typo_probability() -> f64 {
    0.08
}

fn default_mood_framing_probability() -> f64 {
    0.4
}

fn default_question_probability() -> f64 {
    0.3
}

fn default_shallow_depth() -> u64 {
    3
}

fn default_ending_probability() -> f64 {
    0.2
}

fn default_emoji_probability() -> f64 {
    0.6
}

/// Simulated typing delay.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TypingConfig {
    #[serde(default = "default_typing_enabled")]
    pub enabled: bool,

    #[serde(default = "default_per_char_ms")]
    pub per_char_ms: u64,

    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            enabled: default_typing_enabled(),
            per_char_ms: default_per_char_ms(),
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_typing_enabled() -> bool {
    true
}

fn default_per_char_ms() -> u64 {
    30
}

fn default_min_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    4000
}
