// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `/etc/rapport/rapport.toml` < `~/.config/rapport/rapport.toml`
//! < `./rapport.toml` < legacy env vars < `RAPPORT_*` env vars.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::RapportConfig;

/// Section names recognized in `RAPPORT_<SECTION>_<KEY>` variables.
const SECTIONS: &[&str] = &[
    "agent",
    "persona",
    "telegram",
    "completion",
    "storage",
    "cache",
    "context",
    "extraction",
    "classifier",
    "scoring",
    "moderation",
    "enrichment",
    "typing",
];

/// Un-prefixed variables accepted for the three required secrets.
const LEGACY_SECRETS: &[(&str, &str)] = &[
    ("telegram_bot_token", "telegram.bot_token"),
    ("yandex_api_key", "completion.api_key"),
    ("yandex_folder_id", "completion.folder_id"),
];

/// System-wide config path.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/rapport/rapport.toml";

/// Config path in the working directory.
pub const LOCAL_CONFIG_PATH: &str = "rapport.toml";

/// Per-user config path under the XDG config dir, if one exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("rapport/rapport.toml"))
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<RapportConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<RapportConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RapportConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RapportConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RapportConfig::default()))
        .merge(Toml::file(path))
        .merge(legacy_env_provider())
        .merge(env_provider())
        .extract()
}

/// Build the full Figment before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(RapportConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(legacy_env_provider())
        .merge(env_provider())
}

/// Maps a lowercased, prefix-stripped env key to its dotted config path.
///
/// Uses the known section list rather than `Env::split("_")` because keys
/// themselves contain underscores: `completion_folder_id` must become
/// `completion.folder_id`, not `completion.folder.id`.
pub fn map_env_key(key: &str) -> String {
    SECTIONS
        .iter()
        .find_map(|section| {
            key.strip_prefix(section)
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|field| format!("{section}.{field}"))
        })
        .unwrap_or_else(|| key.to_string())
}

fn env_provider() -> Env {
    Env::prefixed("RAPPORT_").map(|key| map_env_key(&key.as_str().to_ascii_lowercase()).into())
}

fn legacy_env_provider() -> Env {
    let names: Vec<&str> = LEGACY_SECRETS.iter().map(|(env, _)| *env).collect();
    Env::raw().only(&names).map(|key| {
        let lowered = key.as_str().to_ascii_lowercase();
        LEGACY_SECRETS
            .iter()
            .find(|(env, _)| *env == lowered)
            .map(|(_, path)| path.to_string())
            .unwrap_or(lowered)
            .into()
    })
}
