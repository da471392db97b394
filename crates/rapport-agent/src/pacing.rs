// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Human-like delay before a reply is delivered.

use std::time::Duration;

use rapport_config::model::TypingConfig;

/// Delay proportional to the reply length, clamped to the configured
/// bounds. `None` when pacing is disabled.
pub fn typing_delay(text: &str, config: &TypingConfig) -> Option<Duration> {
    if !config.enabled {
        return None;
    }
    let chars = text.chars().count() as u64;
    let ms = chars
        .saturating_mul(config.per_char_ms)
        .clamp(config.min_delay_ms, config.max_delay_ms.max(config.min_delay_ms));
    Some(Duration::from_millis(ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TypingConfig {
        TypingConfig {
            enabled: true,
            per_char_ms: 30,
            min_delay_ms: 500,
            max_delay_ms: 4000,
        }
    }

    #[test]
    fn scales_with_length_within_bounds() {
        assert_eq!(typing_delay("ок", &config()), Some(Duration::from_millis(500)));
        assert_eq!(
            typing_delay(&"а".repeat(50), &config()),
            Some(Duration::from_millis(1500))
        );
        assert_eq!(
            typing_delay(&"а".repeat(1000), &config()),
            Some(Duration::from_millis(4000))
        );
    }

    #[test]
    fn disabled_means_no_delay() {
        let config = TypingConfig {
            enabled: false,
            ..config()
        };
        assert_eq!(typing_delay("привет", &config), None);
    }
}
