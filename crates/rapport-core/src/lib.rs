// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the rapport conversational engine.
//!
//! This crate provides the foundational trait definitions, error types, and
//! the per-user state model shared by every other crate in the workspace.

pub mod context;
pub mod error;
pub mod traits;
pub mod types;

pub use context::{NameUsage, Turn, UserContext, UserInfo};
pub use error::RapportError;
pub use types::{
    AdapterType, ChatId, CompletionRequest, CompletionResponse, HealthStatus, InboundMessage,
    MessageId, Mood, OutboundMessage, RelationshipLevel, StyleTag, UserId,
};

pub use traits::{ChannelAdapter, CompletionAdapter, PluginAdapter, StorageAdapter};

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn completion_failures_are_grouped() {
        let timeout = RapportError::CompletionTimeout {
            duration: std::time::Duration::from_secs(10),
        };
        let transport = RapportError::CompletionTransport {
            message: "connection refused".into(),
            source: None,
        };
        let malformed = RapportError::CompletionMalformedResponse {
            message: "no alternatives".into(),
        };
        assert!(timeout.is_completion_failure());
        assert!(transport.is_completion_failure());
        assert!(malformed.is_completion_failure());

        let persistence = RapportError::persistence(
            "save failed",
            RapportError::Storage {
                source: Box::new(std::io::Error::other("disk full")),
            },
        );
        assert!(!persistence.is_completion_failure());
        assert!(!RapportError::DuplicateProcessInstance("conflict".into()).is_completion_failure());
    }

    #[test]
    fn level_thresholds() {
        assert_eq!(RelationshipLevel::from_score(-50), RelationshipLevel::Stranger);
        assert_eq!(RelationshipLevel::from_score(0), RelationshipLevel::Stranger);
        assert_eq!(RelationshipLevel::from_score(9), RelationshipLevel::Stranger);
        assert_eq!(RelationshipLevel::from_score(10), RelationshipLevel::Acquaintance);
        assert_eq!(RelationshipLevel::from_score(30), RelationshipLevel::Friend);
        assert_eq!(RelationshipLevel::from_score(59), RelationshipLevel::Friend);
        assert_eq!(RelationshipLevel::from_score(60), RelationshipLevel::CloseFriend);
        assert_eq!(RelationshipLevel::from_score(100), RelationshipLevel::BestFriend);
        assert_eq!(RelationshipLevel::from_score(i64::MAX), RelationshipLevel::BestFriend);
    }

    #[test]
    fn level_display_matches_wire_names() {
        assert_eq!(RelationshipLevel::CloseFriend.to_string(), "CLOSE_FRIEND");
        assert_eq!(
            RelationshipLevel::from_str("BEST_FRIEND").unwrap(),
            RelationshipLevel::BestFriend
        );
    }

    #[test]
    fn style_tags_parse_back() {
        for style in StyleTag::ALL {
            let parsed = StyleTag::from_str(&style.to_string()).expect("should parse back");
            assert_eq!(style, parsed);
        }
        assert!(StyleTag::Angry.is_hostile());
        assert!(!StyleTag::Friendly.is_hostile());
    }

    #[test]
    fn adapter_type_serialization() {
        let completion = AdapterType::Completion;
        let json = serde_json::to_string(&completion).expect("should serialize");
        let parsed: AdapterType = serde_json::from_str(&json).expect("should deserialize");
        assert_eq!(completion, parsed);
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_channel_adapter<T: ChannelAdapter>() {}
        fn _assert_completion_adapter<T: CompletionAdapter>() {}
        fn _assert_storage_adapter<T: StorageAdapter>() {}
    }

    proptest! {
        #[test]
        fn level_is_monotonic_in_score(a in -1_000i64..1_000, b in -1_000i64..1_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(RelationshipLevel::from_score(lo) <= RelationshipLevel::from_score(hi));
        }

        #[test]
        fn trust_stays_in_range(messages in 0u64..10_000, positive_share in 0.0f64..=1.0) {
            let mut ctx = UserContext::new(UserId(1), chrono::Utc::now());
            ctx.messages_count = messages;
            ctx.positive_interactions = (messages as f64 * positive_share) as u64;
            let trust = ctx.trust_level();
            prop_assert!((0.0..=100.0).contains(&trust));
            if messages == 0 {
                prop_assert_eq!(trust, 0.0);
            }
        }
    }
}
