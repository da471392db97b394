// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion of Telegram updates into channel-agnostic messages.
//!
//! Only plain text messages with a known sender are forwarded. Stickers,
//! media and channel posts are dropped here.

use rapport_core::{ChatId, InboundMessage, MessageId, UserId};
use teloxide::types::{Message, User};

/// Raw display name for a sender: first name, else last name, else
/// username without the `@`.
pub fn display_name_hint(user: &User) -> Option<String> {
    let candidates = [
        Some(user.first_name.as_str()),
        user.last_name.as_deref(),
        user.username.as_deref().map(|u| u.trim_start_matches('@')),
    ];
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !name.is_empty())
        .map(str::to_string)
}

/// Converts a Telegram message into an [`InboundMessage`].
///
/// Returns `None` for non-text messages and messages without a sender.
pub fn to_inbound_message(msg: &Message) -> Option<InboundMessage> {
    let text = msg.text()?;
    let user = msg.from.as_ref()?;

    Some(InboundMessage {
        id: MessageId(msg.id.0.to_string()),
        user_id: UserId(user.id.0 as i64),
        chat_id: ChatId(msg.chat.id.0),
        text: text.to_string(),
        display_name_hint: display_name_hint(user),
        received_at: msg.date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(from: serde_json::Value, extra: serde_json::Value) -> Message {
        let mut json = serde_json::json!({
            "message_id": 7,
            "date": 1700000000i64,
            "chat": {
                "id": 555i64,
                "type": "private",
                "first_name": "Test",
            },
            "from": from,
        });
        if let (Some(obj), Some(extra)) = (json.as_object_mut(), extra.as_object()) {
            for (k, v) in extra {
                obj.insert(k.clone(), v.clone());
            }
        }
        serde_json::from_value(json).expect("failed to deserialize mock message")
    }

    fn user(first: &str, last: Option<&str>, username: Option<&str>) -> serde_json::Value {
        let mut u = serde_json::json!({
            "id": 12345u64,
            "is_bot": false,
            "first_name": first,
        });
        if let Some(last) = last {
            u["last_name"] = last.into();
        }
        if let Some(username) = username {
            u["username"] = username.into();
        }
        u
    }

    #[test]
    fn text_message_maps_fields() {
        let msg = message(
            user("Анна", None, None),
            serde_json::json!({"text": "привет"}),
        );
        let inbound = to_inbound_message(&msg).unwrap();

        assert_eq!(inbound.id, MessageId("7".into()));
        assert_eq!(inbound.user_id, UserId(12345));
        assert_eq!(inbound.chat_id, ChatId(555));
        assert_eq!(inbound.text, "привет");
        assert_eq!(inbound.display_name_hint.as_deref(), Some("Анна"));
        assert_eq!(inbound.received_at.timestamp(), 1700000000);
    }

    #[test]
    fn non_text_message_is_dropped() {
        let msg = message(
            user("Анна", None, None),
            serde_json::json!({"location": {"latitude": 55.79, "longitude": 49.12}}),
        );
        assert!(to_inbound_message(&msg).is_none());
    }

    #[test]
    fn hint_falls_back_to_last_name_then_username() {
        let msg = message(
            user("", Some("Петрова"), Some("anna_p")),
            serde_json::json!({"text": "hi"}),
        );
        assert_eq!(
            display_name_hint(msg.from.as_ref().unwrap()).as_deref(),
            Some("Петрова")
        );

        let msg = message(user("", None, Some("anna_p")), serde_json::json!({"text": "hi"}));
        assert_eq!(
            display_name_hint(msg.from.as_ref().unwrap()).as_deref(),
            Some("anna_p")
        );
    }

    #[test]
    fn hint_is_none_without_any_name() {
        let msg = message(user(" ", None, None), serde_json::json!({"text": "hi"}));
        assert_eq!(display_name_hint(msg.from.as_ref().unwrap()), None);
    }
}
