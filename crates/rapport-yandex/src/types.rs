// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Foundation Models completion API request/response types.

use serde::{Deserialize, Serialize};

// --- Request types ---

/// A request to the completion endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionBody {
    /// `gpt://{folder}/{model}`.
    pub model_uri: String,
    pub completion_options: CompletionOptions,
    pub messages: Vec<ApiMessage>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOptions {
    pub stream: bool,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// A single message. The API calls the content field `text`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiMessage {
    pub role: String,
    pub text: String,
}

impl ApiMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            text: text.into(),
        }
    }
}

// --- Response types ---

/// Top-level response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionEnvelope {
    pub result: CompletionResult,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResult {
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
    #[serde(default)]
    pub model_version: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Alternative {
    pub message: ApiMessage,
    #[serde(default)]
    pub status: Option<String>,
}

impl CompletionEnvelope {
    /// Text of the first alternative, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.result
            .alternatives
            .first()
            .map(|alt| alt.message.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_with_camel_case_keys() {
        let body = CompletionBody {
            model_uri: "gpt://folder/yandexgpt-lite".to_string(),
            completion_options: CompletionOptions {
                stream: false,
                temperature: 0.6,
                max_tokens: 400,
            },
            messages: vec![ApiMessage::system("bio"), ApiMessage::user("привет")],
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["modelUri"], "gpt://folder/yandexgpt-lite");
        assert_eq!(json["completionOptions"]["stream"], false);
        assert_eq!(json["completionOptions"]["maxTokens"], 400);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["text"], "привет");
    }

    #[test]
    fn response_reads_first_alternative() {
        let raw = r#"{
            "result": {
                "alternatives": [
                    {"message": {"role": "assistant", "text": "Привет!"}, "status": "ALTERNATIVE_STATUS_FINAL"}
                ],
                "usage": {"inputTextTokens": "10", "completionTokens": "2", "totalTokens": "12"},
                "modelVersion": "23.10.2024"
            }
        }"#;
        let envelope: CompletionEnvelope = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.first_text(), Some("Привет!"));
        assert_eq!(envelope.result.model_version.as_deref(), Some("23.10.2024"));
    }

    #[test]
    fn empty_alternatives_yield_no_text() {
        let envelope: CompletionEnvelope =
            serde_json::from_str(r#"{"result": {"alternatives": []}}"#).unwrap();
        assert_eq!(envelope.first_text(), None);
    }
}
