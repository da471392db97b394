// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Foundation Models completion API.
//!
//! Provides [`YandexClient`] which handles authentication, request
//! construction and mapping of transport failures onto the completion
//! error kinds. Requests are never retried.

use std::time::Duration;

use rapport_core::RapportError;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::debug;

use crate::types::{CompletionBody, CompletionEnvelope};

/// HTTP client for completion API communication.
#[derive(Debug, Clone)]
pub struct YandexClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl YandexClient {
    /// Creates a client that authenticates with `api_key` and gives up after `timeout`.
    pub fn new(api_key: &str, endpoint: String, timeout: Duration) -> Result<Self, RapportError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Api-Key {api_key}")).map_err(|e| {
                RapportError::Config(format!("invalid API key header value: {e}"))
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| RapportError::CompletionTransport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one completion request and returns the parsed envelope.
    pub async fn complete(&self, body: &CompletionBody) -> Result<CompletionEnvelope, RapportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        debug!(status = %status, "completion response received");

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RapportError::CompletionTransport {
                message: format!("API returned {status}: {text}"),
                source: None,
            });
        }

        let text = response.text().await.map_err(|e| self.map_send_error(e))?;
        let envelope: CompletionEnvelope =
            serde_json::from_str(&text).map_err(|e| RapportError::CompletionMalformedResponse {
                message: format!("failed to parse API response: {e}"),
            })?;

        if envelope.first_text().is_none() {
            return Err(RapportError::CompletionMalformedResponse {
                message: "no alternatives in response".to_string(),
            });
        }
        Ok(envelope)
    }

    fn map_send_error(&self, e: reqwest::Error) -> RapportError {
        if e.is_timeout() {
            RapportError::CompletionTimeout {
                duration: self.timeout,
            }
        } else {
            RapportError::CompletionTransport {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            }
        }
    }
}
