// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! YandexGPT completion adapter for rapport.
//!
//! This crate implements [`CompletionAdapter`] for the Foundation Models
//! completion endpoint: one system message, one user message, no streaming.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use rapport_config::model::CompletionConfig;
use rapport_core::{
    AdapterType, CompletionAdapter, CompletionRequest, CompletionResponse, HealthStatus,
    PluginAdapter, RapportError,
};
use tracing::{debug, info};

use crate::client::YandexClient;
use crate::types::{ApiMessage, CompletionBody, CompletionOptions};

/// Completion adapter backed by the YandexGPT API.
pub struct YandexCompletion {
    client: YandexClient,
    model_uri: String,
    model: String,
}

impl YandexCompletion {
    /// Creates the adapter. Fails when the API key or folder id is missing.
    pub fn new(config: &CompletionConfig) -> Result<Self, RapportError> {
        let api_key = require(&config.api_key, "completion.api_key")?;
        let folder_id = require(&config.folder_id, "completion.folder_id")?;

        let client = YandexClient::new(
            api_key,
            config.endpoint.clone(),
            Duration::from_secs(config.timeout_secs),
        )?;

        info!(model = %config.model, endpoint = %config.endpoint, "completion adapter initialized");
        Ok(Self {
            client,
            model_uri: format!("gpt://{folder_id}/{}", config.model),
            model: config.model.clone(),
        })
    }

    pub fn model_uri(&self) -> &str {
        &self.model_uri
    }

    fn to_body(&self, request: CompletionRequest) -> CompletionBody {
        CompletionBody {
            model_uri: self.model_uri.clone(),
            completion_options: CompletionOptions {
                stream: false,
                temperature: request.temperature,
                max_tokens: request.max_tokens,
            },
            messages: vec![
                ApiMessage::system(request.system_prompt),
                ApiMessage::user(request.user_text),
            ],
        }
    }
}

fn require<'a>(value: &'a Option<String>, key: &str) -> Result<&'a str, RapportError> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(RapportError::Config(format!("{key} is not set"))),
    }
}

#[async_trait]
impl PluginAdapter for YandexCompletion {
    fn name(&self) -> &str {
        "yandex"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Completion
    }

    async fn health_check(&self) -> Result<HealthStatus, RapportError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RapportError> {
        Ok(())
    }
}

#[async_trait]
impl CompletionAdapter for YandexCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, RapportError> {
        let body = self.to_body(request);
        let envelope = self.client.complete(&body).await?;

        let text = envelope.first_text().unwrap_or_default().trim().to_string();
        debug!(chars = text.chars().count(), "completion text received");
        Ok(CompletionResponse {
            text,
            model: envelope
                .result
                .model_version
                .map(|v| format!("{}@{v}", self.model))
                .unwrap_or_else(|| self.model.clone()),
        })
    }
}
