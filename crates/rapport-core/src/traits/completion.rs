// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion adapter trait for hosted language models.

use async_trait::async_trait;

use crate::error::RapportError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{CompletionRequest, CompletionResponse};

/// Adapter for a single-shot text completion endpoint.
///
/// Implementations report failures through the `Completion*` variants of
/// [`RapportError`] so the engine can map them to fallback replies.
#[async_trait]
pub trait CompletionAdapter: PluginAdapter {
    /// Sends a request and returns the generated text.
    async fn complete(&self, request: CompletionRequest)
    -> Result<CompletionResponse, RapportError>;
}
