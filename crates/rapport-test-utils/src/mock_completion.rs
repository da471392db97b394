// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock completion adapter for deterministic testing.
//!
//! `MockCompletion` implements `CompletionAdapter` with a FIFO of scripted
//! outcomes and records every request it receives.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use rapport_core::{
    AdapterType, CompletionAdapter, CompletionRequest, CompletionResponse, HealthStatus,
    PluginAdapter, RapportError,
};

/// Reply used when the script is empty.
pub const DEFAULT_REPLY: &str = "Понятно, расскажи подробнее.";

/// One scripted outcome of a `complete` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scripted {
    Reply(String),
    /// Fails with `CompletionTimeout`.
    Timeout,
    /// Fails with `CompletionTransport`.
    Transport,
    /// Fails with `CompletionMalformedResponse`.
    Malformed,
    /// Never answers; the caller's deadline must fire.
    Hang,
}

/// A mock completion service.
///
/// Outcomes are popped from a FIFO queue. When the queue is empty,
/// [`DEFAULT_REPLY`] is returned.
pub struct MockCompletion {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    calls: AtomicUsize,
}

impl MockCompletion {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a mock pre-loaded with plain replies.
    pub fn with_replies<S: Into<String>>(replies: impl IntoIterator<Item = S>) -> Self {
        let script = replies.into_iter().map(|r| Scripted::Reply(r.into())).collect();
        Self {
            script: Arc::new(Mutex::new(script)),
            ..Self::new()
        }
    }

    pub async fn push(&self, outcome: Scripted) {
        self.script.lock().await.push_back(outcome);
    }

    pub async fn push_reply(&self, text: &str) {
        self.push(Scripted::Reply(text.to_string())).await;
    }

    /// Number of `complete` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every request received, in order.
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().await.last().cloned()
    }
}

impl Default for MockCompletion {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockCompletion {
    fn name(&self) -> &str {
        "mock-completion"
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
impl CompletionAdapter for MockCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, RapportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(request);

        let next = self.script.lock().await.pop_front();
        match next.unwrap_or_else(|| Scripted::Reply(DEFAULT_REPLY.to_string())) {
            Scripted::Reply(text) => Ok(CompletionResponse {
                text,
                model: "mock-model".to_string(),
            }),
            Scripted::Timeout => Err(RapportError::CompletionTimeout {
                duration: Duration::from_secs(10),
            }),
            Scripted::Transport => Err(RapportError::CompletionTransport {
                message: "HTTP 503 Service Unavailable".to_string(),
                source: None,
            }),
            Scripted::Malformed => Err(RapportError::CompletionMalformedResponse {
                message: "no alternatives in response".to_string(),
            }),
            Scripted::Hang => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CompletionRequest {
        CompletionRequest {
            system_prompt: "system".to_string(),
            user_text: "привет".to_string(),
            temperature: 0.6,
            max_tokens: 400,
        }
    }

    #[tokio::test]
    async fn replies_in_order_then_default() {
        let mock = MockCompletion::with_replies(["первый", "второй"]);
        assert_eq!(mock.complete(request()).await.unwrap().text, "первый");
        assert_eq!(mock.complete(request()).await.unwrap().text, "второй");
        assert_eq!(mock.complete(request()).await.unwrap().text, DEFAULT_REPLY);
        assert_eq!(mock.calls(), 3);
    }

    #[tokio::test]
    async fn scripted_failures_map_to_error_kinds() {
        let mock = MockCompletion::new();
        mock.push(Scripted::Timeout).await;
        mock.push(Scripted::Transport).await;
        mock.push(Scripted::Malformed).await;

        assert!(matches!(
            mock.complete(request()).await,
            Err(RapportError::CompletionTimeout { .. })
        ));
        assert!(matches!(
            mock.complete(request()).await,
            Err(RapportError::CompletionTransport { .. })
        ));
        assert!(matches!(
            mock.complete(request()).await,
            Err(RapportError::CompletionMalformedResponse { .. })
        ));
    }

    #[tokio::test]
    async fn records_requests() {
        let mock = MockCompletion::new();
        mock.complete(request()).await.unwrap();
        let last = mock.last_request().await.unwrap();
        assert_eq!(last.user_text, "привет");
        assert_eq!(mock.requests().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn hang_never_answers() {
        let mock = MockCompletion::new();
        mock.push(Scripted::Hang).await;
        let outcome =
            tokio::time::timeout(Duration::from_secs(30), mock.complete(request())).await;
        assert!(outcome.is_err());
    }
}
