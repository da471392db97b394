// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the rapport engine.

use std::time::Duration;

use thiserror::Error;

/// The primary error type used across all rapport adapter traits and engine operations.
#[derive(Debug, Error)]
pub enum RapportError {
    /// Configuration errors (missing secrets, invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Chat transport errors (send failure, closed inbound queue).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The completion call did not finish within its deadline.
    #[error("completion timed out after {duration:?}")]
    CompletionTimeout { duration: Duration },

    /// The completion endpoint was unreachable or answered with a non-success status.
    #[error("completion transport error: {message}")]
    CompletionTransport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The completion endpoint answered, but the body had no usable text.
    #[error("malformed completion response: {message}")]
    CompletionMalformedResponse { message: String },

    /// Loading or saving a user context failed.
    #[error("persistence error: {message}")]
    Persistence {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Another process is already polling the same bot token.
    #[error("another instance is already running: {0}")]
    DuplicateProcessInstance(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RapportError {
    /// Returns true for the per-turn completion failures that are answered
    /// with a fallback string instead of being propagated.
    pub fn is_completion_failure(&self) -> bool {
        matches!(
            self,
            RapportError::CompletionTimeout { .. }
                | RapportError::CompletionTransport { .. }
                | RapportError::CompletionMalformedResponse { .. }
        )
    }

    /// Wraps a storage-layer error as a persistence failure with context.
    pub fn persistence(message: impl Into<String>, source: RapportError) -> Self {
        RapportError::Persistence {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
