// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a turn engine over a temp SQLite database, a
//! mock completion service and a mock channel. The RNG is seeded and
//! typing pacing is off, so runs are reproducible and fast.

use std::sync::Arc;

use chrono::Utc;
use rapport_agent::{EngineLoop, TurnEngine, TurnReply};
use rapport_config::RapportConfig;
use rapport_config::model::{EnrichmentConfig, StorageConfig};
use rapport_core::{
    ChatId, InboundMessage, MessageId, RapportError, StorageAdapter, UserContext, UserId,
};
use rapport_storage::SqliteStorage;

use crate::mock_channel::MockChannel;
use crate::mock_completion::MockCompletion;

/// Seed used unless a test picks its own.
pub const DEFAULT_SEED: u64 = 42;

/// Builds an inbound text message from `user_id` in the chat with the same id.
pub fn inbound(user_id: i64, text: &str) -> InboundMessage {
    InboundMessage {
        id: MessageId(format!("test-{user_id}-{}", text.len())),
        user_id: UserId(user_id),
        chat_id: ChatId(user_id),
        text: text.to_string(),
        display_name_hint: Some("Анна".to_string()),
        received_at: Utc::now(),
    }
}

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    replies: Vec<String>,
    config: RapportConfig,
    storage: Option<Arc<dyn StorageAdapter>>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        let mut config = RapportConfig::default();
        config.agent.rng_seed = Some(DEFAULT_SEED);
        config.typing.enabled = false;
        Self {
            replies: Vec::new(),
            config,
            storage: None,
        }
    }

    /// Set mock completion replies, consumed in order.
    pub fn with_replies<S: Into<String>>(mut self, replies: impl IntoIterator<Item = S>) -> Self {
        self.replies = replies.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.agent.rng_seed = Some(seed);
        self
    }

    /// Turn off every probabilistic enrichment stage except forced name insertion.
    pub fn without_enrichment(mut self) -> Self {
        self.config.enrichment = EnrichmentConfig::disabled();
        self
    }

    /// Use `storage` instead of a temp SQLite database.
    pub fn with_storage(mut self, storage: Arc<dyn StorageAdapter>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Adjust any part of the configuration.
    pub fn configure(mut self, f: impl FnOnce(&mut RapportConfig)) -> Self {
        f(&mut self.config);
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, RapportError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| RapportError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let mut config = self.config;
        config.storage = StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        };

        let storage: Arc<dyn StorageAdapter> = match self.storage {
            Some(storage) => storage,
            None => Arc::new(SqliteStorage::new(config.storage.clone())),
        };
        storage.initialize().await?;

        let completion = Arc::new(MockCompletion::with_replies(self.replies));
        let channel = Arc::new(MockChannel::new());
        let engine = Arc::new(TurnEngine::new(&config, storage.clone(), completion.clone()));

        Ok(TestHarness {
            completion,
            channel,
            storage,
            engine,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with mock adapters and temp storage.
pub struct TestHarness {
    pub completion: Arc<MockCompletion>,
    pub channel: Arc<MockChannel>,
    /// Storage adapter, a temp SQLite DB unless the builder was given one.
    pub storage: Arc<dyn StorageAdapter>,
    pub engine: Arc<TurnEngine>,
    pub config: RapportConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Runs one turn for `user_id` directly through the engine.
    pub async fn send(&self, user_id: i64, text: &str) -> TurnReply {
        self.engine.handle_turn(&inbound(user_id, text)).await
    }

    /// The user's current in-memory context.
    pub async fn context(&self, user_id: i64) -> Result<UserContext, RapportError> {
        self.engine.contexts().load(UserId(user_id), Utc::now()).await
    }

    /// The user's context as last persisted.
    pub async fn persisted(&self, user_id: i64) -> Result<Option<UserContext>, RapportError> {
        self.storage.load_context(UserId(user_id)).await
    }

    /// An engine loop over the mock channel.
    pub fn engine_loop(&self) -> EngineLoop {
        EngineLoop::new(
            self.channel.clone(),
            self.engine.clone(),
            self.config.typing.clone(),
        )
    }
}
