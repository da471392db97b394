// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter whose writes always fail.
//!
//! Reads behave like an empty database. Every `save_context` and
//! `append_message_log` call returns `RapportError::Persistence` and is
//! counted, so tests can check that a turn still completes and that the
//! write was attempted.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use rapport_core::{
    AdapterType, HealthStatus, PluginAdapter, RapportError, StorageAdapter, Turn, UserContext,
    UserId,
};

#[derive(Debug, Default)]
pub struct FailingStorage {
    saves: AtomicUsize,
    appends: AtomicUsize,
}

impl FailingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rejected `save_context` calls.
    pub fn save_attempts(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Number of rejected `append_message_log` calls.
    pub fn append_attempts(&self) -> usize {
        self.appends.load(Ordering::SeqCst)
    }
}

fn disk_full() -> RapportError {
    RapportError::Persistence {
        message: "disk full".to_string(),
        source: None,
    }
}

#[async_trait]
impl PluginAdapter for FailingStorage {
    fn name(&self) -> &str {
        "failing-storage"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, RapportError> {
        Ok(HealthStatus::Degraded("writes rejected".to_string()))
    }

    async fn shutdown(&self) -> Result<(), RapportError> {
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for FailingStorage {
    async fn initialize(&self) -> Result<(), RapportError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), RapportError> {
        Ok(())
    }

    async fn load_context(&self, _user_id: UserId) -> Result<Option<UserContext>, RapportError> {
        Ok(None)
    }

    async fn save_context(&self, _user_id: UserId, _ctx: &UserContext) -> Result<(), RapportError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        Err(disk_full())
    }

    async fn append_message_log(&self, _user_id: UserId, _turn: &Turn) -> Result<(), RapportError> {
        self.appends.fetch_add(1, Ordering::SeqCst);
        Err(disk_full())
    }

    async fn list_idle_contexts(&self, _cutoff: DateTime<Utc>) -> Result<Vec<UserId>, RapportError> {
        Ok(Vec::new())
    }

    async fn delete_context(&self, _user_id: UserId) -> Result<(), RapportError> {
        Ok(())
    }
}
