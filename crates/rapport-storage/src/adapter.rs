// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::debug;

use rapport_config::model::StorageConfig;
use rapport_core::{
    AdapterType, HealthStatus, PluginAdapter, RapportError, StorageAdapter, Turn, UserContext,
    UserId,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed storage adapter.
///
/// The database is opened on the first call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, RapportError> {
        self.db.get().ok_or_else(|| RapportError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    async fn checkpoint(&self, db: &Database) -> Result<(), RapportError> {
        if !self.config.wal_mode {
            return Ok(());
        }
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, RapportError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RapportError> {
        if let Some(db) = self.db.get() {
            self.checkpoint(db).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), RapportError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| RapportError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), RapportError> {
        let db = self.db()?;
        self.checkpoint(db).await
    }

    async fn load_context(&self, user_id: UserId) -> Result<Option<UserContext>, RapportError> {
        queries::contexts::get_context(self.db()?, user_id).await
    }

    async fn save_context(&self, user_id: UserId, ctx: &UserContext) -> Result<(), RapportError> {
        queries::contexts::upsert_context(self.db()?, user_id, ctx).await
    }

    async fn append_message_log(&self, user_id: UserId, turn: &Turn) -> Result<(), RapportError> {
        queries::messages::insert_turn(self.db()?, user_id, turn).await
    }

    async fn list_idle_contexts(&self, cutoff: DateTime<Utc>) -> Result<Vec<UserId>, RapportError> {
        queries::contexts::list_idle(self.db()?, cutoff).await
    }

    async fn delete_context(&self, user_id: UserId) -> Result<(), RapportError> {
        let removed = queries::contexts::delete_context(self.db()?, user_id).await?;
        debug!(%user_id, removed, "context deleted");
        Ok(())
    }
}
