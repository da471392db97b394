// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persisting user contexts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::context::{Turn, UserContext};
use crate::error::RapportError;
use crate::traits::adapter::PluginAdapter;
use crate::types::UserId;

/// Adapter for the persistence collaborator.
///
/// The on-disk layout is the adapter's concern; the engine relies only on
/// these operations.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), RapportError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), RapportError>;

    /// Loads a user's context, or `None` if the user has never been saved.
    async fn load_context(&self, user_id: UserId) -> Result<Option<UserContext>, RapportError>;

    /// Inserts or replaces a user's context.
    async fn save_context(&self, user_id: UserId, ctx: &UserContext) -> Result<(), RapportError>;

    /// Appends a completed turn to the user's message log.
    async fn append_message_log(&self, user_id: UserId, turn: &Turn) -> Result<(), RapportError>;

    /// Lists users whose last interaction is older than `cutoff`.
    async fn list_idle_contexts(&self, cutoff: DateTime<Utc>) -> Result<Vec<UserId>, RapportError>;

    /// Deletes a user's context. Deleting an unknown user is not an error.
    async fn delete_context(&self, user_id: UserId) -> Result<(), RapportError>;
}
