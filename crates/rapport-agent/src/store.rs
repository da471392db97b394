// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user context lifecycle.
//!
//! Each user has one slot behind an async mutex. A turn holds the slot's
//! lock through a [`UserLease`] from load to save, which serializes turns
//! for the same user while turns for different users run in parallel.
//! The idle sweep only takes locks it can get without waiting, so it never
//! stalls a running turn.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rapport_core::{RapportError, StorageAdapter, UserContext, UserId};
use tokio::sync::{Mutex, OwnedMappedMutexGuard, OwnedMutexGuard};
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct Slot {
    ctx: Option<UserContext>,
    /// Set by the sweep before the slot leaves the map.
    evicted: bool,
}

/// Exclusive access to one user's context for the duration of a turn.
pub struct UserLease {
    user_id: UserId,
    ctx: OwnedMappedMutexGuard<Slot, UserContext>,
}

impl UserLease {
    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}

impl Deref for UserLease {
    type Target = UserContext;

    fn deref(&self) -> &UserContext {
        &self.ctx
    }
}

impl DerefMut for UserLease {
    fn deref_mut(&mut self) -> &mut UserContext {
        &mut self.ctx
    }
}

/// In-memory contexts backed by the storage adapter.
pub struct ContextStore {
    storage: Arc<dyn StorageAdapter>,
    slots: DashMap<UserId, Arc<Mutex<Slot>>>,
}

impl ContextStore {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self {
            storage,
            slots: DashMap::new(),
        }
    }

    /// Locks the user's slot, loading or creating the context on first use.
    pub async fn acquire(&self, user_id: UserId, now: DateTime<Utc>) -> Result<UserLease, RapportError> {
        loop {
            let slot = self.slots.entry(user_id).or_default().value().clone();
            let mut guard = slot.lock_owned().await;
            if guard.evicted {
                // Swept while we waited; retry against the fresh slot.
                continue;
            }
            if guard.ctx.is_none() {
                let loaded = self
                    .storage
                    .load_context(user_id)
                    .await
                    .map_err(|e| RapportError::persistence(format!("load context for {user_id}"), e))?;
                if loaded.is_none() {
                    debug!(%user_id, "creating context for new user");
                }
                guard.ctx = Some(loaded.unwrap_or_else(|| UserContext::new(user_id, now)));
            }
            let ctx = OwnedMutexGuard::try_map(guard, |slot| slot.ctx.as_mut()).map_err(|_| {
                RapportError::Internal(format!("context slot for {user_id} is empty"))
            })?;
            return Ok(UserLease { user_id, ctx });
        }
    }

    /// Snapshot of the user's context. Nothing is persisted.
    pub async fn load(&self, user_id: UserId, now: DateTime<Utc>) -> Result<UserContext, RapportError> {
        let lease = self.acquire(user_id, now).await?;
        Ok((*lease).clone())
    }

    /// Persists the leased context.
    pub async fn persist(&self, lease: &UserLease) -> Result<(), RapportError> {
        self.storage
            .save_context(lease.user_id, &**lease)
            .await
            .map_err(|e| RapportError::persistence(format!("save context for {}", lease.user_id), e))
    }

    /// Replaces the user's context in memory and in storage.
    pub async fn save(&self, user_id: UserId, ctx: UserContext) -> Result<(), RapportError> {
        let now = ctx.last_interaction;
        let mut lease = self.acquire(user_id, now).await?;
        *lease = ctx;
        self.persist(&lease).await
    }

    /// Removes contexts idle for at least `max_age`, from memory and storage.
    ///
    /// Slots locked by a running turn are skipped. Returns the number of
    /// distinct users removed.
    pub async fn sweep_idle(&self, max_age: chrono::Duration, now: DateTime<Utc>) -> Result<usize, RapportError> {
        let candidates: Vec<(UserId, Arc<Mutex<Slot>>)> = self
            .slots
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        let mut removed = Vec::new();
        for (user_id, slot) in candidates {
            let Ok(mut guard) = slot.try_lock() else {
                continue;
            };
            let idle = guard
                .ctx
                .as_ref()
                .is_none_or(|ctx| ctx.is_idle(now, max_age));
            if idle {
                guard.evicted = true;
                self.slots.remove_if(&user_id, |_, current| Arc::ptr_eq(current, &slot));
                removed.push(user_id);
            }
        }

        let persisted = self.storage.list_idle_contexts(now - max_age).await?;
        for user_id in persisted {
            if self.slots.contains_key(&user_id) {
                continue;
            }
            match self.storage.delete_context(user_id).await {
                Ok(()) => {
                    if !removed.contains(&user_id) {
                        removed.push(user_id);
                    }
                }
                Err(e) => warn!(%user_id, error = %e, "failed to delete idle context"),
            }
        }

        Ok(removed.len())
    }

    /// Number of contexts held in memory.
    pub fn resident(&self) -> usize {
        self.slots.len()
    }
}
