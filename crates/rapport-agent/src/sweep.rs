// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic removal of idle user contexts.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rapport_config::model::ContextConfig;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::recording;
use crate::store::ContextStore;

/// Sweeps on `context.sweep_interval_secs` until `cancel` fires.
pub async fn run_idle_sweeper(store: Arc<ContextStore>, config: ContextConfig, cancel: CancellationToken) {
    let max_age = chrono::Duration::seconds(config.idle_timeout_secs as i64);
    let mut interval = tokio::time::interval(Duration::from_secs(config.sweep_interval_secs));
    // Skip the first immediate tick.
    interval.tick().await;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                sweep_once(&store, max_age).await;
            }
            _ = cancel.cancelled() => {
                info!("idle sweeper shutting down");
                break;
            }
        }
    }
}

/// Runs one sweep and returns the number of contexts removed.
pub async fn sweep_once(store: &ContextStore, max_age: chrono::Duration) -> usize {
    match store.sweep_idle(max_age, Utc::now()).await {
        Ok(0) => {
            debug!("idle sweep found nothing to remove");
            0
        }
        Ok(removed) => {
            recording::record_swept(removed);
            info!(removed, "idle contexts swept");
            removed
        }
        Err(e) => {
            warn!(error = %e, "idle sweep failed (non-fatal)");
            0
        }
    }
}
