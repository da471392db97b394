// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `rapport serve` command implementation.
//!
//! Opens SQLite storage, builds the YandexGPT completion adapter and the
//! Telegram channel, then runs the engine loop alongside the idle-context
//! sweeper until a shutdown signal arrives.

use std::sync::Arc;

use rapport_agent::shutdown;
use rapport_agent::{EngineLoop, TurnEngine, recording, sweep};
use rapport_config::RapportConfig;
use rapport_core::{ChannelAdapter, PluginAdapter, RapportError, StorageAdapter};
use rapport_storage::SqliteStorage;
use rapport_telegram::TelegramChannel;
use rapport_yandex::YandexCompletion;
use tracing::{error, info, warn};

/// Runs the `rapport serve` command.
pub async fn run_serve(config: RapportConfig) -> Result<(), RapportError> {
    init_tracing(&config.agent.log_level);

    info!(persona = %config.persona.name, "starting rapport serve");

    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

    let completion = Arc::new(YandexCompletion::new(&config.completion).map_err(|e| {
        error!(error = %e, "failed to initialize completion adapter");
        e
    })?);

    let mut channel = TelegramChannel::new(&config.telegram)?;
    if let Err(e) = channel.connect().await {
        if matches!(e, RapportError::DuplicateProcessInstance(_)) {
            error!(error = %e, "another instance is polling this bot, exiting");
        } else {
            error!(error = %e, "failed to connect Telegram channel");
        }
        storage.close().await?;
        return Err(e);
    }
    let channel = Arc::new(channel);

    recording::register_metrics();

    let engine = Arc::new(TurnEngine::new(&config, storage.clone(), completion));
    let cancel = shutdown::install_signal_handler();

    let sweeper = tokio::spawn(sweep::run_idle_sweeper(
        engine.contexts().clone(),
        config.context.clone(),
        cancel.clone(),
    ));

    let engine_loop = EngineLoop::new(channel.clone(), engine, config.typing.clone());
    let result = engine_loop.run(cancel.clone()).await;

    cancel.cancel();
    if let Err(e) = sweeper.await {
        warn!(error = %e, "idle sweeper task failed");
    }
    if let Err(e) = channel.shutdown().await {
        warn!(error = %e, "channel shutdown failed");
    }
    storage.close().await?;

    info!("rapport serve shutdown complete");
    result
}

/// Initializes the tracing subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("rapport={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
