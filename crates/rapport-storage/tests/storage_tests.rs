// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the SQLite storage adapter.

use chrono::{Duration, Utc};
use rapport_config::model::StorageConfig;
use rapport_core::{
    HealthStatus, Mood, PluginAdapter, StorageAdapter, StyleTag, Turn, UserContext, UserId,
};
use rapport_storage::SqliteStorage;

async fn storage(dir: &tempfile::TempDir) -> SqliteStorage {
    let config = StorageConfig {
        database_path: dir.path().join("rapport.db").display().to_string(),
        wal_mode: true,
    };
    let storage = SqliteStorage::new(config);
    storage.initialize().await.unwrap();
    storage
}

fn populated_context(user_id: UserId) -> UserContext {
    let now = Utc::now();
    let mut ctx = UserContext::new(user_id, now);
    ctx.display_name = Some("Анна".to_string());
    ctx.relationship_score = 42;
    ctx.messages_count = 17;
    ctx.positive_interactions = 9;
    ctx.negative_interactions = 2;
    ctx.mood = Mood::Positive;
    ctx.mat_count = 1;
    ctx.first_interaction = false;
    ctx.conversation_depth = 4;
    ctx.user_info.add_interest("музыка");
    ctx.user_info.add_place("Москве");
    ctx.name_usage.count = 3;
    ctx.name_usage.last_used_at = Some(now);
    ctx.push_turn(
        Turn {
            user_text: "привет".into(),
            bot_text: "Привет! Как ты?".into(),
            style: StyleTag::Friendly,
            timestamp: now,
        },
        10,
    );
    ctx
}

#[tokio::test]
async fn context_round_trips_field_for_field() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage(&dir).await;
    let ctx = populated_context(UserId(100));

    storage.save_context(UserId(100), &ctx).await.unwrap();
    let loaded = storage.load_context(UserId(100)).await.unwrap().unwrap();
    assert_eq!(loaded, ctx);
}

#[tokio::test]
async fn context_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = populated_context(UserId(7));
    {
        let storage = storage(&dir).await;
        storage.save_context(UserId(7), &ctx).await.unwrap();
        storage.close().await.unwrap();
    }
    let storage = storage(&dir).await;
    assert_eq!(storage.load_context(UserId(7)).await.unwrap(), Some(ctx));
}

#[tokio::test]
async fn idle_contexts_are_listed_and_deleted() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage(&dir).await;
    let now = Utc::now();

    let mut stale = UserContext::new(UserId(1), now);
    stale.last_interaction = now - Duration::days(2);
    storage.save_context(UserId(1), &stale).await.unwrap();
    storage
        .save_context(UserId(2), &UserContext::new(UserId(2), now))
        .await
        .unwrap();

    let idle = storage
        .list_idle_contexts(now - Duration::days(1))
        .await
        .unwrap();
    assert_eq!(idle, vec![UserId(1)]);

    storage.delete_context(UserId(1)).await.unwrap();
    assert!(storage.load_context(UserId(1)).await.unwrap().is_none());
    assert!(storage.load_context(UserId(2)).await.unwrap().is_some());

    // Deleting twice is harmless.
    storage.delete_context(UserId(1)).await.unwrap();
}

#[tokio::test]
async fn message_log_is_appended() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage(&dir).await;
    let turn = Turn {
        user_text: "как дела?".into(),
        bot_text: "Отлично!".into(),
        style: StyleTag::Friendly,
        timestamp: Utc::now(),
    };
    storage.append_message_log(UserId(3), &turn).await.unwrap();
    storage.append_message_log(UserId(3), &turn).await.unwrap();
    assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
}

#[tokio::test]
async fn operations_before_initialize_fail() {
    let storage = SqliteStorage::new(StorageConfig {
        database_path: "/nonexistent/never-opened.db".into(),
        wal_mode: false,
    });
    assert!(storage.load_context(UserId(1)).await.is_err());
    assert!(storage.health_check().await.is_err());
    assert!(storage.shutdown().await.is_ok());
}
