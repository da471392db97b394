// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User context CRUD operations.

use chrono::{DateTime, Utc};
use rapport_core::{RapportError, UserContext, UserId};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_json_err, map_tr_err};

/// Insert or replace a user's context.
pub async fn upsert_context(
    db: &Database,
    user_id: UserId,
    ctx: &UserContext,
) -> Result<(), RapportError> {
    let json = serde_json::to_string(ctx).map_err(map_json_err)?;
    let score = ctx.relationship_score;
    let last_interaction = ctx.last_interaction.timestamp();
    let updated_at = Utc::now().to_rfc3339();

    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO user_contexts
                     (user_id, context_json, relationship_score, last_interaction, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (user_id) DO UPDATE SET
                     context_json = excluded.context_json,
                     relationship_score = excluded.relationship_score,
                     last_interaction = excluded.last_interaction,
                     updated_at = excluded.updated_at",
                params![user_id.0, json, score, last_interaction, updated_at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a user's context, or `None` if it was never saved.
pub async fn get_context(
    db: &Database,
    user_id: UserId,
) -> Result<Option<UserContext>, RapportError> {
    let json: Option<String> = db
        .connection()
        .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
            conn.query_row(
                "SELECT context_json FROM user_contexts WHERE user_id = ?1",
                params![user_id.0],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)?;

    json.map(|json| serde_json::from_str(&json).map_err(map_json_err))
        .transpose()
}

/// Users whose last interaction is strictly before `cutoff`.
pub async fn list_idle(
    db: &Database,
    cutoff: DateTime<Utc>,
) -> Result<Vec<UserId>, RapportError> {
    let cutoff = cutoff.timestamp();
    db.connection()
        .call(move |conn| -> Result<Vec<UserId>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT user_id FROM user_contexts
                 WHERE last_interaction < ?1 ORDER BY last_interaction",
            )?;
            let rows = stmt.query_map(params![cutoff], |row| row.get(0).map(UserId))?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a user's context. Returns whether a row was removed.
pub async fn delete_context(db: &Database, user_id: UserId) -> Result<bool, RapportError> {
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let n = conn.execute(
                "DELETE FROM user_contexts WHERE user_id = ?1",
                params![user_id.0],
            )?;
            Ok(n > 0)
        })
        .await
        .map_err(map_tr_err)
}
