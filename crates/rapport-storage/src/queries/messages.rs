// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only message log.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rapport_core::{RapportError, StyleTag, Turn, UserId};
use rusqlite::params;
use rusqlite::types::Type;

use crate::database::{Database, map_tr_err};

/// Append a completed turn to the log.
pub async fn insert_turn(db: &Database, user_id: UserId, turn: &Turn) -> Result<(), RapportError> {
    let turn = turn.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO message_log (user_id, user_text, bot_text, style, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    user_id.0,
                    turn.user_text,
                    turn.bot_text,
                    turn.style.to_string(),
                    turn.timestamp.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// The `limit` most recent turns for a user, oldest first.
pub async fn recent_turns(
    db: &Database,
    user_id: UserId,
    limit: i64,
) -> Result<Vec<Turn>, RapportError> {
    db.connection()
        .call(move |conn| -> Result<Vec<Turn>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT user_text, bot_text, style, created_at FROM (
                     SELECT id, user_text, bot_text, style, created_at FROM message_log
                     WHERE user_id = ?1 ORDER BY id DESC LIMIT ?2
                 ) ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![user_id.0, limit], |row| {
                let style: String = row.get(2)?;
                let created_at: String = row.get(3)?;
                Ok(Turn {
                    user_text: row.get(0)?,
                    bot_text: row.get(1)?,
                    style: StyleTag::from_str(&style).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e))
                    })?,
                    timestamp: DateTime::parse_from_rfc3339(&created_at)
                        .map(|t| t.with_timezone(&Utc))
                        .map_err(|e| {
                            rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e))
                        })?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
