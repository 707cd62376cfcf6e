// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Participant (bot profile) reads and seeding writes.

use rusqlite::{params, OptionalExtension};

use palaver_core::PalaverError;
use palaver_core::types::{BotProfile, UserId};

use crate::database::{map_tr_err, Database};

/// Fetch a participant profile by id.
///
/// A malformed `settings` blob is the one storage anomaly allowed to
/// propagate to the caller (it cannot be healed by a recomputation).
pub async fn fetch_participant(
    db: &Database,
    id: &UserId,
) -> Result<Option<BotProfile>, PalaverError> {
    let user_id = id.0.clone();
    let row = db
        .connection()
        .call(move |conn| {
            let row = conn
                .prepare("SELECT id, name, is_bot, settings FROM participants WHERE id = ?1")?
                .query_row(params![user_id], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, bool>(2)?,
                        row.get::<_, Option<String>>(3)?,
                    ))
                })
                .optional()?;
            Ok(row)
        })
        .await
        .map_err(map_tr_err)?;

    let Some((id, name, is_bot, settings)) = row else {
        return Ok(None);
    };

    let settings = settings
        .as_deref()
        .map(serde_json::from_str::<serde_json::Value>)
        .transpose()?;

    Ok(Some(BotProfile {
        id: UserId(id),
        name,
        is_bot,
        settings,
    }))
}

/// Insert or update a participant profile (seeding write).
pub async fn upsert_participant(db: &Database, profile: &BotProfile) -> Result<(), PalaverError> {
    let settings = profile
        .settings
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    let profile = profile.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO participants (id, name, is_bot, settings)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (id) DO UPDATE SET
                     name = excluded.name,
                     is_bot = excluded.is_bot,
                     settings = excluded.settings",
                params![profile.id.0, profile.name, profile.is_bot, settings],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_profile(id: &str, name: &str) -> BotProfile {
        BotProfile {
            id: UserId(id.to_string()),
            name: name.to_string(),
            is_bot: true,
            settings: Some(serde_json::json!({"model": "claude-sonnet-4-20250514"})),
        }
    }

    #[tokio::test]
    async fn upsert_and_fetch_round_trip() {
        let db = Database::open_in_memory().await.unwrap();
        let profile = make_profile("bot-1", "Alice");
        upsert_participant(&db, &profile).await.unwrap();

        let fetched = fetch_participant(&db, &profile.id).await.unwrap().unwrap();
        assert_eq!(fetched, profile);
    }

    #[tokio::test]
    async fn fetch_missing_participant_returns_none() {
        let db = Database::open_in_memory().await.unwrap();
        let fetched = fetch_participant(&db, &UserId("nope".into())).await.unwrap();
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn upsert_overwrites_existing() {
        let db = Database::open_in_memory().await.unwrap();
        upsert_participant(&db, &make_profile("bot-1", "Alice"))
            .await
            .unwrap();

        let mut renamed = make_profile("bot-1", "Alicia");
        renamed.settings = None;
        upsert_participant(&db, &renamed).await.unwrap();

        let fetched = fetch_participant(&db, &renamed.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Alicia");
        assert!(fetched.settings.is_none());
    }

    #[tokio::test]
    async fn malformed_settings_blob_propagates() {
        let db = Database::open_in_memory().await.unwrap();
        db.connection()
            .call(|conn| {
                conn.execute(
                    "INSERT INTO participants (id, name, is_bot, settings)
                     VALUES ('bot-bad', 'Broken', 1, '{not json')",
                    [],
                )?;
                Ok::<_, rusqlite::Error>(())
            })
            .await
            .unwrap();

        let err = fetch_participant(&db, &UserId("bot-bad".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, PalaverError::Serialization { .. }));
    }
}
