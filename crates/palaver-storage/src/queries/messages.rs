// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message point reads and pipeline seeding writes.

use rusqlite::{params, OptionalExtension};

use palaver_core::PalaverError;
use palaver_core::types::{ChatId, Message, MessageId, Translation, UserId};

use crate::database::{map_tr_err, Database};

/// Fetch a message by id, translations included, in insertion order.
pub async fn fetch_message(
    db: &Database,
    id: &MessageId,
) -> Result<Option<Message>, PalaverError> {
    let id = id.0.clone();
    db.connection()
        .call(move |conn| {
            let head = conn
                .prepare(
                    "SELECT id, chat_id, parent_id, author_id, seq
                     FROM messages WHERE id = ?1",
                )?
                .query_row(params![id.clone()], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, i64>(4)?,
                    ))
                })
                .optional()?;

            let Some((msg_id, chat_id, parent_id, author_id, seq)) = head else {
                return Ok(None);
            };

            let mut stmt = conn.prepare(
                "SELECT language, text FROM message_translations
                 WHERE message_id = ?1 ORDER BY rowid ASC",
            )?;
            let translations = stmt
                .query_map(params![id], |row| {
                    Ok(Translation {
                        language: row.get(0)?,
                        text: row.get(1)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(Some(Message {
                id: MessageId(msg_id),
                chat_id: ChatId(chat_id),
                parent_id: parent_id.map(MessageId),
                author_id: author_id.map(UserId),
                translations,
                seq,
            }))
        })
        .await
        .map_err(map_tr_err)
}

/// Id of the most recently inserted message in a chat (highest seq).
pub async fn latest_message_id(
    db: &Database,
    chat_id: &ChatId,
) -> Result<Option<MessageId>, PalaverError> {
    let chat_id = chat_id.0.clone();
    db.connection()
        .call(move |conn| {
            let id = conn
                .prepare(
                    "SELECT id FROM messages WHERE chat_id = ?1
                     ORDER BY seq DESC LIMIT 1",
                )?
                .query_row(params![chat_id], |row| row.get::<_, String>(0))
                .optional()?;
            Ok(id.map(MessageId))
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a message with its translations, creating the chat row if needed.
///
/// A seeding write used by the external message pipeline and tests; the
/// context subsystem itself only reads through [`MessageGateway`].
///
/// [`MessageGateway`]: palaver_core::MessageGateway
pub async fn insert_message(db: &Database, msg: &Message) -> Result<(), PalaverError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT OR IGNORE INTO chats (id) VALUES (?1)",
                params![msg.chat_id.0],
            )?;
            tx.execute(
                "INSERT INTO messages (id, chat_id, parent_id, author_id, seq)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    msg.id.0,
                    msg.chat_id.0,
                    msg.parent_id.as_ref().map(|p| p.0.clone()),
                    msg.author_id.as_ref().map(|a| a.0.clone()),
                    msg.seq,
                ],
            )?;
            for t in &msg.translations {
                tx.execute(
                    "INSERT INTO message_translations (message_id, language, text)
                     VALUES (?1, ?2, ?3)",
                    params![msg.id.0, t.language, t.text],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Replace a message's translations and tree position (edit seeding write).
pub async fn update_message(db: &Database, msg: &Message) -> Result<(), PalaverError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "UPDATE messages SET parent_id = ?2, author_id = ?3 WHERE id = ?1",
                params![
                    msg.id.0,
                    msg.parent_id.as_ref().map(|p| p.0.clone()),
                    msg.author_id.as_ref().map(|a| a.0.clone()),
                ],
            )?;
            for t in &msg.translations {
                tx.execute(
                    "INSERT INTO message_translations (message_id, language, text)
                     VALUES (?1, ?2, ?3)
                     ON CONFLICT (message_id, language) DO UPDATE SET text = excluded.text",
                    params![msg.id.0, t.language, t.text],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a message and (via cascade) its translations.
pub async fn delete_message(db: &Database, id: &MessageId) -> Result<(), PalaverError> {
    let id = id.0.clone();
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM messages WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
