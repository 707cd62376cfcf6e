// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound message lifecycle events from the message-send pipeline.
//!
//! The pipeline persists to the system of record first, then hands the same
//! fields here so the derived index follows every create, edit, and delete.

use palaver_core::error::PalaverError;
use palaver_core::types::{ChatId, MessageId, Translation, UserId};

use crate::writer::CacheWriter;

/// A message lifecycle event, as emitted by the message-send pipeline.
#[derive(Debug, Clone)]
pub enum MessageEvent {
    /// A new message was created.
    Created {
        chat_id: ChatId,
        message_id: MessageId,
        parent_id: Option<MessageId>,
        author_id: Option<UserId>,
        translations: Vec<Translation>,
    },
    /// A message was edited. `None` fields are unchanged; `translations`
    /// carries only the languages the edit touched.
    Edited {
        chat_id: ChatId,
        message_id: MessageId,
        parent_id: Option<MessageId>,
        author_id: Option<UserId>,
        translations: Option<Vec<Translation>>,
    },
    /// A message was deleted.
    Deleted {
        chat_id: ChatId,
        message_id: MessageId,
    },
    /// An entire chat was deleted.
    ChatDeleted { chat_id: ChatId },
}

impl CacheWriter {
    /// Applies a lifecycle event to the derived index.
    pub async fn apply(&self, event: MessageEvent) -> Result<(), PalaverError> {
        match event {
            MessageEvent::Created {
                chat_id,
                message_id,
                parent_id,
                author_id,
                translations,
            } => {
                self.add_message(
                    &chat_id,
                    &message_id,
                    parent_id.as_ref(),
                    author_id.as_ref(),
                    &translations,
                )
                .await
            }
            MessageEvent::Edited {
                chat_id,
                message_id,
                parent_id,
                author_id,
                translations,
            } => {
                self.edit_message(
                    &chat_id,
                    &message_id,
                    parent_id.as_ref(),
                    author_id.as_ref(),
                    translations.as_deref(),
                )
                .await
            }
            MessageEvent::Deleted {
                chat_id,
                message_id,
            } => self.delete_message(&chat_id, &message_id).await,
            MessageEvent::ChatDeleted { chat_id } => self.delete_chat(&chat_id).await,
        }
    }
}
