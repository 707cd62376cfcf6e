// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! System of record gateway trait.
//!
//! The authoritative relational store is an external collaborator; only the
//! read shape is specified here. No writes into the system of record
//! originate from this subsystem.

use async_trait::async_trait;

use crate::error::PalaverError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{BotProfile, ChatId, Message, MessageId, UserId};

/// Point reads against the authoritative message store.
#[async_trait]
pub trait MessageGateway: PluginAdapter {
    /// Fetches a message by id, translations included. `None` if it does not exist.
    async fn fetch_message(&self, id: &MessageId) -> Result<Option<Message>, PalaverError>;

    /// Returns the id of the most recently inserted message in a chat.
    async fn latest_message_id(
        &self,
        chat_id: &ChatId,
    ) -> Result<Option<MessageId>, PalaverError>;

    /// Fetches a participant's profile (the bot-profile cache's source of truth).
    async fn fetch_participant(&self, id: &UserId) -> Result<Option<BotProfile>, PalaverError>;
}
