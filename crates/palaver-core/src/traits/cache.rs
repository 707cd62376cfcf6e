// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hot cache trait: the derived index mirroring the authoritative message tree.
//!
//! The cache is a shared, mutable, multi-writer structure with no exclusive
//! owner. All writers (the lifecycle writer and the collector's repair path)
//! rely on these writes being idempotent, so concurrent writers converge
//! rather than diverge. Every read returns `Option` -- "absent" is an
//! explicit result, never an empty sentinel value.

use async_trait::async_trait;

use crate::error::PalaverError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{BotProfile, CachedMessage, ChatId, MessageId, UserId};

/// Low-latency derived index over the message tree.
///
/// Holds one record per message, one ordered id sequence per chat (scored
/// by insertion time), one child-id set per parent, and a short-TTL bot
/// profile record per bot. Everything here is reconstructable from the
/// system of record; losing an entry costs a recomputation, never data.
#[async_trait]
pub trait ContextCache: PluginAdapter {
    // --- Per-message records ---

    /// Reads a cached message record. `None` means a clean miss.
    async fn get_message(&self, id: &MessageId) -> Result<Option<CachedMessage>, PalaverError>;

    /// Writes (or overwrites) a cached message record.
    async fn put_message(&self, message: &CachedMessage) -> Result<(), PalaverError>;

    /// Deletes a cached message record. Deleting an absent record is not an error.
    async fn remove_message(&self, id: &MessageId) -> Result<(), PalaverError>;

    // --- Per-chat ordered sequences ---

    /// Appends a message id to the chat's ordered sequence with the given score.
    async fn push_chat_message(
        &self,
        chat_id: &ChatId,
        id: &MessageId,
        score: i64,
    ) -> Result<(), PalaverError>;

    /// Removes a message id from the chat's ordered sequence.
    async fn remove_chat_message(
        &self,
        chat_id: &ChatId,
        id: &MessageId,
    ) -> Result<(), PalaverError>;

    /// Returns all message ids for a chat, ordered by insertion score ascending.
    async fn chat_message_ids(&self, chat_id: &ChatId) -> Result<Vec<MessageId>, PalaverError>;

    /// Returns the most recent message id in a chat, if any.
    async fn latest_chat_message(
        &self,
        chat_id: &ChatId,
    ) -> Result<Option<MessageId>, PalaverError>;

    /// Deletes the chat's ordered sequence.
    async fn remove_chat(&self, chat_id: &ChatId) -> Result<(), PalaverError>;

    // --- Per-parent child sets ---

    /// Adds a child id to a parent's child set.
    async fn add_child(
        &self,
        parent_id: &MessageId,
        child_id: &MessageId,
    ) -> Result<(), PalaverError>;

    /// Removes a child id from a parent's child set.
    async fn remove_child(
        &self,
        parent_id: &MessageId,
        child_id: &MessageId,
    ) -> Result<(), PalaverError>;

    /// Returns the direct children of a message, sorted for deterministic iteration.
    async fn children(&self, parent_id: &MessageId) -> Result<Vec<MessageId>, PalaverError>;

    /// Deletes a parent's child-set key entirely.
    async fn remove_children(&self, parent_id: &MessageId) -> Result<(), PalaverError>;

    // --- Bot profiles (TTL-bounded) ---

    /// Reads a cached bot profile. Expired entries read as `None`.
    async fn get_bot_profile(&self, id: &UserId) -> Result<Option<BotProfile>, PalaverError>;

    /// Writes a bot profile; the implementation applies its configured TTL.
    async fn put_bot_profile(&self, profile: &BotProfile) -> Result<(), PalaverError>;
}
