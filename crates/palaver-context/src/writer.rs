// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keeps the hot cache index consistent with every message lifecycle event.
//!
//! The cache is never the source of truth: any missing or unreachable entry
//! is a recoverable anomaly, logged and treated as absent. All writes use
//! the same merge semantics as the collector's repair path so concurrent
//! writers converge.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::timeout;
use tracing::{debug, warn};

use palaver_config::model::CacheConfig;
use palaver_core::error::PalaverError;
use palaver_core::tokens::{estimate_tokens, EstimationMethod};
use palaver_core::types::{
    CachedMessage, ChatId, Message, MessageId, TokenCounts, Translation, UserId,
};
use palaver_core::ContextCache;

/// Derives the full per-language, per-method token count map for a set of
/// translations. Deterministic, so re-deriving from the system of record
/// always reproduces the cached content byte for byte.
pub fn derive_token_counts(translations: &[Translation]) -> TokenCounts {
    let mut counts = TokenCounts::new();
    for t in translations {
        let methods = counts.entry(t.language.clone()).or_default();
        for method in EstimationMethod::supported() {
            methods.insert(method, estimate_tokens(&t.text, method));
        }
    }
    counts
}

/// Derives the cache record for an authoritative message.
pub fn derive_cached_message(message: &Message) -> CachedMessage {
    CachedMessage {
        id: message.id.clone(),
        parent_id: message.parent_id.clone(),
        author_id: message.author_id.clone(),
        token_counts: derive_token_counts(&message.translations),
    }
}

/// Maintains the derived message tree index in the hot cache.
///
/// Holds an injected cache capability; all operations wrap individual cache
/// calls with the configured timeout and degrade to "cache unavailable"
/// (a miss for reads, a skipped write for writes) instead of failing.
pub struct CacheWriter {
    cache: Arc<dyn ContextCache>,
    op_timeout: Duration,
}

impl CacheWriter {
    /// Creates a writer over the given cache with the configured timeout.
    pub fn new(cache: Arc<dyn ContextCache>, config: &CacheConfig) -> Self {
        Self {
            cache,
            op_timeout: Duration::from_millis(config.op_timeout_ms),
        }
    }

    /// Records a newly created message: token counts for every
    /// (language, method) pair, the chat sequence entry (scored by current
    /// time), and the parent's child-set entry.
    pub async fn add_message(
        &self,
        chat_id: &ChatId,
        id: &MessageId,
        parent_id: Option<&MessageId>,
        author_id: Option<&UserId>,
        translations: &[Translation],
    ) -> Result<(), PalaverError> {
        let cached = CachedMessage {
            id: id.clone(),
            parent_id: parent_id.cloned(),
            author_id: author_id.cloned(),
            token_counts: derive_token_counts(translations),
        };

        self.guarded("put_message", self.cache.put_message(&cached))
            .await;
        self.guarded(
            "push_chat_message",
            self.cache
                .push_chat_message(chat_id, id, Utc::now().timestamp_millis()),
        )
        .await;
        if let Some(parent) = parent_id {
            self.guarded("add_child", self.cache.add_child(parent, id))
                .await;
        }
        Ok(())
    }

    /// Applies an edit to a cached message.
    ///
    /// Token counts merge per language: languages present in the edit are
    /// recomputed, languages absent from it are preserved. An edit carrying
    /// no translations is intentionally a token-count no-op. `parent_id` and
    /// `author_id` mean "unchanged" when `None` and are only rewritten when
    /// they differ from the stored value; a parent change moves the id
    /// between child sets.
    pub async fn edit_message(
        &self,
        chat_id: &ChatId,
        id: &MessageId,
        parent_id: Option<&MessageId>,
        author_id: Option<&UserId>,
        translations: Option<&[Translation]>,
    ) -> Result<(), PalaverError> {
        let mut cached = match self
            .guarded("get_message", self.cache.get_message(id))
            .await
            .flatten()
        {
            Some(existing) => existing,
            None => {
                // Self-healing: an edit of an uncached message starts from
                // an empty base rather than failing.
                warn!(chat_id = %chat_id, message_id = %id, "edit of uncached message; starting from empty base");
                CachedMessage {
                    id: id.clone(),
                    parent_id: None,
                    author_id: None,
                    token_counts: TokenCounts::new(),
                }
            }
        };

        if let Some(translations) = translations {
            for (language, methods) in derive_token_counts(translations) {
                cached.token_counts.insert(language, methods);
            }
        }

        if let Some(new_parent) = parent_id
            && cached.parent_id.as_ref() != Some(new_parent)
        {
            if let Some(old_parent) = &cached.parent_id {
                self.guarded("remove_child", self.cache.remove_child(old_parent, id))
                    .await;
            }
            self.guarded("add_child", self.cache.add_child(new_parent, id))
                .await;
            cached.parent_id = Some(new_parent.clone());
        }

        if let Some(new_author) = author_id
            && cached.author_id.as_ref() != Some(new_author)
        {
            cached.author_id = Some(new_author.clone());
        }

        self.guarded("put_message", self.cache.put_message(&cached))
            .await;
        Ok(())
    }

    /// Removes a message from the index, splicing its children onto its own
    /// parent so ancestry continuity is preserved.
    pub async fn delete_message(
        &self,
        chat_id: &ChatId,
        id: &MessageId,
    ) -> Result<(), PalaverError> {
        let deleted = self
            .guarded("get_message", self.cache.get_message(id))
            .await
            .flatten();
        if deleted.is_none() {
            warn!(chat_id = %chat_id, message_id = %id, "delete of uncached message; children splice to root");
        }
        let new_parent = deleted.and_then(|m| m.parent_id);

        let children = self
            .guarded("children", self.cache.children(id))
            .await
            .unwrap_or_default();
        for child in &children {
            match self
                .guarded("get_message", self.cache.get_message(child))
                .await
                .flatten()
            {
                Some(mut cached_child) => {
                    cached_child.parent_id = new_parent.clone();
                    self.guarded("put_message", self.cache.put_message(&cached_child))
                        .await;
                }
                None => {
                    warn!(message_id = %child, "child record missing during splice");
                }
            }
            if let Some(parent) = &new_parent {
                self.guarded("add_child", self.cache.add_child(parent, child))
                    .await;
            }
        }

        if let Some(parent) = &new_parent {
            self.guarded("remove_child", self.cache.remove_child(parent, id))
                .await;
        }
        self.guarded("remove_message", self.cache.remove_message(id))
            .await;
        self.guarded("remove_children", self.cache.remove_children(id))
            .await;
        self.guarded(
            "remove_chat_message",
            self.cache.remove_chat_message(chat_id, id),
        )
        .await;

        debug!(chat_id = %chat_id, message_id = %id, children = children.len(), "message removed from index");
        Ok(())
    }

    /// Removes every index entry belonging to a chat.
    pub async fn delete_chat(&self, chat_id: &ChatId) -> Result<(), PalaverError> {
        let ids = self
            .guarded("chat_message_ids", self.cache.chat_message_ids(chat_id))
            .await
            .unwrap_or_default();
        for id in &ids {
            self.guarded("remove_message", self.cache.remove_message(id))
                .await;
            self.guarded("remove_children", self.cache.remove_children(id))
                .await;
        }
        self.guarded("remove_chat", self.cache.remove_chat(chat_id))
            .await;

        debug!(chat_id = %chat_id, messages = ids.len(), "chat removed from index");
        Ok(())
    }

    /// Re-derives a cache record from an authoritative message and writes it
    /// back (cache repair). Idempotent: concurrent repairs of the same
    /// message write identical content. Returns the derived record so a
    /// walk can proceed even when the cache is unreachable.
    pub async fn repair_message(&self, message: &Message) -> CachedMessage {
        let cached = derive_cached_message(message);
        self.guarded("put_message", self.cache.put_message(&cached))
            .await;
        if let Some(parent) = &cached.parent_id {
            self.guarded("add_child", self.cache.add_child(parent, &cached.id))
                .await;
        }
        debug!(message_id = %cached.id, "cache entry repaired from system of record");
        cached
    }

    /// Wraps a single cache call with the operation timeout. Timeouts and
    /// errors degrade to `None` ("cache unavailable"), never to a failure:
    /// the index is always reconstructable from the system of record.
    async fn guarded<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = Result<T, PalaverError>>,
    ) -> Option<T> {
        match timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                warn!(op = op, error = %e, "cache operation failed; treating as unavailable");
                None
            }
            Err(_) => {
                warn!(op = op, timeout = ?self.op_timeout, "cache operation timed out; treating as unavailable");
                None
            }
        }
    }
}
