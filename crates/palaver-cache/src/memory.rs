// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Concurrent in-memory implementation of the [`ContextCache`] trait.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use moka::future::Cache;
use tracing::debug;

use palaver_config::model::CacheConfig;
use palaver_core::error::PalaverError;
use palaver_core::types::{AdapterType, BotProfile, CachedMessage, ChatId, HealthStatus, MessageId, UserId};
use palaver_core::{ContextCache, PluginAdapter};

/// Upper bound on cached bot profiles; old entries are evicted by moka.
const BOT_PROFILE_CAPACITY: u64 = 10_000;

/// In-memory hot cache.
///
/// Message records, chat sequences, and child sets live in `DashMap`s and
/// never expire (their lifecycle is driven by the cache writer). Bot
/// profiles live in a `moka` cache with a configured TTL and are created
/// lazily on first lookup; a stale profile within the TTL window is
/// acceptable.
pub struct MemoryCache {
    messages: DashMap<MessageId, CachedMessage>,
    /// Per-chat (score, id) pairs, kept sorted by score ascending.
    chats: DashMap<ChatId, Vec<(i64, MessageId)>>,
    children: DashMap<MessageId, HashSet<MessageId>>,
    bots: Cache<UserId, BotProfile>,
}

impl MemoryCache {
    /// Creates a cache with the configured bot-profile TTL.
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_bot_profile_ttl(Duration::from_secs(config.bot_profile_ttl_secs))
    }

    /// Creates a cache with an explicit bot-profile TTL.
    pub fn with_bot_profile_ttl(ttl: Duration) -> Self {
        Self {
            messages: DashMap::new(),
            chats: DashMap::new(),
            children: DashMap::new(),
            bots: Cache::builder()
                .max_capacity(BOT_PROFILE_CAPACITY)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Number of cached message records (test visibility).
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

#[async_trait]
impl PluginAdapter for MemoryCache {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Cache
    }

    async fn health_check(&self) -> Result<HealthStatus, PalaverError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PalaverError> {
        self.bots.invalidate_all();
        debug!(messages = self.messages.len(), "memory cache shut down");
        Ok(())
    }
}

#[async_trait]
impl ContextCache for MemoryCache {
    async fn get_message(&self, id: &MessageId) -> Result<Option<CachedMessage>, PalaverError> {
        Ok(self.messages.get(id).map(|entry| entry.value().clone()))
    }

    async fn put_message(&self, message: &CachedMessage) -> Result<(), PalaverError> {
        self.messages.insert(message.id.clone(), message.clone());
        Ok(())
    }

    async fn remove_message(&self, id: &MessageId) -> Result<(), PalaverError> {
        self.messages.remove(id);
        Ok(())
    }

    async fn push_chat_message(
        &self,
        chat_id: &ChatId,
        id: &MessageId,
        score: i64,
    ) -> Result<(), PalaverError> {
        let mut seq = self.chats.entry(chat_id.clone()).or_default();
        // Re-pushing an id updates its score rather than duplicating it.
        seq.retain(|(_, existing)| existing != id);
        let pos = seq.partition_point(|(s, _)| *s <= score);
        seq.insert(pos, (score, id.clone()));
        Ok(())
    }

    async fn remove_chat_message(
        &self,
        chat_id: &ChatId,
        id: &MessageId,
    ) -> Result<(), PalaverError> {
        if let Some(mut seq) = self.chats.get_mut(chat_id) {
            seq.retain(|(_, existing)| existing != id);
        }
        Ok(())
    }

    async fn chat_message_ids(&self, chat_id: &ChatId) -> Result<Vec<MessageId>, PalaverError> {
        Ok(self
            .chats
            .get(chat_id)
            .map(|seq| seq.iter().map(|(_, id)| id.clone()).collect())
            .unwrap_or_default())
    }

    async fn latest_chat_message(
        &self,
        chat_id: &ChatId,
    ) -> Result<Option<MessageId>, PalaverError> {
        Ok(self
            .chats
            .get(chat_id)
            .and_then(|seq| seq.last().map(|(_, id)| id.clone())))
    }

    async fn remove_chat(&self, chat_id: &ChatId) -> Result<(), PalaverError> {
        self.chats.remove(chat_id);
        Ok(())
    }

    async fn add_child(
        &self,
        parent_id: &MessageId,
        child_id: &MessageId,
    ) -> Result<(), PalaverError> {
        self.children
            .entry(parent_id.clone())
            .or_default()
            .insert(child_id.clone());
        Ok(())
    }

    async fn remove_child(
        &self,
        parent_id: &MessageId,
        child_id: &MessageId,
    ) -> Result<(), PalaverError> {
        if let Some(mut set) = self.children.get_mut(parent_id) {
            set.remove(child_id);
        }
        Ok(())
    }

    async fn children(&self, parent_id: &MessageId) -> Result<Vec<MessageId>, PalaverError> {
        let mut ids: Vec<MessageId> = self
            .children
            .get(parent_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        Ok(ids)
    }

    async fn remove_children(&self, parent_id: &MessageId) -> Result<(), PalaverError> {
        self.children.remove(parent_id);
        Ok(())
    }

    async fn get_bot_profile(&self, id: &UserId) -> Result<Option<BotProfile>, PalaverError> {
        Ok(self.bots.get(id).await)
    }

    async fn put_bot_profile(&self, profile: &BotProfile) -> Result<(), PalaverError> {
        self.bots.insert(profile.id.clone(), profile.clone()).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palaver_core::types::TokenCounts;

    fn cached(id: &str, parent: Option<&str>) -> CachedMessage {
        CachedMessage {
            id: MessageId(id.to_string()),
            parent_id: parent.map(|p| MessageId(p.to_string())),
            author_id: None,
            token_counts: TokenCounts::new(),
        }
    }

    #[tokio::test]
    async fn put_get_remove_message() {
        let cache = MemoryCache::default();
        let msg = cached("m1", None);

        assert!(cache.get_message(&msg.id).await.unwrap().is_none());
        cache.put_message(&msg).await.unwrap();
        assert_eq!(cache.get_message(&msg.id).await.unwrap(), Some(msg.clone()));
        cache.remove_message(&msg.id).await.unwrap();
        assert!(cache.get_message(&msg.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_message_is_idempotent() {
        let cache = MemoryCache::default();
        let msg = cached("m1", Some("m0"));

        cache.put_message(&msg).await.unwrap();
        cache.put_message(&msg).await.unwrap();
        assert_eq!(cache.message_count(), 1);
        assert_eq!(cache.get_message(&msg.id).await.unwrap(), Some(msg));
    }

    #[tokio::test]
    async fn chat_sequence_orders_by_score() {
        let cache = MemoryCache::default();
        let chat = ChatId("c1".into());

        cache
            .push_chat_message(&chat, &MessageId("m2".into()), 200)
            .await
            .unwrap();
        cache
            .push_chat_message(&chat, &MessageId("m1".into()), 100)
            .await
            .unwrap();
        cache
            .push_chat_message(&chat, &MessageId("m3".into()), 300)
            .await
            .unwrap();

        let ids = cache.chat_message_ids(&chat).await.unwrap();
        assert_eq!(
            ids,
            vec![
                MessageId("m1".into()),
                MessageId("m2".into()),
                MessageId("m3".into())
            ]
        );
        assert_eq!(
            cache.latest_chat_message(&chat).await.unwrap(),
            Some(MessageId("m3".into()))
        );
    }

    #[tokio::test]
    async fn repushing_updates_score_without_duplicating() {
        let cache = MemoryCache::default();
        let chat = ChatId("c1".into());
        let id = MessageId("m1".into());

        cache.push_chat_message(&chat, &id, 100).await.unwrap();
        cache.push_chat_message(&chat, &id, 400).await.unwrap();
        cache
            .push_chat_message(&chat, &MessageId("m2".into()), 200)
            .await
            .unwrap();

        let ids = cache.chat_message_ids(&chat).await.unwrap();
        assert_eq!(ids, vec![MessageId("m2".into()), MessageId("m1".into())]);
    }

    #[tokio::test]
    async fn remove_chat_message_and_chat() {
        let cache = MemoryCache::default();
        let chat = ChatId("c1".into());
        let id = MessageId("m1".into());

        cache.push_chat_message(&chat, &id, 100).await.unwrap();
        cache.remove_chat_message(&chat, &id).await.unwrap();
        assert!(cache.chat_message_ids(&chat).await.unwrap().is_empty());
        assert!(cache.latest_chat_message(&chat).await.unwrap().is_none());

        cache.push_chat_message(&chat, &id, 100).await.unwrap();
        cache.remove_chat(&chat).await.unwrap();
        assert!(cache.chat_message_ids(&chat).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn child_sets_are_deduplicated_and_sorted() {
        let cache = MemoryCache::default();
        let parent = MessageId("p".into());

        cache
            .add_child(&parent, &MessageId("b".into()))
            .await
            .unwrap();
        cache
            .add_child(&parent, &MessageId("a".into()))
            .await
            .unwrap();
        cache
            .add_child(&parent, &MessageId("b".into()))
            .await
            .unwrap();

        let children = cache.children(&parent).await.unwrap();
        assert_eq!(children, vec![MessageId("a".into()), MessageId("b".into())]);

        cache
            .remove_child(&parent, &MessageId("a".into()))
            .await
            .unwrap();
        assert_eq!(
            cache.children(&parent).await.unwrap(),
            vec![MessageId("b".into())]
        );

        cache.remove_children(&parent).await.unwrap();
        assert!(cache.children(&parent).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bot_profiles_round_trip() {
        let cache = MemoryCache::default();
        let profile = BotProfile {
            id: UserId("bot-1".into()),
            name: "Alice".into(),
            is_bot: true,
            settings: Some(serde_json::json!({"temperature": 0.7})),
        };

        assert!(cache.get_bot_profile(&profile.id).await.unwrap().is_none());
        cache.put_bot_profile(&profile).await.unwrap();
        assert_eq!(
            cache.get_bot_profile(&profile.id).await.unwrap(),
            Some(profile)
        );
    }

    #[tokio::test]
    async fn bot_profiles_expire_after_ttl() {
        let cache = MemoryCache::with_bot_profile_ttl(Duration::from_millis(50));
        let profile = BotProfile {
            id: UserId("bot-1".into()),
            name: "Alice".into(),
            is_bot: true,
            settings: None,
        };

        cache.put_bot_profile(&profile).await.unwrap();
        assert!(cache.get_bot_profile(&profile.id).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(cache.get_bot_profile(&profile.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn adapter_identity() {
        let cache = MemoryCache::default();
        assert_eq!(cache.name(), "memory");
        assert_eq!(cache.adapter_type(), AdapterType::Cache);
        assert_eq!(
            cache.health_check().await.unwrap(),
            HealthStatus::Healthy
        );
        cache.shutdown().await.unwrap();
    }
}
