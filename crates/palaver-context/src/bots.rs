// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache-aside lookup of bot profiles.
//!
//! Bot identity is read on every candidate-response decision but changes
//! rarely, so profiles are cached lazily with the configured TTL. A stale
//! profile within the TTL window is acceptable; nothing invalidates one.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};

use palaver_config::model::CacheConfig;
use palaver_core::error::PalaverError;
use palaver_core::types::{BotProfile, UserId};
use palaver_core::{ContextCache, MessageGateway};

/// Resolves bot participant ids to profiles, cache first.
pub struct BotDirectory {
    cache: Arc<dyn ContextCache>,
    gateway: Arc<dyn MessageGateway>,
    op_timeout: Duration,
}

impl BotDirectory {
    pub fn new(
        cache: Arc<dyn ContextCache>,
        gateway: Arc<dyn MessageGateway>,
        config: &CacheConfig,
    ) -> Self {
        Self {
            cache,
            gateway,
            op_timeout: Duration::from_millis(config.op_timeout_ms),
        }
    }

    /// Returns profiles for the given participant ids, preserving order.
    ///
    /// Unknown ids are skipped with a log line; a responder decision over a
    /// partial roster beats failing the whole send.
    pub async fn bot_profiles(&self, ids: &[UserId]) -> Result<Vec<BotProfile>, PalaverError> {
        let mut profiles = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(profile) = self.lookup(id).await {
                profiles.push(profile);
            } else {
                debug!(user_id = %id, "no profile found for participant; skipping");
            }
        }
        Ok(profiles)
    }

    /// Single profile lookup: cache hit, else gateway fetch + write-back.
    async fn lookup(&self, id: &UserId) -> Option<BotProfile> {
        match timeout(self.op_timeout, self.cache.get_bot_profile(id)).await {
            Ok(Ok(Some(profile))) => return Some(profile),
            Ok(Ok(None)) => {}
            Ok(Err(e)) => warn!(user_id = %id, error = %e, "bot profile cache read failed"),
            Err(_) => warn!(user_id = %id, "bot profile cache read timed out"),
        }

        let fetched = match timeout(self.op_timeout, self.gateway.fetch_participant(id)).await {
            Ok(Ok(profile)) => profile,
            Ok(Err(e)) => {
                warn!(user_id = %id, error = %e, "participant gateway fetch failed");
                None
            }
            Err(_) => {
                warn!(user_id = %id, "participant gateway fetch timed out");
                None
            }
        }?;

        if let Ok(Err(e)) = timeout(self.op_timeout, self.cache.put_bot_profile(&fetched)).await {
            warn!(user_id = %id, error = %e, "bot profile write-back failed");
        }
        Some(fetched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palaver_cache::MemoryCache;
    use palaver_test_utils::MockGateway;

    fn profile(id: &str, name: &str) -> BotProfile {
        BotProfile {
            id: UserId(id.to_string()),
            name: name.to_string(),
            is_bot: true,
            settings: None,
        }
    }

    #[tokio::test]
    async fn miss_fetches_and_writes_back() {
        let cache = Arc::new(MemoryCache::default());
        let gateway = Arc::new(MockGateway::new());
        gateway.add_participant(profile("bot-1", "Alice")).await;

        let directory = BotDirectory::new(cache.clone(), gateway.clone(), &CacheConfig::default());

        let profiles = directory
            .bot_profiles(&[UserId("bot-1".into())])
            .await
            .unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].name, "Alice");

        // Write-back happened; a second lookup never reaches the gateway.
        assert_eq!(gateway.participant_fetches(), 1);
        directory
            .bot_profiles(&[UserId("bot-1".into())])
            .await
            .unwrap();
        assert_eq!(gateway.participant_fetches(), 1);
    }

    #[tokio::test]
    async fn unknown_participants_are_skipped() {
        let cache = Arc::new(MemoryCache::default());
        let gateway = Arc::new(MockGateway::new());
        gateway.add_participant(profile("bot-1", "Alice")).await;

        let directory = BotDirectory::new(cache, gateway, &CacheConfig::default());

        let profiles = directory
            .bot_profiles(&[UserId("ghost".into()), UserId("bot-1".into())])
            .await
            .unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].id, UserId("bot-1".into()));
    }
}
