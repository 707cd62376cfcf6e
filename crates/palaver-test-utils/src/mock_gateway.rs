// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock system-of-record gateway for deterministic testing.
//!
//! Backed by in-memory maps. Fetches are counted so tests can assert that
//! cache repair stopped hitting the system of record, and a failure switch
//! simulates upstream unavailability.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use palaver_core::error::PalaverError;
use palaver_core::types::{
    AdapterType, BotProfile, ChatId, HealthStatus, Message, MessageId, UserId,
};
use palaver_core::{MessageGateway, PluginAdapter};

/// A mock gateway serving preloaded messages and participants.
#[derive(Default)]
pub struct MockGateway {
    messages: Mutex<HashMap<MessageId, Message>>,
    participants: Mutex<HashMap<UserId, BotProfile>>,
    unavailable: AtomicBool,
    message_fetches: AtomicU64,
    participant_fetches: AtomicU64,
}

impl MockGateway {
    /// Create an empty mock gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload a message.
    pub async fn add_message(&self, message: Message) {
        self.messages.lock().await.insert(message.id.clone(), message);
    }

    /// Remove a message, as if it had been deleted upstream.
    pub async fn remove_message(&self, id: &MessageId) {
        self.messages.lock().await.remove(id);
    }

    /// Preload a participant profile.
    pub async fn add_participant(&self, profile: BotProfile) {
        self.participants
            .lock()
            .await
            .insert(profile.id.clone(), profile);
    }

    /// Flip the failure switch: when unavailable, every read errors.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `fetch_message` calls served (failures included).
    pub fn message_fetches(&self) -> u64 {
        self.message_fetches.load(Ordering::SeqCst)
    }

    /// Number of `fetch_participant` calls served (failures included).
    pub fn participant_fetches(&self) -> u64 {
        self.participant_fetches.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), PalaverError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(PalaverError::Storage {
                source: "mock gateway is unavailable".into(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PluginAdapter for MockGateway {
    fn name(&self) -> &str {
        "mock-gateway"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Gateway
    }

    async fn health_check(&self) -> Result<HealthStatus, PalaverError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Ok(HealthStatus::Unhealthy("failure switch is on".into()))
        } else {
            Ok(HealthStatus::Healthy)
        }
    }

    async fn shutdown(&self) -> Result<(), PalaverError> {
        Ok(())
    }
}

#[async_trait]
impl MessageGateway for MockGateway {
    async fn fetch_message(&self, id: &MessageId) -> Result<Option<Message>, PalaverError> {
        self.message_fetches.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.messages.lock().await.get(id).cloned())
    }

    async fn latest_message_id(
        &self,
        chat_id: &ChatId,
    ) -> Result<Option<MessageId>, PalaverError> {
        self.check_available()?;
        Ok(self
            .messages
            .lock()
            .await
            .values()
            .filter(|m| &m.chat_id == chat_id)
            .max_by_key(|m| m.seq)
            .map(|m| m.id.clone()))
    }

    async fn fetch_participant(&self, id: &UserId) -> Result<Option<BotProfile>, PalaverError> {
        self.participant_fetches.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.participants.lock().await.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palaver_core::types::Translation;

    fn make_msg(id: &str, seq: i64) -> Message {
        Message {
            id: MessageId(id.to_string()),
            chat_id: ChatId("c1".to_string()),
            parent_id: None,
            author_id: None,
            translations: vec![Translation::new("en", "hi")],
            seq,
        }
    }

    #[tokio::test]
    async fn fetches_are_counted() {
        let gateway = MockGateway::new();
        gateway.add_message(make_msg("m1", 1)).await;

        gateway
            .fetch_message(&MessageId("m1".into()))
            .await
            .unwrap();
        gateway
            .fetch_message(&MessageId("m2".into()))
            .await
            .unwrap();
        assert_eq!(gateway.message_fetches(), 2);
    }

    #[tokio::test]
    async fn latest_follows_seq() {
        let gateway = MockGateway::new();
        gateway.add_message(make_msg("m1", 1)).await;
        gateway.add_message(make_msg("m2", 2)).await;

        let latest = gateway
            .latest_message_id(&ChatId("c1".into()))
            .await
            .unwrap();
        assert_eq!(latest, Some(MessageId("m2".into())));
    }

    #[tokio::test]
    async fn failure_switch_makes_reads_error() {
        let gateway = MockGateway::new();
        gateway.add_message(make_msg("m1", 1)).await;
        gateway.set_unavailable(true);

        assert!(gateway.fetch_message(&MessageId("m1".into())).await.is_err());
        assert!(gateway
            .latest_message_id(&ChatId("c1".into()))
            .await
            .is_err());

        gateway.set_unavailable(false);
        assert!(gateway.fetch_message(&MessageId("m1".into())).await.is_ok());
    }
}
