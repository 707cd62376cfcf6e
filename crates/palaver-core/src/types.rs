// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Palaver subsystem.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::tokens::EstimationMethod;

/// Unique identifier for a chat (conversation).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChatId(pub String);

/// Unique identifier for a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Unique identifier for a participant (user or bot).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One translation of a message body: a (language, text) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    /// Language code, e.g. "en" or "es".
    pub language: String,
    /// Message text in that language.
    pub text: String,
}

impl Translation {
    pub fn new(language: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            text: text.into(),
        }
    }
}

/// An authoritative message as read from the system of record.
///
/// Messages form a tree, not a strict list: edits and branches create
/// siblings under a common parent. `seq` is the insertion sequence used
/// for total ordering within a chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub chat_id: ChatId,
    /// Parent in the conversation tree. `None` for root messages.
    pub parent_id: Option<MessageId>,
    /// Author of the message. `None` for system messages.
    pub author_id: Option<UserId>,
    pub translations: Vec<Translation>,
    pub seq: i64,
}

/// Per-language, per-method token counts for a cached message.
///
/// BTreeMap keys give a deterministic "first language present" fallback
/// during window assembly and a stable serialized form, so re-deriving
/// the same entry always produces byte-identical cached content.
pub type TokenCounts = BTreeMap<String, BTreeMap<EstimationMethod, u32>>;

/// Derived per-message cache record mirroring an authoritative [`Message`].
///
/// A pure cache: safe to evict or lose entirely, reconstructable from the
/// system of record at the cost of a recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedMessage {
    pub id: MessageId,
    pub parent_id: Option<MessageId>,
    pub author_id: Option<UserId>,
    pub token_counts: TokenCounts,
}

/// One entry of an assembled context window.
///
/// The `tokenSize` carried here is the cost actually charged against the
/// model budget, and `language` is the translation it was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContextInfo {
    /// A real chat message included in the window.
    Message {
        message_id: MessageId,
        token_size: u32,
        user_id: Option<UserId>,
        language: String,
    },
    /// Injected non-chat instructions (a "task message"); carries no user.
    Text {
        text: String,
        token_size: u32,
        language: String,
    },
}

impl ContextInfo {
    /// Token cost charged against the window budget for this entry.
    pub fn token_size(&self) -> u32 {
        match self {
            ContextInfo::Message { token_size, .. } => *token_size,
            ContextInfo::Text { token_size, .. } => *token_size,
        }
    }
}

/// Cached identity of a bot participant.
///
/// Read on every candidate-response decision but changed rarely, so it is
/// cached with a ~24h TTL and never explicitly invalidated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotProfile {
    pub id: UserId,
    /// Display name matched (case-sensitively) by mention resolution.
    pub name: String,
    pub is_bot: bool,
    /// Raw settings blob, opaque to this subsystem.
    pub settings: Option<serde_json::Value>,
}

/// Per-model limits and estimation method, supplied by the provider adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Provider model identifier, e.g. "claude-sonnet-4-20250514".
    pub id: String,
    /// Maximum input tokens the model accepts.
    pub context_window: u32,
    /// Estimation method used to cost text for this model pre-generation.
    pub estimation_method: EstimationMethod,
}

/// The plain-data chat shape consumed by bot responder resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRoster {
    /// Ids of bot participants in the chat.
    pub bot_participant_ids: Vec<UserId>,
    /// Total participant count, bots included.
    pub participants_count: usize,
}

/// Token usage reported by a provider after generation.
///
/// Provider-native counts take precedence over estimator output at
/// response-accounting time; window assembly never sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A completion request handed to a provider adapter.
///
/// The adapter is responsible for turning [`ContextInfo`] entries into its
/// native message format.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub model: String,
    /// Ordered oldest-first context window.
    pub context: Vec<ContextInfo>,
    pub max_tokens: u32,
}

/// A completion response from a provider adapter.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub id: String,
    pub content: String,
    pub model: String,
    pub usage: TokenUsage,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter behind a service boundary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Cache,
    Gateway,
    Provider,
}
