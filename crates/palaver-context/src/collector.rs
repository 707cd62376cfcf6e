// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context window assembly: the backward walk over the message tree.
//!
//! Walks parent pointers from a starting message, consulting the hot cache
//! first and falling back to the system of record on a miss (repairing the
//! cache as it goes), accumulating per-message token costs until the model
//! budget is met or the tree is exhausted. Availability of *some* context is
//! preferred over failing the request: upstream trouble ends the walk early
//! with a partial window.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};

use palaver_config::model::PalaverConfig;
use palaver_core::error::PalaverError;
use palaver_core::tokens::{estimate_tokens, EstimationMethod};
use palaver_core::types::{
    CachedMessage, ChatId, ContextInfo, Message, MessageId, ModelSpec, TokenCounts,
};
use palaver_core::{ContextCache, MessageGateway};

use crate::writer::CacheWriter;

/// Inputs for one window assembly.
#[derive(Debug, Clone)]
pub struct WindowRequest {
    /// Chat to walk. `None` assembles a window from the task message alone.
    pub chat_id: Option<ChatId>,
    /// Caller's preferred languages, most preferred first.
    pub languages: Vec<String>,
    /// Target model limits and estimation method.
    pub model: ModelSpec,
    /// Starting message. Defaults to the chat's most recent message.
    pub latest_message_id: Option<MessageId>,
    /// Injected non-chat instructions, charged against the same budget.
    pub task_message: Option<String>,
}

/// Outcome of one guarded gateway fetch.
enum GatewayFetch {
    Found(Message),
    Missing,
    Unavailable,
}

/// Assembles token-budgeted context windows.
pub struct WindowCollector {
    cache: Arc<dyn ContextCache>,
    gateway: Arc<dyn MessageGateway>,
    writer: CacheWriter,
    default_language: String,
    max_hops: u32,
    op_timeout: Duration,
}

impl WindowCollector {
    /// Creates a collector over the given cache and gateway.
    ///
    /// The collector owns a [`CacheWriter`] over the same cache for the
    /// repair path, so repairs use the exact merge semantics of the
    /// lifecycle write path.
    pub fn new(
        cache: Arc<dyn ContextCache>,
        gateway: Arc<dyn MessageGateway>,
        config: &PalaverConfig,
    ) -> Self {
        Self {
            writer: CacheWriter::new(cache.clone(), &config.cache),
            cache,
            gateway,
            default_language: config.context.default_language.clone(),
            max_hops: config.context.max_walk_hops,
            op_timeout: Duration::from_millis(config.cache.op_timeout_ms),
        }
    }

    /// Assembles a context window, oldest entry first.
    ///
    /// The returned entries never sum past the model's context window
    /// (strict budget: a message that would overshoot is excluded, ending
    /// the walk). An injected task message, if it fits at all, is always
    /// the first entry.
    pub async fn collect(
        &self,
        request: &WindowRequest,
    ) -> Result<Vec<ContextInfo>, PalaverError> {
        let context_size = request.model.context_window;
        let method = request.model.estimation_method;
        let mut total: u32 = 0;

        let task_entry = request.task_message.as_deref().and_then(|task| {
            let language = request
                .languages
                .first()
                .cloned()
                .unwrap_or_else(|| self.default_language.clone());
            let cost = estimate_tokens(task, method);
            if cost > context_size {
                warn!(
                    cost = cost,
                    context_size = context_size,
                    "task message alone exceeds the model budget; dropping it"
                );
                return None;
            }
            total += cost;
            Some(ContextInfo::Text {
                text: task.to_string(),
                token_size: cost,
                language,
            })
        });

        let mut entries = Vec::new();
        if let Some(chat_id) = &request.chat_id {
            let mut current = match &request.latest_message_id {
                Some(id) => Some(id.clone()),
                None => self.resolve_latest(chat_id).await,
            };
            let mut hops: u32 = 0;

            // Walk newest to oldest over an owned current id; bounded by the
            // token budget and the hop counter (cycle defense).
            while let Some(id) = current.take() {
                if total >= context_size {
                    break;
                }
                hops += 1;
                if hops > self.max_hops {
                    warn!(
                        chat_id = %chat_id,
                        max_hops = self.max_hops,
                        "walk exceeded hop bound; possible cycle in source data"
                    );
                    break;
                }

                let cached = match self.guarded_get(&id).await {
                    Some(cached) => cached,
                    None => match self.fetch_authoritative(&id).await {
                        GatewayFetch::Found(message) => {
                            if message.translations.is_empty() {
                                // Data-integrity gap: skip the message but
                                // keep walking toward its stored parent.
                                warn!(message_id = %id, "message has zero translations; skipping");
                                current = message.parent_id.clone();
                                continue;
                            }
                            self.writer.repair_message(&message).await
                        }
                        GatewayFetch::Missing => {
                            debug!(message_id = %id, "message not found anywhere; ending walk");
                            break;
                        }
                        GatewayFetch::Unavailable => {
                            warn!(message_id = %id, "system of record unavailable; returning partial window");
                            break;
                        }
                    },
                };

                let Some((language, count)) =
                    select_token_count(&cached.token_counts, &request.languages, method)
                else {
                    warn!(message_id = %id, "no usable token count in any language; ending walk");
                    break;
                };
                // A zero-cost message must still consume budget, or the
                // budget bound no longer bounds the walk.
                let count = count.max(1);

                if total + count > context_size {
                    break;
                }
                total += count;
                entries.push(ContextInfo::Message {
                    message_id: id,
                    token_size: count,
                    user_id: cached.author_id.clone(),
                    language,
                });
                current = cached.parent_id.clone();
            }
        }

        // The walk ran newest to oldest; output is chronological, with the
        // task entry (injected instructions) always oldest.
        entries.reverse();
        let mut window = Vec::with_capacity(entries.len() + 1);
        window.extend(task_entry);
        window.extend(entries);

        if window.is_empty() {
            warn!(
                model = request.model.id.as_str(),
                "assembled context window is empty; some providers reject empty input"
            );
        } else {
            debug!(
                model = request.model.id.as_str(),
                entries = window.len(),
                tokens = total,
                "context window assembled"
            );
        }
        Ok(window)
    }

    /// Resolves the walk starting point when the caller supplied none:
    /// the cache's chat sequence first, the system of record on a miss.
    async fn resolve_latest(&self, chat_id: &ChatId) -> Option<MessageId> {
        match timeout(self.op_timeout, self.cache.latest_chat_message(chat_id)).await {
            Ok(Ok(Some(id))) => return Some(id),
            Ok(Ok(None)) => {}
            Ok(Err(e)) => warn!(chat_id = %chat_id, error = %e, "latest-message cache read failed"),
            Err(_) => warn!(chat_id = %chat_id, "latest-message cache read timed out"),
        }
        match timeout(self.op_timeout, self.gateway.latest_message_id(chat_id)).await {
            Ok(Ok(id)) => id,
            Ok(Err(e)) => {
                warn!(chat_id = %chat_id, error = %e, "latest-message gateway read failed");
                None
            }
            Err(_) => {
                warn!(chat_id = %chat_id, "latest-message gateway read timed out");
                None
            }
        }
    }

    /// Cache read degraded to a miss on timeout or error.
    async fn guarded_get(&self, id: &MessageId) -> Option<CachedMessage> {
        match timeout(self.op_timeout, self.cache.get_message(id)).await {
            Ok(Ok(cached)) => cached,
            Ok(Err(e)) => {
                warn!(message_id = %id, error = %e, "cache read failed; treating as miss");
                None
            }
            Err(_) => {
                warn!(message_id = %id, "cache read timed out; treating as miss");
                None
            }
        }
    }

    async fn fetch_authoritative(&self, id: &MessageId) -> GatewayFetch {
        match timeout(self.op_timeout, self.gateway.fetch_message(id)).await {
            Ok(Ok(Some(message))) => GatewayFetch::Found(message),
            Ok(Ok(None)) => GatewayFetch::Missing,
            Ok(Err(e)) => {
                warn!(message_id = %id, error = %e, "gateway fetch failed");
                GatewayFetch::Unavailable
            }
            Err(_) => {
                warn!(message_id = %id, "gateway fetch timed out");
                GatewayFetch::Unavailable
            }
        }
    }
}

/// Selects the token count for a message under the caller's language
/// preference: each preferred language in order, then the first language
/// present (deterministic BTreeMap order) carrying the requested method.
fn select_token_count(
    counts: &TokenCounts,
    languages: &[String],
    method: EstimationMethod,
) -> Option<(String, u32)> {
    for language in languages {
        if let Some(count) = counts.get(language).and_then(|m| m.get(&method)) {
            return Some((language.clone(), *count));
        }
    }
    counts
        .iter()
        .find_map(|(language, methods)| methods.get(&method).map(|c| (language.clone(), *c)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn counts(entries: &[(&str, u32)]) -> TokenCounts {
        let mut map = TokenCounts::new();
        for (language, count) in entries {
            let mut methods = BTreeMap::new();
            methods.insert(EstimationMethod::WordCount, *count);
            map.insert(language.to_string(), methods);
        }
        map
    }

    #[test]
    fn preferred_language_wins() {
        let counts = counts(&[("en", 3), ("es", 5)]);
        let selected = select_token_count(
            &counts,
            &["es".to_string(), "en".to_string()],
            EstimationMethod::WordCount,
        );
        assert_eq!(selected, Some(("es".to_string(), 5)));
    }

    #[test]
    fn falls_back_to_first_language_present() {
        let counts = counts(&[("es", 5), ("fr", 2)]);
        let selected = select_token_count(
            &counts,
            &["en".to_string()],
            EstimationMethod::WordCount,
        );
        // BTreeMap order: "es" before "fr".
        assert_eq!(selected, Some(("es".to_string(), 5)));
    }

    #[test]
    fn missing_method_yields_none() {
        let counts = counts(&[("en", 3)]);
        let selected = select_token_count(
            &counts,
            &["en".to_string()],
            EstimationMethod::Cl100kBase,
        );
        assert!(selected.is_none());
    }

    #[test]
    fn empty_counts_yield_none() {
        let selected = select_token_count(
            &TokenCounts::new(),
            &["en".to_string()],
            EstimationMethod::WordCount,
        );
        assert!(selected.is_none());
    }
}
