// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock LLM provider adapter for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with a fixed model spec and
//! pre-configured responses, enabling fast, CI-runnable tests without
//! external API calls.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use palaver_core::error::PalaverError;
use palaver_core::tokens::EstimationMethod;
use palaver_core::types::{
    AdapterType, HealthStatus, ModelSpec, ProviderRequest, ProviderResponse, TokenUsage,
};
use palaver_core::{PluginAdapter, ProviderAdapter};

/// A mock LLM provider returning pre-configured responses.
///
/// Responses are popped from a FIFO queue. When the queue is empty,
/// a default "mock response" text is returned.
pub struct MockProvider {
    spec: ModelSpec,
    responses: Arc<Mutex<VecDeque<String>>>,
}

impl MockProvider {
    /// Create a mock provider with the given model spec and empty queue.
    pub fn new(spec: ModelSpec) -> Self {
        Self {
            spec,
            responses: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Create a mock provider with a word-count model of the given budget.
    pub fn with_context_window(context_window: u32) -> Self {
        Self::new(ModelSpec {
            id: "mock-model".to_string(),
            context_window,
            estimation_method: EstimationMethod::WordCount,
        })
    }

    /// Add a response to the end of the queue.
    pub async fn add_response(&self, text: String) {
        self.responses.lock().await.push_back(text);
    }

    /// Pop the next response, or return the default.
    async fn next_response(&self) -> String {
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "mock response".to_string())
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, PalaverError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PalaverError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    fn model_spec(&self, model: &str) -> Result<ModelSpec, PalaverError> {
        if model == self.spec.id {
            Ok(self.spec.clone())
        } else {
            Err(PalaverError::Provider {
                message: format!("unknown model: {model}"),
                source: None,
            })
        }
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, PalaverError> {
        if request.context.is_empty() {
            return Err(PalaverError::Provider {
                message: "provider requires non-empty input".to_string(),
                source: None,
            });
        }
        let text = self.next_response().await;
        Ok(ProviderResponse {
            id: format!("mock-resp-{}", uuid::Uuid::new_v4()),
            content: text,
            model: request.model,
            usage: TokenUsage {
                input_tokens: 10,
                output_tokens: 20,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palaver_core::types::ContextInfo;

    fn request(provider: &MockProvider) -> ProviderRequest {
        ProviderRequest {
            model: provider.spec.id.clone(),
            context: vec![ContextInfo::Text {
                text: "hello".into(),
                token_size: 2,
                language: "en".into(),
            }],
            max_tokens: 100,
        }
    }

    #[tokio::test]
    async fn default_response_when_queue_empty() {
        let provider = MockProvider::with_context_window(100);
        let resp = provider.complete(request(&provider)).await.unwrap();
        assert_eq!(resp.content, "mock response");
    }

    #[tokio::test]
    async fn queued_responses_returned_in_order() {
        let provider = MockProvider::with_context_window(100);
        provider.add_response("first".to_string()).await;
        provider.add_response("second".to_string()).await;

        assert_eq!(
            provider.complete(request(&provider)).await.unwrap().content,
            "first"
        );
        assert_eq!(
            provider.complete(request(&provider)).await.unwrap().content,
            "second"
        );
        // Queue exhausted, falls back to default
        assert_eq!(
            provider.complete(request(&provider)).await.unwrap().content,
            "mock response"
        );
    }

    #[tokio::test]
    async fn empty_context_is_rejected() {
        let provider = MockProvider::with_context_window(100);
        let req = ProviderRequest {
            model: provider.spec.id.clone(),
            context: vec![],
            max_tokens: 100,
        };
        assert!(provider.complete(req).await.is_err());
    }

    #[tokio::test]
    async fn model_spec_for_unknown_model_errors() {
        let provider = MockProvider::with_context_window(100);
        assert!(provider.model_spec("mock-model").is_ok());
        assert!(provider.model_spec("other-model").is_err());
    }
}
