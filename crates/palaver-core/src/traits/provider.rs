// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for language-model integrations.
//!
//! Provider internals are out of scope; the contract surface used by this
//! subsystem is "what are model M's limits" and "generate a completion from
//! an ordered message list".

use async_trait::async_trait;

use crate::error::PalaverError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ModelSpec, ProviderRequest, ProviderResponse};

/// Adapter for language-model provider integrations.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Returns the context-size limit and estimation method for a model.
    fn model_spec(&self, model: &str) -> Result<ModelSpec, PalaverError>;

    /// Sends a completion request built from an assembled context window.
    ///
    /// The response carries provider-native token usage, which takes
    /// precedence over estimates at accounting time.
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, PalaverError>;
}
