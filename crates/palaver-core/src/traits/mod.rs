// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the Palaver service boundaries.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod cache;
pub mod gateway;
pub mod provider;

// Re-export all traits at the traits module level for convenience.
pub use adapter::PluginAdapter;
pub use cache::ContextCache;
pub use gateway::MessageGateway;
pub use provider::ProviderAdapter;
