// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Palaver context subsystem.
//!
//! This crate provides the foundational trait definitions, error type,
//! token estimator, and common types used throughout the Palaver
//! workspace. The cache, storage, and provider service boundaries all
//! implement traits defined here.

pub mod error;
pub mod tokens;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::PalaverError;
pub use tokens::{estimate_for_model, estimate_tokens, EstimationMethod};
pub use types::{AdapterType, ChatId, HealthStatus, MessageId, UserId};

// Re-export all adapter traits at crate root.
pub use traits::{ContextCache, MessageGateway, PluginAdapter, ProviderAdapter};
