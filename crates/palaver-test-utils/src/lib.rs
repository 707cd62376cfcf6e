// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Palaver integration tests.
//!
//! Provides mock adapters for fast, deterministic, CI-runnable tests
//! without external services.
//!
//! # Components
//!
//! - [`MockGateway`] - Mock system of record with fetch counters and a
//!   failure switch for degradation tests
//! - [`MockProvider`] - Mock LLM provider with a fixed model spec and
//!   pre-configured responses

pub mod mock_gateway;
pub mod mock_provider;

pub use mock_gateway::MockGateway;
pub use mock_provider::MockProvider;
