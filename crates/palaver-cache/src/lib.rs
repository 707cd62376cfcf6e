// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process hot cache for the Palaver message tree index.
//!
//! [`MemoryCache`] implements the [`palaver_core::ContextCache`] trait with
//! concurrent maps for message records, ordered per-chat sequences, and
//! per-parent child sets, plus a TTL-bounded bot-profile cache. It is both
//! the default deployment cache and the injectable fake that tests use in
//! place of an external key-value service.

pub mod memory;

pub use memory::MemoryCache;
