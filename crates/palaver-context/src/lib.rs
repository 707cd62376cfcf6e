// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context window assembly and message tree cache maintenance.
//!
//! The heart of Palaver:
//! - [`CacheWriter`] keeps the hot derived index consistent with every
//!   message lifecycle event (create, edit, delete, chat delete)
//! - [`WindowCollector`] walks the index backward from a starting message,
//!   accumulating per-message token costs until the model budget is met,
//!   repairing cache misses from the system of record as it goes
//! - [`MessageEvent`] is the inbound event surface for the message pipeline
//! - [`BotDirectory`] resolves bot participant profiles, cache first
//! - [`stringify_task_contexts`] renders injected "task context" objects
//!
//! The assembled window is an ordered `Vec<ContextInfo>` handed to a
//! provider adapter together with the resolved responding-bot list.

pub mod bots;
pub mod collector;
pub mod events;
pub mod task_context;
pub mod writer;

pub use bots::BotDirectory;
pub use collector::{WindowCollector, WindowRequest};
pub use events::MessageEvent;
pub use task_context::{stringify_task_contexts, TaskContext};
pub use writer::{derive_cached_message, derive_token_counts, CacheWriter};
