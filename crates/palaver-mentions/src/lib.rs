// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bot responder resolution for the Palaver context subsystem.
//!
//! Given an incoming message, the sender, and a chat's bot roster, decides
//! which bot participants must produce a reply. Operates on plain data only
//! (no cache dependency) so decisions are bounded, deterministic, and cheap
//! on the hot path of every message send.

pub mod resolver;

pub use resolver::MentionResolver;
