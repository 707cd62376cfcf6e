// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite system-of-record gateway for the Palaver context subsystem.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a
//! single-writer concurrency model via `tokio-rusqlite`, and typed point
//! reads for messages (with translations), latest-message lookups, and
//! participant profiles. The context subsystem only reads through the
//! [`palaver_core::MessageGateway`] trait; seeding writes exist for the
//! external message pipeline and for tests.

pub mod database;
pub mod gateway;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::Database;
pub use gateway::SqliteGateway;
pub use models::*;
