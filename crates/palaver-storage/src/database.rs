// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread: `Database` wraps a single `tokio_rusqlite::Connection`, query
//! modules accept `&Database` and call through `conn.call()`. Do NOT create
//! additional Connection instances for writes.

use tokio_rusqlite::Connection;
use tracing::debug;

use palaver_core::PalaverError;

use crate::migrations;

/// Maps a tokio-rusqlite error into [`PalaverError::Storage`].
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> PalaverError {
    PalaverError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the SQLite system of record.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) the database at `path`, applies PRAGMAs, and runs
    /// pending migrations.
    pub async fn open(path: &str) -> Result<Self, PalaverError> {
        if let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| PalaverError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = Connection::open(path)
            .await
            .map_err(|e| PalaverError::Storage {
                source: Box::new(e),
            })?;
        Self::setup(conn, path).await
    }

    /// Opens an in-memory database (tests).
    pub async fn open_in_memory() -> Result<Self, PalaverError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| PalaverError::Storage {
                source: Box::new(e),
            })?;
        Self::setup(conn, ":memory:").await
    }

    async fn setup(conn: Connection, path: &str) -> Result<Self, PalaverError> {
        conn.call(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;",
            )
            .map_err(|e| PalaverError::Storage {
                source: Box::new(e),
            })?;
            migrations::run_migrations(conn)?;
            Ok::<(), PalaverError>(())
        })
        .await
        .map_err(|e| PalaverError::Storage {
            source: Box::new(e),
        })?;

        debug!(path = path, "database opened");
        Ok(Self { conn })
    }

    /// Returns the underlying connection handle.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoints the WAL and closes the connection.
    pub async fn close(&self) -> Result<(), PalaverError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}
