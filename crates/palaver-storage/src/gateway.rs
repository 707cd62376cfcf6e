// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`MessageGateway`] trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use palaver_config::model::StorageConfig;
use palaver_core::types::{BotProfile, ChatId, Message, MessageId, UserId};
use palaver_core::{AdapterType, HealthStatus, MessageGateway, PalaverError, PluginAdapter};

use crate::database::Database;
use crate::queries;

/// SQLite-backed system-of-record gateway.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`SqliteGateway::initialize`].
pub struct SqliteGateway {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteGateway {
    /// Create a new SqliteGateway with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`] is called.
    ///
    /// [`initialize`]: SqliteGateway::initialize
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Opens the database at the configured path.
    pub async fn initialize(&self) -> Result<(), PalaverError> {
        let db = Database::open(&self.config.database_path).await?;
        self.db.set(db).map_err(|_| {
            PalaverError::Internal("gateway already initialized".to_string())
        })?;
        debug!(path = %self.config.database_path, "sqlite gateway initialized");
        Ok(())
    }

    /// Checkpoints and releases the database connection.
    pub async fn close(&self) -> Result<(), PalaverError> {
        self.db()?.close().await
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, PalaverError> {
        self.db.get().ok_or_else(|| {
            PalaverError::Internal("gateway not initialized -- call initialize() first".to_string())
        })
    }

    // --- Seeding writes (message pipeline and tests; not part of MessageGateway) ---

    /// Insert a message with its translations.
    pub async fn insert_message(&self, msg: &Message) -> Result<(), PalaverError> {
        queries::messages::insert_message(self.db()?, msg).await
    }

    /// Apply an edit to a stored message.
    pub async fn update_message(&self, msg: &Message) -> Result<(), PalaverError> {
        queries::messages::update_message(self.db()?, msg).await
    }

    /// Delete a stored message.
    pub async fn delete_message(&self, id: &MessageId) -> Result<(), PalaverError> {
        queries::messages::delete_message(self.db()?, id).await
    }

    /// Insert or update a participant profile.
    pub async fn upsert_participant(&self, profile: &BotProfile) -> Result<(), PalaverError> {
        queries::participants::upsert_participant(self.db()?, profile).await
    }
}

#[async_trait]
impl PluginAdapter for SqliteGateway {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Gateway
    }

    async fn health_check(&self) -> Result<HealthStatus, PalaverError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PalaverError> {
        if self.db.get().is_some() {
            self.close().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl MessageGateway for SqliteGateway {
    async fn fetch_message(&self, id: &MessageId) -> Result<Option<Message>, PalaverError> {
        queries::messages::fetch_message(self.db()?, id).await
    }

    async fn latest_message_id(
        &self,
        chat_id: &ChatId,
    ) -> Result<Option<MessageId>, PalaverError> {
        queries::messages::latest_message_id(self.db()?, chat_id).await
    }

    async fn fetch_participant(&self, id: &UserId) -> Result<Option<BotProfile>, PalaverError> {
        queries::participants::fetch_participant(self.db()?, id).await
    }
}
