// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the TurnStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use hearth_config::model::StorageConfig;
use hearth_core::traits::{CommittedTurn, TurnCommit};
use hearth_core::types::{
    Attachment, Conversation, Journey, JourneyStep, Message, SuggestionWindow,
};
use hearth_core::{
    AdapterKind, CapabilityAdapter, HealthStatus, HearthError, TurnStore,
};

use crate::database::Database;
use crate::{queries, turn_writer};

/// SQLite-backed turn store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`TurnStore::initialize`].
pub struct SqliteTurnStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteTurnStore {
    /// Create a new SqliteTurnStore with the given configuration.
    ///
    /// The database connection is not opened until [`TurnStore::initialize`]
    /// is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, HearthError> {
        self.db.get().ok_or_else(|| HearthError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl CapabilityAdapter for SqliteTurnStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, HearthError> {
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

    async fn shutdown(&self) -> Result<(), HearthError> {
        if let Some(db) = self.db.get() {
            db.close().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl TurnStore for SqliteTurnStore {
    async fn initialize(&self) -> Result<(), HearthError> {
        let db = Database::open(&self.config.database_path).await?;
        self.db.set(db).map_err(|_| HearthError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite turn store initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), HearthError> {
        self.db()?.close().await
    }

    // --- Conversations ---

    async fn create_conversation(&self, conversation: &Conversation) -> Result<(), HearthError> {
        queries::conversations::create_conversation(self.db()?, conversation).await
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, HearthError> {
        queries::conversations::get_conversation(self.db()?, id).await
    }

    async fn list_conversations(
        &self,
        status: Option<&str>,
    ) -> Result<Vec<Conversation>, HearthError> {
        queries::conversations::list_conversations(self.db()?, status).await
    }

    async fn close_conversation(&self, id: &str) -> Result<(), HearthError> {
        queries::conversations::close_conversation(self.db()?, id).await
    }

    // --- Messages ---

    async fn get_messages(
        &self,
        conversation_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, HearthError> {
        queries::messages::get_messages_for_conversation(self.db()?, conversation_id, limit).await
    }

    // --- Journeys ---

    async fn create_journey(
        &self,
        journey: &Journey,
        steps: &[JourneyStep],
    ) -> Result<(), HearthError> {
        queries::journeys::create_journey(self.db()?, journey, steps).await
    }

    async fn get_active_journey(
        &self,
        conversation_id: &str,
    ) -> Result<Option<Journey>, HearthError> {
        queries::journeys::get_active_journey(self.db()?, conversation_id).await
    }

    async fn get_journey_steps(&self, journey_id: &str) -> Result<Vec<JourneyStep>, HearthError> {
        queries::journeys::get_journey_steps(self.db()?, journey_id).await
    }

    async fn advance_journey(&self, journey_id: &str) -> Result<(), HearthError> {
        queries::journeys::advance_journey(self.db()?, journey_id).await
    }

    async fn get_step_attachments(
        &self,
        journey_step_id: &str,
    ) -> Result<Vec<Attachment>, HearthError> {
        queries::attachments::get_attachments_for_step(self.db()?, journey_step_id).await
    }

    // --- Suggestions ---

    async fn suggestion_window(
        &self,
        conversation_id: &str,
        k: usize,
    ) -> Result<SuggestionWindow, HearthError> {
        queries::suggestions::suggestion_window(self.db()?, conversation_id, k).await
    }

    // --- The turn commit ---

    async fn commit_turn(&self, commit: TurnCommit) -> Result<CommittedTurn, HearthError> {
        turn_writer::commit_turn(self.db()?, commit).await
    }
}
