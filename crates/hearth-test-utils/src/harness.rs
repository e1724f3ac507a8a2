// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Full-pipeline test harness.
//!
//! Builds a [`TurnPipeline`] over a tempdir SQLite database and mock
//! capabilities, keeping handles to every mock so tests can script
//! failures and inspect call counts. Timeouts are shortened so failure
//! paths run quickly.

use std::sync::Arc;

use tempfile::TempDir;

use hearth_config::model::HearthConfig;
use hearth_core::types::{ConversationMode, Identity, IncomingAttachment, TurnRequest};
use hearth_core::TurnStore;
use hearth_pipeline::{PipelineDeps, TurnPipeline};
use hearth_storage::SqliteTurnStore;

use crate::mock_generation::MockGeneration;
use crate::mock_index::MockIndex;
use crate::mock_tools::{MockContractorLookup, MockImageGeneration, MockSearch};

/// A fully wired pipeline over mocks and a throwaway database.
pub struct TestHarness {
    pub pipeline: Arc<TurnPipeline>,
    pub store: Arc<SqliteTurnStore>,
    pub generation: Arc<MockGeneration>,
    pub image: Arc<MockImageGeneration>,
    pub search: Arc<MockSearch>,
    pub contractors: Arc<MockContractorLookup>,
    pub index: Arc<MockIndex>,
    pub config: HearthConfig,
    _dir: TempDir,
}

impl TestHarness {
    /// Build a harness with default mocks and fast timeouts.
    pub async fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let mut config = HearthConfig::default();
        config.storage.database_path = dir
            .path()
            .join("harness.db")
            .to_string_lossy()
            .into_owned();
        // Short timeouts keep failure-path tests fast. The ordering
        // invariant (per-tool < enrichment < turn) still holds.
        config.pipeline.per_tool_timeout_secs = 1;
        config.pipeline.enrichment_timeout_secs = 2;
        config.pipeline.turn_timeout_secs = 10;

        let store = Arc::new(SqliteTurnStore::new(config.storage.clone()));
        store.initialize().await.expect("storage initializes");

        let generation = Arc::new(MockGeneration::new());
        let image = Arc::new(MockImageGeneration::new());
        let search = Arc::new(MockSearch::new());
        let contractors = Arc::new(MockContractorLookup::new());
        let index = Arc::new(MockIndex::empty());

        let pipeline = TurnPipeline::new(
            PipelineDeps {
                store: Arc::clone(&store) as Arc<dyn TurnStore>,
                index: Arc::clone(&index) as _,
                generation: Arc::clone(&generation) as _,
                // Keyword-only classification keeps tests deterministic.
                classifier_generation: None,
                image: Arc::clone(&image) as _,
                search: Arc::clone(&search) as _,
                contractors: Arc::clone(&contractors) as _,
            },
            &config,
        );

        Self {
            pipeline: Arc::new(pipeline),
            store,
            generation,
            image,
            search,
            contractors,
            index,
            config,
            _dir: dir,
        }
    }

    /// A turn request with no attachments.
    pub fn turn(&self, conversation_id: &str, text: &str, mode: ConversationMode) -> TurnRequest {
        TurnRequest {
            conversation_id: conversation_id.to_string(),
            identity: Identity::Anonymous,
            text: text.to_string(),
            attachments: vec![],
            mode,
        }
    }

    /// A turn request carrying attachments.
    pub fn turn_with_attachments(
        &self,
        conversation_id: &str,
        text: &str,
        mode: ConversationMode,
        attachments: Vec<IncomingAttachment>,
    ) -> TurnRequest {
        TurnRequest {
            conversation_id: conversation_id.to_string(),
            identity: Identity::Anonymous,
            text: text.to_string(),
            attachments,
            mode,
        }
    }
}
