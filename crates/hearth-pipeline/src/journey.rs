// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Journey management for a turn.
//!
//! When the conversation has an active journey and the turn carried or
//! produced image attachments, they are linked to the journey's current
//! (in-progress) step. No step is ever auto-created here; advancing a
//! journey is a separate operation outside the turn pipeline. Failures are
//! logged and the turn proceeds without the linkage.

use hearth_core::traits::JourneyAttach;
use hearth_core::types::{JourneyDelta, StepStatus};
use hearth_core::{HearthError, TurnStore};
use tracing::{debug, warn};

/// The planned journey mutation for a turn, applied inside the commit
/// transaction.
#[derive(Debug, Clone)]
pub struct JourneyPlan {
    pub attach: JourneyAttach,
    pub delta: JourneyDelta,
}

/// Decide whether this turn's image attachments belong on a journey step.
///
/// Returns `None` (never an error) when there is no active journey, no
/// current step, or nothing to attach -- and when the lookup itself fails,
/// since journey linkage is non-fatal to the turn.
pub async fn plan_attachment(
    store: &dyn TurnStore,
    conversation_id: &str,
    image_attachment_ids: &[String],
) -> Option<JourneyPlan> {
    if image_attachment_ids.is_empty() {
        return None;
    }

    let journey = match store.get_active_journey(conversation_id).await {
        Ok(Some(journey)) => journey,
        Ok(None) => return None,
        Err(e) => {
            warn!(error = %e, "journey lookup failed, turn proceeds without attachment");
            return None;
        }
    };

    let steps = match store.get_journey_steps(&journey.id).await {
        Ok(steps) => steps,
        Err(e) => {
            warn!(error = %e, "journey step lookup failed, turn proceeds without attachment");
            return None;
        }
    };

    // The single-current-step invariant: attach only to the one in-progress
    // step. With no current step the linkage is skipped, never auto-created.
    let Some(current) = steps.iter().find(|s| s.status == StepStatus::InProgress) else {
        debug!(journey_id = %journey.id, "no in-progress step, skipping journey attachment");
        return None;
    };

    debug!(
        journey_id = %journey.id,
        step_id = %current.id,
        attachments = image_attachment_ids.len(),
        "attaching turn images to journey step"
    );

    Some(JourneyPlan {
        attach: JourneyAttach {
            journey_id: journey.id.clone(),
            step_id: current.id.clone(),
            attachment_ids: image_attachment_ids.to_vec(),
        },
        delta: JourneyDelta {
            journey_id: journey.id,
            step_id: current.id.clone(),
            attachment_ids: image_attachment_ids.to_vec(),
        },
    })
}

/// Invariant check: a journey holds at most one in-progress step.
pub fn single_current_step_holds(steps: &[hearth_core::types::JourneyStep]) -> bool {
    steps
        .iter()
        .filter(|s| s.status == StepStatus::InProgress)
        .count()
        <= 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_config::model::StorageConfig;
    use hearth_core::types::{
        Conversation, ConversationMode, ConversationStatus, HomeScope, Journey, JourneyStatus,
        JourneyStep, Persona, Scenario,
    };
    use hearth_storage::SqliteTurnStore;
    use tempfile::tempdir;

    async fn store_with_conversation() -> (SqliteTurnStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = SqliteTurnStore::new(StorageConfig {
            database_path: dir.path().join("journey.db").to_string_lossy().into_owned(),
            wal_mode: true,
        });
        store.initialize().await.unwrap();

        let conversation = Conversation {
            id: "conv-1".into(),
            persona: Persona::Homeowner,
            scenario: Scenario::DiyProjectPlan,
            scope: HomeScope::default(),
            mode: ConversationMode::Agent,
            status: ConversationStatus::Active,
            created_at: "2026-01-01T00:00:00.000Z".into(),
            updated_at: "2026-01-01T00:00:00.000Z".into(),
        };
        store.create_conversation(&conversation).await.unwrap();
        (store, dir)
    }

    fn journey_with_steps(n: usize) -> (Journey, Vec<JourneyStep>) {
        let journey = Journey {
            id: "j-1".into(),
            conversation_id: "conv-1".into(),
            template: "paint_room".into(),
            status: JourneyStatus::Active,
            created_at: "2026-01-01T00:00:00.000Z".into(),
        };
        let steps = (0..n)
            .map(|i| JourneyStep {
                id: format!("j-1-step-{i}"),
                journey_id: "j-1".into(),
                position: i as i64,
                title: format!("Step {i}"),
                status: StepStatus::Pending,
            })
            .collect();
        (journey, steps)
    }

    #[tokio::test]
    async fn no_attachments_means_no_plan() {
        let (store, _dir) = store_with_conversation().await;
        let plan = plan_attachment(&store, "conv-1", &[]).await;
        assert!(plan.is_none());
    }

    #[tokio::test]
    async fn no_active_journey_means_no_plan() {
        let (store, _dir) = store_with_conversation().await;
        let plan = plan_attachment(&store, "conv-1", &["att-1".into()]).await;
        assert!(plan.is_none());
    }

    #[tokio::test]
    async fn attaches_to_the_current_step() {
        let (store, _dir) = store_with_conversation().await;
        let (journey, steps) = journey_with_steps(3);
        store.create_journey(&journey, &steps).await.unwrap();

        let plan = plan_attachment(&store, "conv-1", &["att-1".into(), "att-2".into()])
            .await
            .expect("plan for active journey with current step");
        assert_eq!(plan.attach.step_id, "j-1-step-0");
        assert_eq!(plan.attach.attachment_ids.len(), 2);
        assert_eq!(plan.delta.journey_id, "j-1");
    }

    #[tokio::test]
    async fn completed_journey_steps_are_skipped() {
        let (store, _dir) = store_with_conversation().await;
        let (journey, steps) = journey_with_steps(1);
        store.create_journey(&journey, &steps).await.unwrap();
        // Advance past the only step: journey completes, no current step.
        store.advance_journey("j-1").await.unwrap();

        let plan = plan_attachment(&store, "conv-1", &["att-1".into()]).await;
        assert!(plan.is_none(), "no auto-created step, attachment skipped");
    }

    #[test]
    fn invariant_check_counts_in_progress_steps() {
        let (_, mut steps) = journey_with_steps(3);
        assert!(single_current_step_holds(&steps));
        steps[0].status = StepStatus::InProgress;
        assert!(single_current_step_holds(&steps));
        steps[1].status = StepStatus::InProgress;
        assert!(!single_current_step_holds(&steps));
    }
}
