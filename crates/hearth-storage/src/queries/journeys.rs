// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Journey and journey-step operations.
//!
//! The single-current-step invariant (at most one `in_progress` step per
//! journey) is enforced both here on every mutation and by a partial unique
//! index in the schema.

use hearth_core::HearthError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{Journey, JourneyStep};
use crate::queries::parse_enum;

pub(crate) fn journey_from_row(row: &rusqlite::Row<'_>) -> Result<Journey, rusqlite::Error> {
    Ok(Journey {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        template: row.get(2)?,
        status: parse_enum(3, row.get::<_, String>(3)?)?,
        created_at: row.get(4)?,
    })
}

fn step_from_row(row: &rusqlite::Row<'_>) -> Result<JourneyStep, rusqlite::Error> {
    Ok(JourneyStep {
        id: row.get(0)?,
        journey_id: row.get(1)?,
        position: row.get(2)?,
        title: row.get(3)?,
        status: parse_enum(4, row.get::<_, String>(4)?)?,
    })
}

const JOURNEY_COLUMNS: &str = "id, conversation_id, template, status, created_at";
const STEP_COLUMNS: &str = "id, journey_id, position, title, status";

/// Create a journey with its steps in one transaction.
///
/// The first step is promoted to `in_progress`; the rest stay `pending`.
pub async fn create_journey(
    db: &Database,
    journey: &Journey,
    steps: &[JourneyStep],
) -> Result<(), HearthError> {
    let journey = journey.clone();
    let steps = steps.to_vec();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO journeys (id, conversation_id, template, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    journey.id,
                    journey.conversation_id,
                    journey.template,
                    journey.status.to_string(),
                    journey.created_at,
                ],
            )?;
            for (i, step) in steps.iter().enumerate() {
                let status = if i == 0 { "in_progress" } else { "pending" };
                tx.execute(
                    "INSERT INTO journey_steps (id, journey_id, position, title, status)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![step.id, step.journey_id, step.position, step.title, status],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get the at-most-one active journey for a conversation.
pub async fn get_active_journey(
    db: &Database,
    conversation_id: &str,
) -> Result<Option<Journey>, HearthError> {
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {JOURNEY_COLUMNS} FROM journeys
                 WHERE conversation_id = ?1 AND status = 'active'"
            ))?;
            let result = stmt.query_row(params![conversation_id], journey_from_row);
            match result {
                Ok(journey) => Ok(Some(journey)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a journey's steps in position order.
pub async fn get_journey_steps(
    db: &Database,
    journey_id: &str,
) -> Result<Vec<JourneyStep>, HearthError> {
    let journey_id = journey_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {STEP_COLUMNS} FROM journey_steps
                 WHERE journey_id = ?1 ORDER BY position ASC"
            ))?;
            let rows = stmt.query_map(params![journey_id], step_from_row)?;
            let mut steps = Vec::new();
            for row in rows {
                steps.push(row?);
            }
            Ok(steps)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Advance a journey: the in-progress step (if any) becomes done, the next
/// pending step becomes in-progress. Completing the last step completes the
/// journey.
///
/// The done-then-promote order keeps the partial unique index satisfied at
/// every point inside the transaction.
pub async fn advance_journey(db: &Database, journey_id: &str) -> Result<(), HearthError> {
    let journey_id = journey_id.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            tx.execute(
                "UPDATE journey_steps SET status = 'done'
                 WHERE journey_id = ?1 AND status = 'in_progress'",
                params![journey_id],
            )?;

            let promoted = tx.execute(
                "UPDATE journey_steps SET status = 'in_progress'
                 WHERE id = (
                     SELECT id FROM journey_steps
                     WHERE journey_id = ?1 AND status = 'pending'
                     ORDER BY position ASC LIMIT 1
                 )",
                params![journey_id],
            )?;

            if promoted == 0 {
                tx.execute(
                    "UPDATE journeys SET status = 'completed' WHERE id = ?1",
                    params![journey_id],
                )?;
            }

            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::conversations::create_conversation;
    use hearth_core::types::{
        Conversation, ConversationMode, ConversationStatus, HomeScope, JourneyStatus, Persona,
        Scenario, StepStatus,
    };
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        let conversation = Conversation {
            id: "conv-1".to_string(),
            persona: Persona::Homeowner,
            scenario: Scenario::DiyProjectPlan,
            scope: HomeScope::default(),
            mode: ConversationMode::Agent,
            status: ConversationStatus::Active,
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
            updated_at: "2026-01-01T00:00:00.000Z".to_string(),
        };
        create_conversation(&db, &conversation).await.unwrap();
        (db, dir)
    }

    fn make_journey(id: &str) -> (Journey, Vec<JourneyStep>) {
        let journey = Journey {
            id: id.to_string(),
            conversation_id: "conv-1".to_string(),
            template: "paint_room".to_string(),
            status: JourneyStatus::Active,
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
        };
        let steps = ["Prep the walls", "Prime", "Paint"]
            .iter()
            .enumerate()
            .map(|(i, title)| JourneyStep {
                id: format!("{id}-step-{i}"),
                journey_id: id.to_string(),
                position: i as i64,
                title: title.to_string(),
                status: StepStatus::Pending,
            })
            .collect();
        (journey, steps)
    }

    fn in_progress_count(steps: &[JourneyStep]) -> usize {
        steps
            .iter()
            .filter(|s| s.status == StepStatus::InProgress)
            .count()
    }

    #[tokio::test]
    async fn create_journey_promotes_first_step() {
        let (db, _dir) = setup_db().await;
        let (journey, steps) = make_journey("j-1");
        create_journey(&db, &journey, &steps).await.unwrap();

        let loaded = get_journey_steps(&db, "j-1").await.unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[0].status, StepStatus::InProgress);
        assert_eq!(loaded[1].status, StepStatus::Pending);
        assert_eq!(in_progress_count(&loaded), 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn advance_preserves_single_current_step() {
        let (db, _dir) = setup_db().await;
        let (journey, steps) = make_journey("j-2");
        create_journey(&db, &journey, &steps).await.unwrap();

        advance_journey(&db, "j-2").await.unwrap();
        let loaded = get_journey_steps(&db, "j-2").await.unwrap();
        assert_eq!(loaded[0].status, StepStatus::Done);
        assert_eq!(loaded[1].status, StepStatus::InProgress);
        assert_eq!(in_progress_count(&loaded), 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn advancing_past_last_step_completes_journey() {
        let (db, _dir) = setup_db().await;
        let (journey, steps) = make_journey("j-3");
        create_journey(&db, &journey, &steps).await.unwrap();

        for _ in 0..3 {
            advance_journey(&db, "j-3").await.unwrap();
        }

        let loaded = get_journey_steps(&db, "j-3").await.unwrap();
        assert!(loaded.iter().all(|s| s.status == StepStatus::Done));
        assert_eq!(in_progress_count(&loaded), 0);

        // The journey itself is completed, so no active journey remains.
        let active = get_active_journey(&db, "conv-1").await.unwrap();
        assert!(active.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn second_active_journey_is_rejected() {
        let (db, _dir) = setup_db().await;
        let (j1, s1) = make_journey("j-4");
        create_journey(&db, &j1, &s1).await.unwrap();

        let (j2, s2) = make_journey("j-5");

        // The partial unique index rejects a second active journey.
        let result = create_journey(&db, &j2, &s2).await;
        assert!(result.is_err());

        db.close().await.unwrap();
    }
}
