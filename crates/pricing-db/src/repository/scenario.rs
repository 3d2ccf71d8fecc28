//! # Scenario Repository
//!
//! Stores submitted scenarios as JSON blobs.
//!
//! A submission is self-contained: every selected item carries a snapshot
//! of its service, so a stored quote still reads the same after the
//! catalog changes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use pricing_core::ScenarioSubmission;

use super::ScenarioRepository;
use crate::error::{DbError, DbResult};

/// A submission as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredScenario {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub submission: ScenarioSubmission,
}

#[derive(Debug, sqlx::FromRow)]
struct ScenarioRow {
    id: String,
    payload: String,
    created_at: DateTime<Utc>,
}

impl ScenarioRow {
    fn into_stored(self) -> DbResult<StoredScenario> {
        Ok(StoredScenario {
            id: self.id,
            created_at: self.created_at,
            submission: serde_json::from_str(&self.payload)?,
        })
    }
}

/// SQLite-backed [`ScenarioRepository`].
#[derive(Debug, Clone)]
pub struct SqliteScenarioRepository {
    pool: SqlitePool,
}

impl SqliteScenarioRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteScenarioRepository { pool }
    }
}

#[async_trait]
impl ScenarioRepository for SqliteScenarioRepository {
    async fn save_submission(&self, submission: &ScenarioSubmission) -> DbResult<StoredScenario> {
        let stored = StoredScenario {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            submission: submission.clone(),
        };
        let payload = serde_json::to_string(submission)?;

        sqlx::query(
            r#"
            INSERT INTO scenarios (id, client_name, payload, total_project_cost_cents, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&stored.id)
        .bind(&submission.client_name)
        .bind(payload)
        .bind(submission.summary.total_project_cost.cents())
        .bind(stored.created_at)
        .execute(&self.pool)
        .await?;

        info!(
            id = %stored.id,
            items = submission.selected_items.len(),
            total = %submission.summary.total_project_cost,
            "Scenario submitted"
        );

        Ok(stored)
    }

    async fn get(&self, id: &str) -> DbResult<Option<StoredScenario>> {
        let row: Option<ScenarioRow> =
            sqlx::query_as("SELECT id, payload, created_at FROM scenarios WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(ScenarioRow::into_stored).transpose()
    }

    async fn list_recent(&self, limit: u32) -> DbResult<Vec<StoredScenario>> {
        let rows: Vec<ScenarioRow> = sqlx::query_as(
            r#"
            SELECT id, payload, created_at
            FROM scenarios
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), limit, "Listed recent scenarios");
        rows.into_iter().map(ScenarioRow::into_stored).collect()
    }

    async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM scenarios WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Scenario", id));
        }

        debug!(id = %id, "Scenario deleted");
        Ok(())
    }
}
