use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use weave_model::Continuation;

use crate::error::SchedulerError;
use crate::store::ContinuationStore;

/// `sqlx`-backed continuation store.
///
/// The due index is just a query over `scheduled_for` and `claimed_at` —
/// unlike the in-memory store there is no separate index table, since
/// SQLite's row-level locking within a transaction gives us the same
/// single-claim guarantee `UPDATE ... WHERE claimed_at IS NULL` provides.
pub struct SqliteContinuationStore {
  pool: SqlitePool,
}

impl SqliteContinuationStore {
  pub fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }

  pub async fn migrate(&self) -> Result<(), SchedulerError> {
    sqlx::migrate!("../../migrations/scheduler")
      .run(&self.pool)
      .await
      .map_err(|e| SchedulerError::Store(e.to_string()))
  }
}

#[async_trait]
impl ContinuationStore for SqliteContinuationStore {
  async fn schedule(&self, continuation: Continuation) -> Result<String, SchedulerError> {
    let blob = serde_json::to_string(&continuation).map_err(|e| SchedulerError::Store(e.to_string()))?;
    sqlx::query(
      r#"
      INSERT INTO continuations (id, tenant_id, scheduled_for, claimed_at, blob)
      VALUES (?1, ?2, ?3, NULL, ?4)
      ON CONFLICT(id) DO UPDATE SET scheduled_for = excluded.scheduled_for, blob = excluded.blob, claimed_at = NULL
      "#,
    )
    .bind(&continuation.id)
    .bind(&continuation.tenant_id)
    .bind(continuation.scheduled_for)
    .bind(&blob)
    .execute(&self.pool)
    .await
    .map_err(|e| SchedulerError::Store(e.to_string()))?;

    Ok(continuation.id)
  }

  async fn fetch_due(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<String>, SchedulerError> {
    let rows: Vec<(String,)> = sqlx::query_as(
      r#"
      SELECT id FROM continuations
      WHERE scheduled_for <= ?1 AND claimed_at IS NULL
      ORDER BY scheduled_for ASC
      LIMIT ?2
      "#,
    )
    .bind(now)
    .bind(limit as i64)
    .fetch_all(&self.pool)
    .await
    .map_err(|e| SchedulerError::Store(e.to_string()))?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
  }

  async fn claim(&self, id: &str) -> Result<bool, SchedulerError> {
    let result = sqlx::query(
      r#"
      UPDATE continuations SET claimed_at = ?2
      WHERE id = ?1 AND claimed_at IS NULL
      "#,
    )
    .bind(id)
    .bind(Utc::now())
    .execute(&self.pool)
    .await
    .map_err(|e| SchedulerError::Store(e.to_string()))?;

    Ok(result.rows_affected() == 1)
  }

  async fn load(&self, id: &str) -> Result<Option<Continuation>, SchedulerError> {
    let row: Option<(String,)> = sqlx::query_as("SELECT blob FROM continuations WHERE id = ?1")
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(|e| SchedulerError::Store(e.to_string()))?;

    row
      .map(|(blob,)| serde_json::from_str(&blob).map_err(|e| SchedulerError::Store(e.to_string())))
      .transpose()
  }

  async fn delete(&self, id: &str) -> Result<(), SchedulerError> {
    sqlx::query("DELETE FROM continuations WHERE id = ?1")
      .bind(id)
      .execute(&self.pool)
      .await
      .map_err(|e| SchedulerError::Store(e.to_string()))?;
    Ok(())
  }

  async fn cancel(&self, id: &str) -> Result<(), SchedulerError> {
    self.delete(id).await
  }
}
