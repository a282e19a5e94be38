use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use weave_model::Continuation;

use crate::error::SchedulerError;

/// The durable continuation store (§4.3): a blob keyed by continuation id,
/// plus a due index ordered by `scheduled_for` supporting range queries.
///
/// `claim` is the single point of ownership transfer — only the caller
/// whose `claim` call returns `true` may invoke the resume handler for
/// that id (§8: "at most one worker observes claimed=true on c.id across
/// the fleet").
#[async_trait]
pub trait ContinuationStore: Send + Sync {
  async fn schedule(&self, continuation: Continuation) -> Result<String, SchedulerError>;
  async fn fetch_due(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<String>, SchedulerError>;
  async fn claim(&self, id: &str) -> Result<bool, SchedulerError>;
  async fn load(&self, id: &str) -> Result<Option<Continuation>, SchedulerError>;
  async fn delete(&self, id: &str) -> Result<(), SchedulerError>;
  /// Removes both the index entry and the blob. A no-op (but not an error)
  /// if a worker already claimed the entry — the blob will simply be gone
  /// by the time that worker tries to load it.
  async fn cancel(&self, id: &str) -> Result<(), SchedulerError>;
}

/// In-process reference implementation. The due index is a plain
/// `id -> score` map; `fetch_due` filters and sorts on read since the
/// expected cardinality (pending continuations for one process) is small.
#[derive(Default)]
pub struct InMemoryContinuationStore {
  blobs: RwLock<HashMap<String, Continuation>>,
  due_index: RwLock<HashMap<String, f64>>,
}

impl InMemoryContinuationStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl ContinuationStore for InMemoryContinuationStore {
  async fn schedule(&self, continuation: Continuation) -> Result<String, SchedulerError> {
    let id = continuation.id.clone();
    let score = continuation.scheduled_for.timestamp() as f64 + continuation.scheduled_for.timestamp_subsec_millis() as f64 / 1000.0;
    self.blobs.write().unwrap().insert(id.clone(), continuation);
    self.due_index.write().unwrap().insert(id.clone(), score);
    Ok(id)
  }

  async fn fetch_due(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<String>, SchedulerError> {
    let now_score = now.timestamp() as f64 + now.timestamp_subsec_millis() as f64 / 1000.0;
    let index = self.due_index.read().unwrap();
    let mut due: Vec<(String, f64)> = index.iter().filter(|(_, score)| **score <= now_score).map(|(id, score)| (id.clone(), *score)).collect();
    due.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());
    due.truncate(limit);
    Ok(due.into_iter().map(|(id, _)| id).collect())
  }

  async fn claim(&self, id: &str) -> Result<bool, SchedulerError> {
    Ok(self.due_index.write().unwrap().remove(id).is_some())
  }

  async fn load(&self, id: &str) -> Result<Option<Continuation>, SchedulerError> {
    Ok(self.blobs.read().unwrap().get(id).cloned())
  }

  async fn delete(&self, id: &str) -> Result<(), SchedulerError> {
    self.blobs.write().unwrap().remove(id);
    Ok(())
  }

  async fn cancel(&self, id: &str) -> Result<(), SchedulerError> {
    self.due_index.write().unwrap().remove(id);
    self.blobs.write().unwrap().remove(id);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use weave_model::ExecutionContext;

  fn continuation(id: &str, scheduled_for: DateTime<Utc>) -> Continuation {
    Continuation {
      id: id.to_string(),
      execution_id: "ex1".to_string(),
      workflow_id: "wf1".to_string(),
      tenant_id: "t1".to_string(),
      resume_node_id: "send".to_string(),
      context: ExecutionContext::new("t1", "wf1", "ex1", json!({})),
      scheduled_for,
      created_at: Utc::now(),
    }
  }

  #[tokio::test]
  async fn fetch_due_only_returns_entries_whose_time_has_passed() {
    let store = InMemoryContinuationStore::new();
    let now = Utc::now();
    store.schedule(continuation("past", now - chrono::Duration::seconds(10))).await.unwrap();
    store.schedule(continuation("future", now + chrono::Duration::seconds(10))).await.unwrap();

    let due = store.fetch_due(now, 10).await.unwrap();
    assert_eq!(due, vec!["past".to_string()]);
  }

  #[tokio::test]
  async fn claim_is_single_winner() {
    let store = InMemoryContinuationStore::new();
    store.schedule(continuation("c1", Utc::now())).await.unwrap();

    assert!(store.claim("c1").await.unwrap());
    assert!(!store.claim("c1").await.unwrap());
  }

  #[tokio::test]
  async fn cancel_removes_index_and_blob() {
    let store = InMemoryContinuationStore::new();
    store.schedule(continuation("c1", Utc::now())).await.unwrap();
    store.cancel("c1").await.unwrap();

    assert!(store.fetch_due(Utc::now(), 10).await.unwrap().is_empty());
    assert!(store.load("c1").await.unwrap().is_none());
  }
}
