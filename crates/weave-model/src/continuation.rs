use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::ExecutionContext;

/// A durable snapshot of a paused execution, sufficient for any worker to
/// resume it (§3, §4.3).
///
/// Wire shape matches §6 exactly: readers must ignore unknown fields so the
/// format can grow without breaking older workers mid-rollout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Continuation {
  pub id: String,
  pub execution_id: String,
  pub workflow_id: String,
  pub tenant_id: String,
  pub resume_node_id: String,
  pub context: ExecutionContext,
  pub scheduled_for: DateTime<Utc>,
  pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn round_trips_through_json() {
    let c = Continuation {
      id: "cont-1".to_string(),
      execution_id: "exec-1".to_string(),
      workflow_id: "wf-1".to_string(),
      tenant_id: "tenant-1".to_string(),
      resume_node_id: "send".to_string(),
      context: ExecutionContext::new("tenant-1", "wf-1", "exec-1", json!({"text": "hi"})),
      scheduled_for: Utc::now(),
      created_at: Utc::now(),
    };

    let raw = serde_json::to_string(&c).unwrap();
    let back: Continuation = serde_json::from_str(&raw).unwrap();

    assert_eq!(back.id, c.id);
    assert_eq!(back.execution_id, c.execution_id);
    assert_eq!(back.workflow_id, c.workflow_id);
    assert_eq!(back.tenant_id, c.tenant_id);
    assert_eq!(back.resume_node_id, c.resume_node_id);
    assert_eq!(back.scheduled_for, c.scheduled_for);
    assert_eq!(back.created_at, c.created_at);
    assert_eq!(back.context.execution_id, c.context.execution_id);
  }

  #[test]
  fn ignores_unknown_fields() {
    let raw = serde_json::json!({
      "id": "cont-1",
      "execution_id": "exec-1",
      "workflow_id": "wf-1",
      "tenant_id": "tenant-1",
      "resume_node_id": "send",
      "context": {
        "trigger": {},
        "outputs": {},
        "tenant_id": "tenant-1",
        "workflow_id": "wf-1",
        "execution_id": "exec-1",
        "visited_nodes": [],
        "iteration_count": 0
      },
      "scheduled_for": Utc::now(),
      "created_at": Utc::now(),
      "from_the_future": "ignored",
    });

    let back: Continuation = serde_json::from_value(raw).unwrap();
    assert_eq!(back.id, "cont-1");
  }
}
