use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The closed set of node types the engine knows how to dispatch.
///
/// A flat enum: every node carries its own typed behavior via the node
/// executor registry in `weave-registry`, and the recognized `config`
/// keys vary per type (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
  Action,
  Condition,
  Delay,
  AiAgent,
  SendMessage,
  Http,
  Transform,
  Switch,
  Loop,
  Validate,
}

impl NodeType {
  pub fn as_str(&self) -> &'static str {
    match self {
      NodeType::Action => "action",
      NodeType::Condition => "condition",
      NodeType::Delay => "delay",
      NodeType::AiAgent => "ai_agent",
      NodeType::SendMessage => "send_message",
      NodeType::Http => "http",
      NodeType::Transform => "transform",
      NodeType::Switch => "switch",
      NodeType::Loop => "loop",
      NodeType::Validate => "validate",
    }
  }
}

/// A single step in a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowNode {
  pub id: String,
  pub name: String,
  #[serde(rename = "type")]
  pub node_type: NodeType,
  /// Free-form config map; recognized keys depend on `node_type` (§4.2).
  #[serde(default)]
  pub config: Map<String, Value>,
  /// Node id to follow when this node succeeds, or the switch/loop outcome
  /// overrides it via `output.next_node` / `output.body_node`. Empty means
  /// terminate the execution.
  #[serde(default)]
  pub on_success: Option<String>,
  /// Node id to follow when this node fails. Empty means terminate the
  /// execution with the last error as the execution failure.
  #[serde(default)]
  pub on_failure: Option<String>,
  /// Per-node timeout in milliseconds; falls back to the engine default
  /// (~60s, see `weave-engine::EngineConfig`) when absent.
  #[serde(default)]
  pub timeout_ms: Option<u64>,
}

impl WorkflowNode {
  pub fn get_config(&self, key: &str) -> Option<&Value> {
    self.config.get(key)
  }
}

/// Per-node execution output.
///
/// Invariant: `success == false` implies `error` is non-empty;
/// `success == true` implies `output` may be empty but is never absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeResult {
  pub node_id: String,
  pub node_name: String,
  pub success: bool,
  #[serde(default)]
  pub output: Map<String, Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  pub duration_ms: u64,
  pub timestamp: DateTime<Utc>,
  /// Set by the engine when a node's executor call was cancelled via the
  /// execution's cancellation signal (§5 "Cancellation and timeouts").
  #[serde(default)]
  pub cancelled: bool,
}

impl NodeResult {
  pub fn success(node_id: impl Into<String>, node_name: impl Into<String>, output: Map<String, Value>, duration_ms: u64) -> Self {
    Self {
      node_id: node_id.into(),
      node_name: node_name.into(),
      success: true,
      output,
      error: None,
      duration_ms,
      timestamp: Utc::now(),
      cancelled: false,
    }
  }

  pub fn failure(node_id: impl Into<String>, node_name: impl Into<String>, error: impl Into<String>, duration_ms: u64) -> Self {
    Self {
      node_id: node_id.into(),
      node_name: node_name.into(),
      success: false,
      output: Map::new(),
      error: Some(error.into()),
      duration_ms,
      timestamp: Utc::now(),
      cancelled: false,
    }
  }

  pub fn cancelled(node_id: impl Into<String>, node_name: impl Into<String>, duration_ms: u64) -> Self {
    Self {
      node_id: node_id.into(),
      node_name: node_name.into(),
      success: false,
      output: Map::new(),
      error: Some("cancelled".to_string()),
      duration_ms,
      timestamp: Utc::now(),
      cancelled: true,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn success_result_never_has_error() {
    let r = NodeResult::success("n1", "node-1", Map::new(), 5);
    assert!(r.success);
    assert!(r.error.is_none());
  }

  #[test]
  fn failure_result_always_has_error() {
    let r = NodeResult::failure("n1", "node-1", "boom", 5);
    assert!(!r.success);
    assert!(r.error.is_some());
  }

  #[test]
  fn node_type_round_trips_through_serde() {
    for nt in [
      NodeType::Action,
      NodeType::Condition,
      NodeType::Delay,
      NodeType::AiAgent,
      NodeType::SendMessage,
      NodeType::Http,
      NodeType::Transform,
      NodeType::Switch,
      NodeType::Loop,
      NodeType::Validate,
    ] {
      let json = serde_json::to_string(&nt).unwrap();
      let back: NodeType = serde_json::from_str(&json).unwrap();
      assert_eq!(nt, back);
    }
  }
}
