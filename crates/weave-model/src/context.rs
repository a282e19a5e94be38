use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The execution-scoped state the engine threads through a single run.
///
/// Lifecycle (§3): created when the engine accepts a trigger, mutated only
/// by the engine between node executions, destroyed after the terminal
/// node completes — unless a long delay is scheduled, in which case it is
/// serialized into a [`crate::Continuation`] and recreated on resume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionContext {
  /// The normalized trigger payload (see §6 "Inbound trigger payload").
  pub trigger: Value,
  /// `node_id` -> that node's `NodeResult.output`, reachable during
  /// resolution as `{{node_id.output.field}}`.
  #[serde(default)]
  pub outputs: Map<String, Value>,
  pub tenant_id: String,
  pub workflow_id: String,
  pub execution_id: String,
  /// Ordered list of node ids executed so far, for loop-safety and tracing.
  #[serde(default)]
  pub visited_nodes: Vec<String>,
  #[serde(default)]
  pub iteration_count: u64,
}

impl ExecutionContext {
  pub fn new(tenant_id: impl Into<String>, workflow_id: impl Into<String>, execution_id: impl Into<String>, trigger: Value) -> Self {
    Self {
      trigger,
      outputs: Map::new(),
      tenant_id: tenant_id.into(),
      workflow_id: workflow_id.into(),
      execution_id: execution_id.into(),
      visited_nodes: Vec::new(),
      iteration_count: 0,
    }
  }

  /// Record a node's output and mark it visited.
  pub fn record(&mut self, node_id: &str, output: Map<String, Value>) {
    self.outputs.insert(node_id.to_string(), Value::Object(output));
    self.visited_nodes.push(node_id.to_string());
    self.iteration_count += 1;
  }

  /// Build the whole-context tree a dotted path walks, rooted at this
  /// execution: `{ trigger, outputs, tenant_id, workflow_id, execution_id }`.
  pub fn as_tree(&self) -> Value {
    let mut root = Map::new();
    root.insert("trigger".to_string(), self.trigger.clone());
    root.insert("outputs".to_string(), Value::Object(self.outputs.clone()));
    root.insert("tenant_id".to_string(), Value::String(self.tenant_id.clone()));
    root.insert("workflow_id".to_string(), Value::String(self.workflow_id.clone()));
    root.insert("execution_id".to_string(), Value::String(self.execution_id.clone()));
    // Flatten outputs to the top level too, so `{{node_id.output.field}}`
    // and `{{node_id.field}}` both resolve.
    for (node_id, output) in &self.outputs {
      let mut wrapped = Map::new();
      wrapped.insert("output".to_string(), output.clone());
      root.insert(node_id.clone(), Value::Object(wrapped));
    }
    Value::Object(root)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn record_appends_visited_and_output() {
    let mut ctx = ExecutionContext::new("t1", "wf1", "ex1", json!({"text": "hi"}));
    let mut out = Map::new();
    out.insert("a".to_string(), json!(1));
    ctx.record("n1", out);
    assert_eq!(ctx.visited_nodes, vec!["n1".to_string()]);
    assert_eq!(ctx.outputs["n1"]["a"], json!(1));
    assert_eq!(ctx.iteration_count, 1);
  }

  #[test]
  fn as_tree_exposes_node_output_path() {
    let mut ctx = ExecutionContext::new("t1", "wf1", "ex1", json!({}));
    let mut out = Map::new();
    out.insert("json".to_string(), json!({"name": "Ana"}));
    ctx.record("http_1", out);
    let tree = ctx.as_tree();
    assert_eq!(tree["http_1"]["output"]["json"]["name"], json!("Ana"));
  }
}
