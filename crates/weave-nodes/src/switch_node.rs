use async_trait::async_trait;
use serde_json::{Map, Value};
use weave_model::{ExecutionContext, NodeResult, NodeType, WorkflowNode};
use weave_registry::{NodeError, NodeExecutor, NodeOutcome};
use weave_resolver::{get_path, FieldResolver};

/// Stringifies `field`, routes to the first exact-match case (or
/// `"default"`), and exposes the chosen node id as `output.next_node`,
/// which overrides the static `on_success` edge (§4.2.8, §8: no match and
/// no default leaves `matched_case=""` and does not override routing).
pub struct SwitchExecutor;

#[async_trait]
impl NodeExecutor for SwitchExecutor {
  fn node_type(&self) -> NodeType {
    NodeType::Switch
  }

  fn validate(&self, _config: &Map<String, Value>) -> Result<(), NodeError> {
    Ok(())
  }

  async fn execute(&self, node: &WorkflowNode, resolver: &FieldResolver<'_>, context: &ExecutionContext) -> Result<NodeOutcome, NodeError> {
    let field_path = resolver.get_string("field", "");
    let cases = resolver.get_map("cases", Map::new());

    let tree = context.as_tree();
    let field_value = get_path(&tree, &field_path);
    let stringified = match &field_value {
      Some(Value::String(s)) => s.clone(),
      Some(other) => other.to_string(),
      None => String::new(),
    };

    let matched = cases
      .get(&stringified)
      .and_then(Value::as_str)
      .or_else(|| cases.get("default").and_then(Value::as_str));

    let mut output = Map::new();
    output.insert("matched_case".to_string(), Value::String(matched.map(str::to_string).unwrap_or_default()));
    if let Some(next_node) = matched {
      output.insert("next_node".to_string(), Value::String(next_node.to_string()));
    }

    Ok(NodeOutcome::Completed(NodeResult::success(&node.id, &node.name, output, 0)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn node(config: Map<String, Value>) -> WorkflowNode {
    WorkflowNode {
      id: "switch_1".to_string(),
      name: "switch_1".to_string(),
      node_type: NodeType::Switch,
      config,
      on_success: Some("fallback".to_string()),
      on_failure: None,
      timeout_ms: None,
    }
  }

  #[tokio::test]
  async fn unmatched_case_falls_back_to_default_key() {
    let mut cases = Map::new();
    cases.insert("help".to_string(), json!("n1"));
    cases.insert("order".to_string(), json!("n2"));
    cases.insert("default".to_string(), json!("n3"));
    let mut config = Map::new();
    config.insert("field".to_string(), json!("trigger.text"));
    config.insert("cases".to_string(), Value::Object(cases));
    let node = node(config.clone());
    let ctx = ExecutionContext::new("t1", "wf1", "ex1", json!({"text": "xyz"}));
    let resolver = FieldResolver::new(&ctx, &config);

    let outcome = SwitchExecutor.execute(&node, &resolver, &ctx).await.unwrap();
    match outcome {
      NodeOutcome::Completed(result) => assert_eq!(result.output["next_node"], json!("n3")),
      _ => panic!("expected completion"),
    }
  }

  #[tokio::test]
  async fn no_match_and_no_default_does_not_override_routing() {
    let mut cases = Map::new();
    cases.insert("help".to_string(), json!("n1"));
    let mut config = Map::new();
    config.insert("field".to_string(), json!("trigger.text"));
    config.insert("cases".to_string(), Value::Object(cases));
    let node = node(config.clone());
    let ctx = ExecutionContext::new("t1", "wf1", "ex1", json!({"text": "xyz"}));
    let resolver = FieldResolver::new(&ctx, &config);

    let outcome = SwitchExecutor.execute(&node, &resolver, &ctx).await.unwrap();
    match outcome {
      NodeOutcome::Completed(result) => {
        assert_eq!(result.output["matched_case"], json!(""));
        assert!(!result.output.contains_key("next_node"));
      }
      _ => panic!("expected completion"),
    }
  }
}
