use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use weave_model::{ExecutionContext, NodeResult, NodeType, WorkflowNode};
use weave_registry::{NodeError, NodeExecutor, NodeOutcome};
use weave_resolver::{ExpressionEvaluator, FieldResolver};

/// Evaluates each `mappings` entry independently; a failing mapping is
/// recorded under `errors[]` while the rest proceed. Succeeds if at least
/// one mapping succeeds (§4.2.7).
pub struct TransformExecutor {
  evaluator: Arc<dyn ExpressionEvaluator>,
}

impl TransformExecutor {
  pub fn new(evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
    Self { evaluator }
  }
}

#[async_trait]
impl NodeExecutor for TransformExecutor {
  fn node_type(&self) -> NodeType {
    NodeType::Transform
  }

  fn validate(&self, _config: &Map<String, Value>) -> Result<(), NodeError> {
    Ok(())
  }

  async fn execute(&self, node: &WorkflowNode, resolver: &FieldResolver<'_>, context: &ExecutionContext) -> Result<NodeOutcome, NodeError> {
    let mappings = resolver.get_map_raw("mappings", Map::new());
    let tree = context.as_tree();

    let mut output = Map::new();
    let mut errors = Vec::new();
    for (target_key, expression) in &mappings {
      let Some(expr) = expression.as_str() else {
        errors.push(Value::String(format!("{target_key}: mapping source must be a string expression")));
        continue;
      };
      match self.evaluator.evaluate(expr, &tree) {
        Ok(value) => {
          output.insert(target_key.clone(), value);
        }
        Err(e) => {
          errors.push(Value::String(format!("{target_key}: {e}")));
        }
      }
    }

    let succeeded = !output.is_empty() || mappings.is_empty();
    if !errors.is_empty() {
      output.insert("errors".to_string(), Value::Array(errors));
      if !output.is_empty() {
        output.insert("partial_success".to_string(), Value::Bool(true));
      }
    }

    Ok(NodeOutcome::Completed(if succeeded {
      NodeResult::success(&node.id, &node.name, output, 0)
    } else {
      let mut result = NodeResult::failure(&node.id, &node.name, "all mappings failed", 0);
      result.output = output;
      result
    }))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use weave_resolver::MinijinjaExpressionEvaluator;

  fn node(config: Map<String, Value>) -> WorkflowNode {
    WorkflowNode {
      id: "transform_1".to_string(),
      name: "transform_1".to_string(),
      node_type: NodeType::Transform,
      config,
      on_success: None,
      on_failure: None,
      timeout_ms: None,
    }
  }

  #[tokio::test]
  async fn http_plus_transform_scenario_extracts_nested_field() {
    let mut mappings = Map::new();
    mappings.insert("user_name".to_string(), json!("{{http_1.output.json.name}}"));
    let mut config = Map::new();
    config.insert("mappings".to_string(), Value::Object(mappings));
    let node = node(config.clone());

    let mut ctx = ExecutionContext::new("t1", "wf1", "ex1", json!({}));
    let mut http_output = Map::new();
    http_output.insert("json".to_string(), json!({"name": "Ana", "email": "a@x.io"}));
    ctx.record("http_1", http_output);

    let resolver = FieldResolver::new(&ctx, &config);
    let executor = TransformExecutor::new(Arc::new(MinijinjaExpressionEvaluator::new()));

    let outcome = executor.execute(&node, &resolver, &ctx).await.unwrap();
    match outcome {
      NodeOutcome::Completed(result) => {
        assert!(result.success);
        assert_eq!(result.output["user_name"], json!("Ana"));
      }
      _ => panic!("expected completion"),
    }
  }

  #[tokio::test]
  async fn partial_failure_keeps_succeeding_mappings_and_records_errors() {
    let mut mappings = Map::new();
    mappings.insert("good".to_string(), json!("'ok'"));
    mappings.insert("bad".to_string(), json!("trigger.missing.deeper"));
    let mut config = Map::new();
    config.insert("mappings".to_string(), Value::Object(mappings));
    let node = node(config.clone());
    let ctx = ExecutionContext::new("t1", "wf1", "ex1", json!({}));
    let resolver = FieldResolver::new(&ctx, &config);
    let executor = TransformExecutor::new(Arc::new(MinijinjaExpressionEvaluator::new()));

    let outcome = executor.execute(&node, &resolver, &ctx).await.unwrap();
    match outcome {
      NodeOutcome::Completed(result) => {
        assert!(result.success);
        assert_eq!(result.output["good"], json!("ok"));
        assert_eq!(result.output["partial_success"], json!(true));
        assert!(result.output["errors"].as_array().unwrap().len() == 1);
      }
      _ => panic!("expected completion"),
    }
  }
}
