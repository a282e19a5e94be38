use async_trait::async_trait;
use regex::Regex;
use serde_json::{Map, Value};
use weave_model::{ExecutionContext, NodeResult, NodeType, WorkflowNode};
use weave_registry::{NodeError, NodeExecutor, NodeOutcome};
use weave_resolver::{get_path, FieldResolver};

/// Outputs `{condition_met: bool}` and reports the node itself as
/// succeeding or failing according to that bool, so the engine's normal
/// success/failure edges route `true` to `on_success` and `false` to
/// `on_failure` (§4.2.2).
pub struct ConditionExecutor;

fn validate_condition_type(config: &Map<String, Value>) -> Result<(), NodeError> {
  let condition_type = config.get("condition_type").and_then(Value::as_str).unwrap_or("equals");
  match condition_type {
    "equals" | "contains" | "exists" => Ok(()),
    "regex" => {
      let pattern = config.get("pattern").and_then(Value::as_str).unwrap_or("");
      Regex::new(pattern).map(|_| ()).map_err(|e| NodeError::InvalidConfig {
        node_id: String::new(),
        message: format!("invalid regex pattern {pattern:?}: {e}"),
      })
    }
    other => Err(NodeError::InvalidConfig {
      node_id: String::new(),
      message: format!("unknown condition_type {other:?}"),
    }),
  }
}

fn stringify(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    Value::Null => String::new(),
    other => other.to_string(),
  }
}

#[async_trait]
impl NodeExecutor for ConditionExecutor {
  fn node_type(&self) -> NodeType {
    NodeType::Condition
  }

  fn validate(&self, config: &Map<String, Value>) -> Result<(), NodeError> {
    validate_condition_type(config)
  }

  async fn execute(&self, node: &WorkflowNode, resolver: &FieldResolver<'_>, context: &ExecutionContext) -> Result<NodeOutcome, NodeError> {
    let condition_type = resolver.get_string("condition_type", "equals");
    let field_path = resolver.get_string("field", "");
    let case_insensitive = resolver.get_bool("case_insensitive", false);

    let tree = context.as_tree();
    let field_value = get_path(&tree, &field_path);

    let condition_met = match condition_type.as_str() {
      "exists" => field_value.is_some_and(|v| !v.is_null()),
      "equals" => {
        let expected = resolver.get_string("value", "");
        match field_value {
          Some(v) => fold_case(&stringify(&v), case_insensitive) == fold_case(&expected, case_insensitive),
          None => false,
        }
      }
      "contains" => {
        let expected = resolver.get_string("value", "");
        match field_value {
          Some(v) => fold_case(&stringify(&v), case_insensitive).contains(&fold_case(&expected, case_insensitive)),
          None => false,
        }
      }
      "regex" => {
        let pattern = resolver.get_string("pattern", "");
        match (field_value, build_regex(&pattern, case_insensitive)) {
          (Some(v), Ok(re)) => re.is_match(&stringify(&v)),
          _ => false,
        }
      }
      other => {
        return Err(NodeError::InvalidConfig {
          node_id: node.id.clone(),
          message: format!("unknown condition_type {other:?}"),
        });
      }
    };

    let mut output = Map::new();
    output.insert("condition_met".to_string(), Value::Bool(condition_met));

    Ok(NodeOutcome::Completed(if condition_met {
      NodeResult::success(&node.id, &node.name, output, 0)
    } else {
      let mut result = NodeResult::failure(&node.id, &node.name, "condition not met", 0);
      result.output = output;
      result
    }))
  }
}

fn fold_case(s: &str, case_insensitive: bool) -> String {
  if case_insensitive {
    s.to_lowercase()
  } else {
    s.to_string()
  }
}

fn build_regex(pattern: &str, case_insensitive: bool) -> Result<Regex, regex::Error> {
  if case_insensitive {
    Regex::new(&format!("(?i){pattern}"))
  } else {
    Regex::new(pattern)
  }
}
