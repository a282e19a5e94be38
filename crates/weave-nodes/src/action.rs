use async_trait::async_trait;
use serde_json::{Map, Value};
use weave_model::{ExecutionContext, NodeResult, NodeType, WorkflowNode};
use weave_registry::{NodeError, NodeExecutor, NodeOutcome};
use weave_resolver::FieldResolver;

/// `console_log` emits a rendered message and always succeeds; `set_context`
/// merges a rendered map into `output` so it becomes visible downstream as
/// `{{node_id.output.k}}` (§4.2.1).
pub struct ActionExecutor;

#[async_trait]
impl NodeExecutor for ActionExecutor {
  fn node_type(&self) -> NodeType {
    NodeType::Action
  }

  fn validate(&self, config: &Map<String, Value>) -> Result<(), NodeError> {
    match config.get("action_type").and_then(Value::as_str) {
      Some("console_log") | Some("set_context") | None => Ok(()),
      Some(other) => Err(NodeError::InvalidConfig {
        node_id: String::new(),
        message: format!("unknown action_type {other:?}"),
      }),
    }
  }

  async fn execute(&self, node: &WorkflowNode, resolver: &FieldResolver<'_>, _context: &ExecutionContext) -> Result<NodeOutcome, NodeError> {
    let action_type = resolver.get_string("action_type", "console_log");
    let output = match action_type.as_str() {
      "set_context" => resolver.get_map("context", Map::new()),
      "console_log" => {
        let message = resolver.get_string("message", "");
        if resolver.get_bool("print_input", false) {
          tracing::info!(node_id = %node.id, message = %message, "action console_log (with input)");
        } else {
          tracing::info!(node_id = %node.id, message = %message, "action console_log");
        }
        Map::new()
      }
      other => {
        return Err(NodeError::InvalidConfig {
          node_id: node.id.clone(),
          message: format!("unknown action_type {other:?}"),
        });
      }
    };
    Ok(NodeOutcome::Completed(NodeResult::success(&node.id, &node.name, output, 0)))
  }
}
