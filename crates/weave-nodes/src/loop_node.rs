use async_trait::async_trait;
use serde_json::{Map, Value};
use weave_model::{ExecutionContext, NodeResult, NodeType, WorkflowNode};
use weave_registry::{NodeError, NodeExecutor, NodeOutcome};
use weave_resolver::FieldResolver;

pub const DEFAULT_MAX_ITERATIONS: u64 = 1000;
pub const HARD_MAX_ITERATIONS: u64 = 10000;

/// Resolves `iterate_over` to an array and validates the loop's config
/// (§4.2.9). The actual per-item delegation to `body_node`'s subgraph is
/// driven by the engine, not this executor: only the engine holds the
/// `WorkflowDefinition` needed to recursively dispatch a subgraph. This
/// executor's job is the up-front validate-and-resolve step;
/// `weave-engine::WorkflowEngine` reads `output.items` / `output.item_var`
/// / `output.index_var` / `output.body_node` / `output.max_iterations` to
/// drive the loop body and assembles `output.results[]` onto the final
/// merged `NodeResult` itself.
pub struct LoopExecutor;

#[async_trait]
impl NodeExecutor for LoopExecutor {
  fn node_type(&self) -> NodeType {
    NodeType::Loop
  }

  fn validate(&self, config: &Map<String, Value>) -> Result<(), NodeError> {
    if config.get("body_node").and_then(Value::as_str).map(str::is_empty).unwrap_or(true) {
      return Err(NodeError::InvalidConfig {
        node_id: String::new(),
        message: "body_node is required".to_string(),
      });
    }
    Ok(())
  }

  async fn execute(&self, node: &WorkflowNode, resolver: &FieldResolver<'_>, context: &ExecutionContext) -> Result<NodeOutcome, NodeError> {
    let iterate_over_path = resolver.get_string("iterate_over", "");
    let tree = context.as_tree();
    let resolved = weave_resolver::get_path(&tree, &iterate_over_path);

    let Some(Value::Array(items)) = resolved else {
      return Ok(NodeOutcome::Completed(NodeResult::failure(
        &node.id,
        &node.name,
        format!("iterate_over {iterate_over_path:?} did not resolve to an array"),
        0,
      )));
    };

    let item_var = resolver.get_string("item_var", "item");
    let index_var = resolver.get_string("index_var", "index");
    let body_node = resolver.get_string("body_node", "");
    let max_iterations = resolver.get_int("max_iterations", DEFAULT_MAX_ITERATIONS as i64).clamp(0, HARD_MAX_ITERATIONS as i64) as u64;

    let mut output = Map::new();
    output.insert("count".to_string(), Value::from(items.len() as i64));
    output.insert("items".to_string(), Value::Array(items));
    output.insert("item_var".to_string(), Value::String(item_var));
    output.insert("index_var".to_string(), Value::String(index_var));
    output.insert("body_node".to_string(), Value::String(body_node));
    output.insert("max_iterations".to_string(), Value::from(max_iterations as i64));

    Ok(NodeOutcome::Completed(NodeResult::success(&node.id, &node.name, output, 0)))
  }
}
