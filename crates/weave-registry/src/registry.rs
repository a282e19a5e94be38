use std::collections::HashMap;
use std::sync::Arc;

use weave_model::NodeType;

use crate::error::RegistryError;
use crate::executor::NodeExecutor;

/// Maps each `NodeType` to the single executor that handles it.
///
/// Closed over a fixed, compile-time-known set of node types — there is no
/// install/remove lifecycle, only registration at startup. A missing
/// registration is treated as a fatal engine configuration error, not a
/// per-execution failure.
#[derive(Clone, Default)]
pub struct NodeRegistry {
  executors: HashMap<NodeType, Arc<dyn NodeExecutor>>,
}

impl NodeRegistry {
  pub fn new() -> Self {
    Self { executors: HashMap::new() }
  }

  pub fn register(&mut self, executor: Arc<dyn NodeExecutor>) {
    self.executors.insert(executor.node_type(), executor);
  }

  pub fn get(&self, node_type: NodeType) -> Result<Arc<dyn NodeExecutor>, RegistryError> {
    self.executors.get(&node_type).cloned().ok_or(RegistryError::NoExecutor(node_type))
  }

  pub fn is_registered(&self, node_type: NodeType) -> bool {
    self.executors.contains_key(&node_type)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use async_trait::async_trait;
  use serde_json::{Map, Value};
  use weave_model::{ExecutionContext, NodeResult, WorkflowNode};
  use weave_resolver::FieldResolver;

  use crate::error::NodeError;
  use crate::executor::NodeOutcome;

  struct EchoExecutor;

  #[async_trait]
  impl NodeExecutor for EchoExecutor {
    fn node_type(&self) -> NodeType {
      NodeType::Action
    }

    fn validate(&self, _config: &Map<String, Value>) -> Result<(), NodeError> {
      Ok(())
    }

    async fn execute(
      &self,
      node: &WorkflowNode,
      _resolver: &FieldResolver<'_>,
      _context: &ExecutionContext,
    ) -> Result<NodeOutcome, NodeError> {
      Ok(NodeOutcome::Completed(NodeResult::success(&node.id, &node.name, Map::new(), 0)))
    }
  }

  #[test]
  fn missing_registration_is_an_error() {
    let registry = NodeRegistry::new();
    assert!(matches!(registry.get(NodeType::Http), Err(RegistryError::NoExecutor(NodeType::Http))));
  }

  #[test]
  fn registered_executor_is_retrievable_by_its_own_claimed_type() {
    let mut registry = NodeRegistry::new();
    registry.register(Arc::new(EchoExecutor));
    assert!(registry.is_registered(NodeType::Action));
    assert!(registry.get(NodeType::Action).is_ok());
  }
}
