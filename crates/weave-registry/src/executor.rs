use async_trait::async_trait;
use serde_json::{Map, Value};
use weave_model::{ExecutionContext, NodeResult, NodeType, WorkflowNode};
use weave_resolver::FieldResolver;

use crate::error::NodeError;

/// What an executor produced from a single run.
///
/// Most nodes always complete immediately; DELAY is the one node type that
/// can ask the engine to suspend the execution instead of completing it
/// synchronously (§4.2.3, §4.3's `SYNC_THRESHOLD`).
pub enum NodeOutcome {
  Completed(NodeResult),
  Suspend { resume_at: chrono::DateTime<chrono::Utc> },
}

/// Uniform contract every node type implements (§4.2).
///
/// Executors receive config that has already been resolved and rendered
/// by `weave-resolver::FieldResolver` — they never see raw `{{ }}` tokens.
#[async_trait]
pub trait NodeExecutor: Send + Sync {
  /// The node type this executor claims.
  fn node_type(&self) -> NodeType;

  /// Reject malformed config before the node ever runs. Called at
  /// workflow-load time, not per-execution.
  fn validate(&self, config: &Map<String, Value>) -> Result<(), NodeError>;

  /// Run the node. `resolver` is bound to this node's raw config and the
  /// current execution context, so executors resolve each recognized
  /// config key through the full priority chain and template renderer
  /// themselves (§4.1) rather than receiving a single pre-rendered blob.
  /// `context` is read-only here; the engine owns recording the result
  /// into it.
  async fn execute(
    &self,
    node: &WorkflowNode,
    resolver: &FieldResolver<'_>,
    context: &ExecutionContext,
  ) -> Result<NodeOutcome, NodeError>;
}
