use thiserror::Error;

/// Errors a node executor can raise outside of its own business-logic
/// failure path. A node *failing its own work* (e.g. an HTTP call that
/// returns 500) is represented as `NodeResult::failure`, not one of these
/// variants — these are contract violations, not task outcomes.
#[derive(Debug, Error)]
pub enum NodeError {
  #[error("node {node_id} failed config validation: {message}")]
  InvalidConfig { node_id: String, message: String },

  #[error("node {node_id} was cancelled")]
  Cancelled { node_id: String },

  #[error("node {node_id} exceeded its timeout")]
  TimedOut { node_id: String },

  #[error("node {node_id} executor panicked or raised an unexpected error: {message}")]
  Unexpected { node_id: String, message: String },
}

/// Errors raised by the registry itself, independent of any one node run.
#[derive(Debug, Error)]
pub enum RegistryError {
  #[error("no executor registered for node type {0:?}")]
  NoExecutor(weave_model::NodeType),
}
