use thiserror::Error;

/// Errors raised while building or validating the data model itself,
/// independent of any particular execution.
#[derive(Debug, Error)]
pub enum ModelError {
  #[error("workflow '{workflow_id}' has no entry node")]
  NoEntryNode { workflow_id: String },

  #[error("workflow '{workflow_id}' has more than one entry node: {node_ids:?}")]
  MultipleEntryNodes {
    workflow_id: String,
    node_ids: Vec<String>,
  },

  #[error("node '{from}' has an edge to unknown node '{to}'")]
  DanglingEdge { from: String, to: String },

  #[error("duplicate node id '{0}' in workflow")]
  DuplicateNodeId(String),
}
