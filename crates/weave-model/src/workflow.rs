use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::node::WorkflowNode;
use crate::trigger::Trigger;

/// A tenant-scoped, named graph of nodes plus a trigger (§3).
///
/// A `WorkflowDefinition` is immutable during a single execution; updates
/// produce a new logical version (persistence and versioning are owned by
/// the external `WorkflowStore`, see `weave-collab`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDefinition {
  pub id: String,
  pub tenant_id: String,
  pub name: String,
  pub is_active: bool,
  pub trigger: Trigger,
  /// Declaration order is preserved; lookups by id go through
  /// [`WorkflowDefinition::nodes_by_id`].
  pub nodes: Vec<WorkflowNode>,
}

impl WorkflowDefinition {
  /// Validate the graph structure: unique node ids, edges that reference
  /// existing nodes (or terminate), and exactly one resolvable entry node.
  pub fn validate(&self) -> Result<(), ModelError> {
    let by_id = self.nodes_by_id();

    if by_id.len() != self.nodes.len() {
      let mut seen = std::collections::HashSet::new();
      for node in &self.nodes {
        if !seen.insert(node.id.as_str()) {
          return Err(ModelError::DuplicateNodeId(node.id.clone()));
        }
      }
    }

    for node in &self.nodes {
      if let Some(target) = &node.on_success {
        if !target.is_empty() && !by_id.contains_key(target.as_str()) {
          return Err(ModelError::DanglingEdge {
            from: node.id.clone(),
            to: target.clone(),
          });
        }
      }
      if let Some(target) = &node.on_failure {
        if !target.is_empty() && !by_id.contains_key(target.as_str()) {
          return Err(ModelError::DanglingEdge {
            from: node.id.clone(),
            to: target.clone(),
          });
        }
      }
    }

    self.entry_node()?;
    Ok(())
  }

  /// Id -> node lookup built on demand; the canonical storage stays an
  /// ordered `Vec` so iteration order (and, transitively, any diagnostics
  /// that enumerate nodes) is deterministic.
  pub fn nodes_by_id(&self) -> HashMap<&str, &WorkflowNode> {
    self.nodes.iter().map(|n| (n.id.as_str(), n)).collect()
  }

  pub fn get_node(&self, id: &str) -> Option<&WorkflowNode> {
    self.nodes.iter().find(|n| n.id == id)
  }

  /// The node execution starts from: the trigger's explicit `start_node`,
  /// or — for single-node workflows only — that sole node (§3 "exactly one
  /// node ... is marked as the entry node, or, equivalently, the trigger's
  /// `start_node` is set").
  pub fn entry_node(&self) -> Result<&WorkflowNode, ModelError> {
    if let Some(start_id) = self.trigger.start_node() {
      return self.get_node(start_id).ok_or_else(|| ModelError::NoEntryNode {
        workflow_id: self.id.clone(),
      });
    }

    match self.nodes.as_slice() {
      [] => Err(ModelError::NoEntryNode {
        workflow_id: self.id.clone(),
      }),
      [only] => Ok(only),
      _ => Err(ModelError::MultipleEntryNodes {
        workflow_id: self.id.clone(),
        node_ids: self.nodes.iter().map(|n| n.id.clone()).collect(),
      }),
    }
  }
}
