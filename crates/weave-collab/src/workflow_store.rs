use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use weave_model::WorkflowDefinition;

use crate::error::CollabError;

#[async_trait]
pub trait WorkflowStore: Send + Sync {
  async fn find_active_by_tenant(&self, tenant_id: &str) -> Result<Vec<WorkflowDefinition>, CollabError>;
  async fn find_by_id(&self, id: &str, tenant_id: &str) -> Result<Option<WorkflowDefinition>, CollabError>;
}

/// In-process reference implementation. Production deployments back this
/// with a real database; this crate only specifies the contract shape.
#[derive(Default)]
pub struct InMemoryWorkflowStore {
  workflows: RwLock<HashMap<String, WorkflowDefinition>>,
}

impl InMemoryWorkflowStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn upsert(&self, workflow: WorkflowDefinition) {
    self.workflows.write().unwrap().insert(workflow.id.clone(), workflow);
  }
}

#[async_trait]
impl WorkflowStore for InMemoryWorkflowStore {
  async fn find_active_by_tenant(&self, tenant_id: &str) -> Result<Vec<WorkflowDefinition>, CollabError> {
    Ok(
      self
        .workflows
        .read()
        .unwrap()
        .values()
        .filter(|w| w.tenant_id == tenant_id && w.is_active)
        .cloned()
        .collect(),
    )
  }

  async fn find_by_id(&self, id: &str, tenant_id: &str) -> Result<Option<WorkflowDefinition>, CollabError> {
    Ok(
      self
        .workflows
        .read()
        .unwrap()
        .get(id)
        .filter(|w| w.tenant_id == tenant_id)
        .cloned(),
    )
  }
}
