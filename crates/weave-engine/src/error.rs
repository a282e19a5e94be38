use thiserror::Error;

/// Errors that can occur while driving a workflow execution.
///
/// These are engine/configuration failures, distinct from a node's own
/// failure (which is recorded as a `NodeResult` and routed via
/// `on_failure`, never surfaced as an `Err` here).
#[derive(Debug, Error)]
pub enum EngineError {
  #[error(transparent)]
  Model(#[from] weave_model::ModelError),

  #[error(transparent)]
  Registry(#[from] weave_registry::RegistryError),

  #[error("workflow references unknown node '{0}'")]
  UnknownNode(String),

  #[error("execution exceeded MAX_NODES_PER_EXECUTION ({0})")]
  TooManyNodes(u64),

  #[error("execution exceeded MAX_ITERATIONS ({0})")]
  TooManyIterations(u64),

  #[error("loop body suspended execution, which is not supported")]
  SuspendInsideLoop,

  #[error("scheduler error: {0}")]
  Scheduler(#[from] weave_scheduler::SchedulerError),
}
