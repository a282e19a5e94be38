use std::time::Duration;

/// Hard safety caps and defaults for the execution loop (§4.4).
#[derive(Debug, Clone)]
pub struct EngineConfig {
  /// Upper bound on distinct node executions within a single execution,
  /// counting loop-body iterations. Guards against a misconfigured graph
  /// looping forever.
  pub max_nodes_per_execution: u64,
  /// Upper bound on `ExecutionContext::iteration_count`, which also
  /// advances once per loop iteration. Smaller than
  /// `max_nodes_per_execution` would make `LoopExecutor`'s own
  /// per-node `max_iterations` clamp redundant, so this stays the wider cap.
  pub max_iterations: u64,
  /// Applied when a node carries no `timeout_ms` of its own.
  pub default_node_timeout: Duration,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      max_nodes_per_execution: 1000,
      max_iterations: 10_000,
      default_node_timeout: Duration::from_secs(60),
    }
  }
}
