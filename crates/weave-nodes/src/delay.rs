use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::Duration as ChronoDuration;
use serde_json::{Map, Value};
use weave_model::{ExecutionContext, NodeResult, NodeType, WorkflowNode};
use weave_registry::{NodeError, NodeExecutor, NodeOutcome};
use weave_resolver::FieldResolver;

use crate::duration::resolve_delay_duration;

/// The engine default; can be overridden per deployment via
/// `weave-engine::EngineConfig::sync_threshold`.
pub const DEFAULT_SYNC_THRESHOLD: StdDuration = StdDuration::from_secs(30);

pub fn should_use_async(d: StdDuration, sync_threshold: StdDuration) -> bool {
  d > sync_threshold
}

/// Sleeps in-process for short delays; signals a suspension for the
/// engine to persist a continuation otherwise (§4.2.3).
pub struct DelayExecutor {
  sync_threshold: StdDuration,
}

impl DelayExecutor {
  pub fn new(sync_threshold: StdDuration) -> Self {
    Self { sync_threshold }
  }
}

impl Default for DelayExecutor {
  fn default() -> Self {
    Self::new(DEFAULT_SYNC_THRESHOLD)
  }
}

#[async_trait]
impl NodeExecutor for DelayExecutor {
  fn node_type(&self) -> NodeType {
    NodeType::Delay
  }

  fn validate(&self, _config: &Map<String, Value>) -> Result<(), NodeError> {
    Ok(())
  }

  async fn execute(&self, node: &WorkflowNode, resolver: &FieldResolver<'_>, _context: &ExecutionContext) -> Result<NodeOutcome, NodeError> {
    let duration = resolve_delay_duration(resolver);

    if should_use_async(duration, self.sync_threshold) {
      let chrono_duration = ChronoDuration::from_std(duration).unwrap_or(ChronoDuration::zero());
      return Ok(NodeOutcome::Suspend {
        resume_at: chrono::Utc::now() + chrono_duration,
      });
    }

    tokio::time::sleep(duration).await;
    Ok(NodeOutcome::Completed(NodeResult::success(&node.id, &node.name, Map::new(), duration.as_millis() as u64)))
  }
}
