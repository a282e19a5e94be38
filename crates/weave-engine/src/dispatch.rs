use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use weave_collab::WorkflowStore;
use weave_model::{Message, Trigger, WorkflowDefinition};

use crate::engine::{ExecutionResult, WorkflowEngine};
use crate::error::EngineError;
use crate::events::ExecutionNotifier;

/// Matches an inbound channel `Message` against a tenant's active
/// `CHANNEL_WEBHOOK`-triggered workflows and starts each match in its own
/// execution (§4.5). A workflow whose trigger is not `CHANNEL_WEBHOOK`, or
/// whose `channel_ids` doesn't include the message's channel, never matches.
///
/// WEBHOOK (path/method match against an inbound HTTP request) and
/// SCHEDULE (driven by a separate cron dispatcher) triggers are matched by
/// their own callers against the same `WorkflowStore` — this processor
/// only owns the channel-message fan-out path.
pub struct MessageProcessor<N: ExecutionNotifier> {
  store: Arc<dyn WorkflowStore>,
  engine: Arc<WorkflowEngine<N>>,
}

impl<N: ExecutionNotifier> MessageProcessor<N> {
  pub fn new(store: Arc<dyn WorkflowStore>, engine: Arc<WorkflowEngine<N>>) -> Self {
    Self { store, engine }
  }

  /// Starts every matching workflow for `message`. A failure starting or
  /// running one workflow does not stop the others — each result (success
  /// or error) is reported independently, in matching order.
  pub async fn dispatch(&self, message: &Message, cancel: CancellationToken) -> Vec<Result<ExecutionResult, EngineError>> {
    let candidates = match self.store.find_active_by_tenant(&message.tenant_id).await {
      Ok(workflows) => workflows,
      Err(e) => {
        tracing::error!(error = %e, tenant_id = %message.tenant_id, "failed to load active workflows");
        return Vec::new();
      }
    };

    let matches: Vec<&WorkflowDefinition> = candidates.iter().filter(|wf| matches_channel_message(wf, message)).collect();

    let mut results = Vec::with_capacity(matches.len());
    for workflow in matches {
      let payload = message.to_trigger_payload();
      results.push(self.engine.start(workflow, payload, cancel.clone()).await);
    }
    results
  }
}

fn matches_channel_message(workflow: &WorkflowDefinition, message: &Message) -> bool {
  match &workflow.trigger {
    Trigger::ChannelWebhook { config } => config.channel_ids.is_empty() || config.channel_ids.contains(&message.channel_id),
    _ => false,
  }
}

/// Matches an inbound HTTP request (already normalized to path/method) to
/// a tenant's active `WEBHOOK`-triggered workflows.
pub fn matches_webhook(workflow: &WorkflowDefinition, path: &str, method: &str) -> bool {
  match &workflow.trigger {
    Trigger::Webhook { config } => config.path == path && config.method.eq_ignore_ascii_case(method),
    _ => false,
  }
}
