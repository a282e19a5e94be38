use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use weave_collab::{ChannelManager, OutgoingMessage};
use weave_model::{ExecutionContext, NodeResult, NodeType, WorkflowNode};
use weave_registry::{NodeError, NodeExecutor, NodeOutcome};
use weave_resolver::FieldResolver;

/// Resolves `channel_id`/`recipient_id`/`text`, validates the channel is
/// active, and emits through the channel adapter (§4.2.5). Adapter
/// failures propagate as a failed `NodeResult`, never as a raised error.
pub struct SendMessageExecutor {
  channels: Arc<dyn ChannelManager>,
}

impl SendMessageExecutor {
  pub fn new(channels: Arc<dyn ChannelManager>) -> Self {
    Self { channels }
  }
}

#[async_trait]
impl NodeExecutor for SendMessageExecutor {
  fn node_type(&self) -> NodeType {
    NodeType::SendMessage
  }

  fn validate(&self, config: &Map<String, Value>) -> Result<(), NodeError> {
    if config.get("channel_id").and_then(Value::as_str).map(str::is_empty).unwrap_or(true) {
      return Err(NodeError::InvalidConfig {
        node_id: String::new(),
        message: "channel_id is required".to_string(),
      });
    }
    Ok(())
  }

  async fn execute(&self, node: &WorkflowNode, resolver: &FieldResolver<'_>, context: &ExecutionContext) -> Result<NodeOutcome, NodeError> {
    let channel_id = resolver.get_string("channel_id", "");
    let recipient_id = resolver.resolve("recipient_id").and_then(|v| v.as_str().map(str::to_string)).unwrap_or_else(|| {
      context
        .trigger
        .get("sender_id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
    });
    let text = resolver
      .resolve("text")
      .or_else(|| resolver.resolve("message"))
      .and_then(|v| v.as_str().map(str::to_string))
      .unwrap_or_default();
    let message_type = resolver.get_string("message_type", "text");
    let attachments = resolver.get_array("attachments", Vec::new());

    if text.is_empty() {
      return Ok(NodeOutcome::Completed(NodeResult::failure(&node.id, &node.name, "text is required", 0)));
    }

    let outgoing = OutgoingMessage {
      recipient_id,
      text,
      message_type,
      attachments,
    };

    match self.channels.send_message(&context.tenant_id, &channel_id, outgoing).await {
      Ok(()) => Ok(NodeOutcome::Completed(NodeResult::success(&node.id, &node.name, Map::new(), 0))),
      Err(e) => Ok(NodeOutcome::Completed(NodeResult::failure(&node.id, &node.name, e.to_string(), 0))),
    }
  }
}
