use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A normalized inbound channel event, matched against `CHANNEL_WEBHOOK`
/// triggers by the message processor (§3 "Message (trigger-shaped)").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
  pub id: String,
  pub tenant_id: String,
  pub channel_id: String,
  pub sender_id: String,
  pub content: MessageContent,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageContent {
  #[serde(rename = "type")]
  pub content_type: String,
  pub text: String,
  #[serde(default)]
  pub attachments: Vec<Value>,
}

impl Message {
  /// Build the normalized trigger payload the engine starts execution
  /// with (§6 "Inbound trigger payload").
  pub fn to_trigger_payload(&self) -> Value {
    serde_json::json!({
      "body": {},
      "query": {},
      "channel_id": self.channel_id,
      "sender_id": self.sender_id,
      "text": self.content.text,
      "attachments": self.content.attachments,
      "tenant_id": self.tenant_id,
      "timestamp": self.created_at.timestamp(),
    })
  }
}
