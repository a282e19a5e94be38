use std::collections::HashSet;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CollabError;

/// A message a SEND_MESSAGE node hands to the channel adapter (§4.2.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutgoingMessage {
  pub recipient_id: String,
  pub text: String,
  #[serde(default = "default_message_type")]
  pub message_type: String,
  #[serde(default)]
  pub attachments: Vec<Value>,
}

fn default_message_type() -> String {
  "text".to_string()
}

#[async_trait]
pub trait ChannelManager: Send + Sync {
  async fn send_message(&self, tenant_id: &str, channel_id: &str, outgoing: OutgoingMessage) -> Result<(), CollabError>;
  async fn is_active(&self, channel_id: &str) -> Result<bool, CollabError>;
}

/// In-process reference implementation: records every send for assertions
/// in executor tests and treats channel ids from a fixed allow-list as
/// active.
pub struct InMemoryChannelManager {
  active_channels: HashSet<String>,
  sent: RwLock<Vec<(String, String, OutgoingMessage)>>,
}

impl InMemoryChannelManager {
  pub fn new(active_channels: impl IntoIterator<Item = String>) -> Self {
    Self {
      active_channels: active_channels.into_iter().collect(),
      sent: RwLock::new(Vec::new()),
    }
  }

  pub fn sent_messages(&self) -> Vec<(String, String, OutgoingMessage)> {
    self.sent.read().unwrap().clone()
  }
}

#[async_trait]
impl ChannelManager for InMemoryChannelManager {
  async fn send_message(&self, tenant_id: &str, channel_id: &str, outgoing: OutgoingMessage) -> Result<(), CollabError> {
    if !self.is_active(channel_id).await? {
      return Err(CollabError::ChannelInactive(channel_id.to_string()));
    }
    self.sent.write().unwrap().push((tenant_id.to_string(), channel_id.to_string(), outgoing));
    Ok(())
  }

  async fn is_active(&self, channel_id: &str) -> Result<bool, CollabError> {
    Ok(self.active_channels.contains(channel_id))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn rejects_send_to_inactive_channel() {
    let mgr = InMemoryChannelManager::new(["c1".to_string()]);
    let result = mgr
      .send_message(
        "t1",
        "c2",
        OutgoingMessage {
          recipient_id: "u1".to_string(),
          text: "hi".to_string(),
          message_type: "text".to_string(),
          attachments: vec![],
        },
      )
      .await;
    assert!(matches!(result, Err(CollabError::ChannelInactive(_))));
  }

  #[tokio::test]
  async fn records_sent_messages_for_active_channel() {
    let mgr = InMemoryChannelManager::new(["c1".to_string()]);
    mgr
      .send_message(
        "t1",
        "c1",
        OutgoingMessage {
          recipient_id: "u1".to_string(),
          text: "hi".to_string(),
          message_type: "text".to_string(),
          attachments: vec![],
        },
      )
      .await
      .unwrap();
    assert_eq!(mgr.sent_messages().len(), 1);
  }
}
