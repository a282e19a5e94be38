use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// The event source that starts a workflow.
///
/// Tagged on `type` so workflow definitions read naturally as JSON/YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
  /// A generic inbound HTTP webhook, matched by path/method.
  Webhook {
    #[serde(flatten)]
    config: WebhookConfig,
  },
  /// A chat-channel event (WhatsApp, Telegram, etc.), matched by channel id.
  ChannelWebhook {
    #[serde(flatten)]
    config: ChannelWebhookConfig,
  },
  /// A time-based trigger driven by a separate cron dispatcher.
  Schedule {
    #[serde(flatten)]
    config: ScheduleConfig,
  },
  /// Direct invocation from the control plane; no inbound event shape.
  Manual,
}

impl Trigger {
  /// The node id execution should start from.
  pub fn start_node(&self) -> Option<&str> {
    match self {
      Trigger::Webhook { config } => config.start_node.as_deref(),
      Trigger::ChannelWebhook { config } => config.start_node.as_deref(),
      Trigger::Schedule { config } => config.start_node.as_deref(),
      Trigger::Manual => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookConfig {
  pub path: String,
  #[serde(default = "default_method")]
  pub method: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub start_node: Option<String>,
}

fn default_method() -> String {
  "POST".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelWebhookConfig {
  /// Channel ids that gate matching; an inbound message not on one of
  /// these channels does not match this trigger.
  #[serde(default)]
  pub channel_ids: HashSet<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub start_node: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
  /// A cron expression, interpreted by the external cron dispatcher.
  pub cron: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub start_node: Option<String>,
}
