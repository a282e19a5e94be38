use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CollabError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
  System,
  User,
  Assistant,
  Tool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
  pub id: String,
  pub session_id: String,
  pub tenant_id: String,
  pub role: ChatRole,
  pub content: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub tool_calls: Option<Value>,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateMessageRequest {
  pub session_id: String,
  pub tenant_id: String,
  pub role: ChatRole,
  pub content: String,
  pub tool_calls: Option<Value>,
}

#[async_trait]
pub trait ChatMemoryStore: Send + Sync {
  async fn get_all_messages_by_session(&self, session_id: &str) -> Result<Vec<ChatMessage>, CollabError>;
  async fn create_message(&self, req: CreateMessageRequest) -> Result<ChatMessage, CollabError>;
  async fn clear_session_messages(&self, session_id: &str, keep_system_prompt: bool) -> Result<(), CollabError>;
}

/// In-process reference implementation, append-only per session as the
/// spec requires (§5 "the chat memory store is append-only per session").
#[derive(Default)]
pub struct InMemoryChatMemoryStore {
  sessions: RwLock<HashMap<String, Vec<ChatMessage>>>,
  next_id: std::sync::atomic::AtomicU64,
}

impl InMemoryChatMemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl ChatMemoryStore for InMemoryChatMemoryStore {
  async fn get_all_messages_by_session(&self, session_id: &str) -> Result<Vec<ChatMessage>, CollabError> {
    Ok(self.sessions.read().unwrap().get(session_id).cloned().unwrap_or_default())
  }

  async fn create_message(&self, req: CreateMessageRequest) -> Result<ChatMessage, CollabError> {
    let id = self.next_id.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    let message = ChatMessage {
      id: format!("msg-{id}"),
      session_id: req.session_id.clone(),
      tenant_id: req.tenant_id,
      role: req.role,
      content: req.content,
      tool_calls: req.tool_calls,
      created_at: Utc::now(),
    };
    self
      .sessions
      .write()
      .unwrap()
      .entry(req.session_id)
      .or_default()
      .push(message.clone());
    Ok(message)
  }

  async fn clear_session_messages(&self, session_id: &str, keep_system_prompt: bool) -> Result<(), CollabError> {
    let mut sessions = self.sessions.write().unwrap();
    if let Some(messages) = sessions.get_mut(session_id) {
      if keep_system_prompt {
        messages.retain(|m| m.role == ChatRole::System);
      } else {
        messages.clear();
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn req(session: &str, role: ChatRole, content: &str) -> CreateMessageRequest {
    CreateMessageRequest {
      session_id: session.to_string(),
      tenant_id: "t1".to_string(),
      role,
      content: content.to_string(),
      tool_calls: None,
    }
  }

  #[tokio::test]
  async fn messages_are_ordered_by_creation() {
    let store = InMemoryChatMemoryStore::new();
    store.create_message(req("s1", ChatRole::System, "be helpful")).await.unwrap();
    store.create_message(req("s1", ChatRole::User, "hi")).await.unwrap();
    let messages = store.get_all_messages_by_session("s1").await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, "be helpful");
    assert_eq!(messages[1].content, "hi");
  }

  #[tokio::test]
  async fn clear_keeping_system_prompt_retains_only_system_messages() {
    let store = InMemoryChatMemoryStore::new();
    store.create_message(req("s1", ChatRole::System, "be helpful")).await.unwrap();
    store.create_message(req("s1", ChatRole::User, "hi")).await.unwrap();
    store.clear_session_messages("s1", true).await.unwrap();
    let messages = store.get_all_messages_by_session("s1").await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, ChatRole::System);
  }

  #[tokio::test]
  async fn clear_without_keeping_system_prompt_empties_session() {
    let store = InMemoryChatMemoryStore::new();
    store.create_message(req("s1", ChatRole::User, "hi")).await.unwrap();
    store.clear_session_messages("s1", false).await.unwrap();
    assert!(store.get_all_messages_by_session("s1").await.unwrap().is_empty());
  }
}
