use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::chat_memory::ChatRole;
use crate::error::CollabError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmMessage {
  pub role: ChatRole,
  pub content: String,
}

#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
  pub model: String,
  pub temperature: Option<f64>,
  pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
  pub prompt: u32,
  pub completion: u32,
  pub total: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
  pub content: String,
  pub usage: Option<TokenUsage>,
}

/// One LLM provider's chat completion contract. The spec treats streaming
/// as optional; this trait models the non-streaming path only, matching
/// what AI_AGENT actually consumes (§4.2.4).
#[async_trait]
pub trait LlmClient: Send + Sync {
  fn provider(&self) -> &str;
  async fn chat(&self, messages: Vec<LlmMessage>, options: ChatOptions) -> Result<ChatResponse, CollabError>;
}

/// Deterministic stand-in used by tests and local runs: echoes the last
/// user turn back with a fixed prefix rather than calling out to a real
/// provider.
pub struct StubLlmClient {
  provider: String,
}

impl StubLlmClient {
  pub fn new(provider: impl Into<String>) -> Self {
    Self { provider: provider.into() }
  }
}

#[async_trait]
impl LlmClient for StubLlmClient {
  fn provider(&self) -> &str {
    &self.provider
  }

  async fn chat(&self, messages: Vec<LlmMessage>, _options: ChatOptions) -> Result<ChatResponse, CollabError> {
    let last_user = messages
      .iter()
      .rev()
      .find(|m| m.role == ChatRole::User)
      .map(|m| m.content.clone())
      .unwrap_or_default();
    Ok(ChatResponse {
      content: format!("stub reply: {last_user}"),
      usage: Some(TokenUsage {
        prompt: messages.iter().map(|m| m.content.split_whitespace().count() as u32).sum(),
        completion: 2,
        total: 0,
      }),
    })
  }
}
