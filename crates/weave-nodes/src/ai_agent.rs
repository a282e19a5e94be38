use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use weave_collab::{ChatMemoryStore, ChatOptions, ChatRole, CreateMessageRequest, LlmClient, LlmMessage};
use weave_model::{ExecutionContext, NodeResult, NodeType, WorkflowNode};
use weave_registry::{NodeError, NodeExecutor, NodeOutcome};
use weave_resolver::FieldResolver;

/// Runs a stateless single-turn completion, or, when `use_memory` is set,
/// loads durable chat history, appends the new turn, and persists the
/// exchange (§4.2.4).
pub struct AiAgentExecutor {
  providers: Vec<Arc<dyn LlmClient>>,
  chat_memory: Arc<dyn ChatMemoryStore>,
}

impl AiAgentExecutor {
  pub fn new(providers: Vec<Arc<dyn LlmClient>>, chat_memory: Arc<dyn ChatMemoryStore>) -> Self {
    Self { providers, chat_memory }
  }

  fn find_provider(&self, name: &str) -> Option<&Arc<dyn LlmClient>> {
    self.providers.iter().find(|p| p.provider() == name)
  }
}

fn conversation_id(resolver: &FieldResolver<'_>, context: &ExecutionContext) -> Option<String> {
  if let Some(id) = resolver.resolve("conversation_id").and_then(|v| v.as_str().map(str::to_string)) {
    return Some(id);
  }
  if let Some(sender) = context.trigger.get("sender_id").and_then(Value::as_str) {
    if let Some(channel) = context.trigger.get("channel_id").and_then(Value::as_str) {
      return Some(format!("{channel}:{sender}"));
    }
    return Some(sender.to_string());
  }
  None
}

#[async_trait]
impl NodeExecutor for AiAgentExecutor {
  fn node_type(&self) -> NodeType {
    NodeType::AiAgent
  }

  fn validate(&self, config: &Map<String, Value>) -> Result<(), NodeError> {
    if config.get("provider").and_then(Value::as_str).map(str::is_empty).unwrap_or(true) {
      return Err(NodeError::InvalidConfig {
        node_id: String::new(),
        message: "provider is required".to_string(),
      });
    }
    Ok(())
  }

  async fn execute(&self, node: &WorkflowNode, resolver: &FieldResolver<'_>, context: &ExecutionContext) -> Result<NodeOutcome, NodeError> {
    let provider_name = resolver.get_string("provider", "");
    let Some(provider) = self.find_provider(&provider_name) else {
      return Ok(NodeOutcome::Completed(NodeResult::failure(
        &node.id,
        &node.name,
        format!("no llm client registered for provider {provider_name:?}"),
        0,
      )));
    };

    let model = resolver.get_string("model", "");
    let system_prompt = resolver.get_string("system_prompt", "");
    let user_prompt = resolver
      .resolve("prompt")
      .or_else(|| resolver.resolve("user_prompt"))
      .and_then(|v| v.as_str().map(str::to_string))
      .or_else(|| context.trigger.get("text").and_then(Value::as_str).map(str::to_string))
      .unwrap_or_default();
    let use_memory = resolver.get_bool("use_memory", false);
    let options = ChatOptions {
      model: model.clone(),
      temperature: Some(resolver.get_float("temperature", 1.0)),
      max_tokens: Some(resolver.get_int("max_tokens", 1024) as u32),
    };

    let (messages, session_id) = if use_memory {
      let Some(session_id) = conversation_id(resolver, context) else {
        return Ok(NodeOutcome::Completed(NodeResult::failure(
          &node.id,
          &node.name,
          "use_memory requires a resolvable conversation_id",
          0,
        )));
      };
      let history = self.chat_memory.get_all_messages_by_session(&session_id).await.map_err(|e| NodeError::Unexpected {
        node_id: node.id.clone(),
        message: e.to_string(),
      })?;
      let mut messages: Vec<LlmMessage> = history.into_iter().map(|m| LlmMessage { role: m.role, content: m.content }).collect();
      if messages.is_empty() && !system_prompt.is_empty() {
        messages.push(LlmMessage { role: ChatRole::System, content: system_prompt.clone() });
      }
      messages.push(LlmMessage { role: ChatRole::User, content: user_prompt.clone() });
      (messages, Some(session_id))
    } else {
      let mut messages = Vec::new();
      if !system_prompt.is_empty() {
        messages.push(LlmMessage { role: ChatRole::System, content: system_prompt.clone() });
      }
      messages.push(LlmMessage { role: ChatRole::User, content: user_prompt.clone() });
      (messages, None)
    };

    let response = match provider.chat(messages, options).await {
      Ok(r) => r,
      Err(e) => return Ok(NodeOutcome::Completed(NodeResult::failure(&node.id, &node.name, e.to_string(), 0))),
    };

    if let Some(session_id) = &session_id {
      self
        .chat_memory
        .create_message(CreateMessageRequest {
          session_id: session_id.clone(),
          tenant_id: context.tenant_id.clone(),
          role: ChatRole::User,
          content: user_prompt,
          tool_calls: None,
        })
        .await
        .map_err(|e| NodeError::Unexpected { node_id: node.id.clone(), message: e.to_string() })?;
      self
        .chat_memory
        .create_message(CreateMessageRequest {
          session_id: session_id.clone(),
          tenant_id: context.tenant_id.clone(),
          role: ChatRole::Assistant,
          content: response.content.clone(),
          tool_calls: None,
        })
        .await
        .map_err(|e| NodeError::Unexpected { node_id: node.id.clone(), message: e.to_string() })?;
    }

    let mut output = Map::new();
    output.insert("ai_response".to_string(), Value::String(response.content.clone()));
    output.insert("response".to_string(), Value::String(response.content));
    output.insert("model".to_string(), Value::String(model));
    output.insert("provider".to_string(), Value::String(provider_name));
    output.insert("mode".to_string(), Value::String(if use_memory { "agent".to_string() } else { "llm".to_string() }));
    if let Some(usage) = response.usage {
      output.insert(
        "tokens_used".to_string(),
        serde_json::json!({"prompt": usage.prompt, "completion": usage.completion, "total": usage.total}),
      );
    }

    Ok(NodeOutcome::Completed(NodeResult::success(&node.id, &node.name, output, 0)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use weave_collab::{InMemoryChatMemoryStore, StubLlmClient};

  fn node(config: Map<String, Value>) -> WorkflowNode {
    WorkflowNode {
      id: "agent_1".to_string(),
      name: "agent_1".to_string(),
      node_type: NodeType::AiAgent,
      config,
      on_success: None,
      on_failure: None,
      timeout_ms: None,
    }
  }

  #[tokio::test]
  async fn stateless_mode_returns_content_and_usage() {
    let mut config = Map::new();
    config.insert("provider".to_string(), json!("stub"));
    config.insert("prompt".to_string(), json!("hello"));
    let node = node(config.clone());
    let ctx = ExecutionContext::new("t1", "wf1", "ex1", json!({}));
    let resolver = FieldResolver::new(&ctx, &config);
    let executor = AiAgentExecutor::new(vec![Arc::new(StubLlmClient::new("stub"))], Arc::new(InMemoryChatMemoryStore::new()));

    let outcome = executor.execute(&node, &resolver, &ctx).await.unwrap();
    match outcome {
      NodeOutcome::Completed(result) => {
        assert!(result.success);
        assert_eq!(result.output["mode"], json!("llm"));
        assert_eq!(result.output["ai_response"], json!("stub reply: hello"));
      }
      _ => panic!("expected completion"),
    }
  }

  #[tokio::test]
  async fn memory_mode_persists_both_turns() {
    let mut config = Map::new();
    config.insert("provider".to_string(), json!("stub"));
    config.insert("use_memory".to_string(), json!(true));
    let node = node(config.clone());
    let ctx = ExecutionContext::new("t1", "wf1", "ex1", json!({"sender_id": "u1", "channel_id": "c1", "text": "hi there"}));
    let resolver = FieldResolver::new(&ctx, &config);
    let chat_memory = Arc::new(InMemoryChatMemoryStore::new());
    let executor = AiAgentExecutor::new(vec![Arc::new(StubLlmClient::new("stub"))], chat_memory.clone());

    let outcome = executor.execute(&node, &resolver, &ctx).await.unwrap();
    assert!(matches!(outcome, NodeOutcome::Completed(r) if r.success));
    let history = chat_memory.get_all_messages_by_session("c1:u1").await.unwrap();
    assert_eq!(history.len(), 2);
  }

  #[tokio::test]
  async fn unregistered_provider_fails_the_node() {
    let mut config = Map::new();
    config.insert("provider".to_string(), json!("ghost"));
    let node = node(config.clone());
    let ctx = ExecutionContext::new("t1", "wf1", "ex1", json!({}));
    let resolver = FieldResolver::new(&ctx, &config);
    let executor = AiAgentExecutor::new(vec![Arc::new(StubLlmClient::new("stub"))], Arc::new(InMemoryChatMemoryStore::new()));

    let outcome = executor.execute(&node, &resolver, &ctx).await.unwrap();
    assert!(matches!(outcome, NodeOutcome::Completed(r) if !r.success));
  }
}
