use std::sync::Arc;

use serde_json::{json, Map, Value};
use tokio_util::sync::CancellationToken;
use weave_engine::{EngineConfig, ExecutionStatus, WorkflowEngine};
use weave_model::{Trigger, WebhookConfig, WorkflowDefinition, WorkflowNode};
use weave_nodes::{ActionExecutor, ConditionExecutor, DelayExecutor, SwitchExecutor};
use weave_registry::NodeRegistry;
use weave_scheduler::InMemoryContinuationStore;

fn registry() -> NodeRegistry {
  let mut registry = NodeRegistry::new();
  registry.register(Arc::new(ActionExecutor));
  registry.register(Arc::new(ConditionExecutor));
  registry.register(Arc::new(SwitchExecutor));
  registry.register(Arc::new(DelayExecutor::default()));
  registry
}

fn action_node(id: &str, on_success: Option<&str>, config: Map<String, Value>) -> WorkflowNode {
  WorkflowNode {
    id: id.to_string(),
    name: id.to_string(),
    node_type: weave_model::NodeType::Action,
    config,
    on_success: on_success.map(str::to_string),
    on_failure: None,
    timeout_ms: None,
  }
}

fn set_context_config(key: &str, value: &str) -> Map<String, Value> {
  let mut config = Map::new();
  config.insert("action_type".to_string(), Value::String("set_context".to_string()));
  let mut ctx = Map::new();
  ctx.insert(key.to_string(), Value::String(value.to_string()));
  config.insert("context".to_string(), Value::Object(ctx));
  config
}

fn workflow(nodes: Vec<WorkflowNode>) -> WorkflowDefinition {
  WorkflowDefinition {
    id: "wf1".to_string(),
    tenant_id: "t1".to_string(),
    name: "test".to_string(),
    is_active: true,
    trigger: Trigger::Webhook {
      config: WebhookConfig {
        path: "/hook".to_string(),
        method: "POST".to_string(),
        start_node: Some(nodes[0].id.clone()),
      },
    },
    nodes,
  }
}

#[tokio::test]
async fn two_node_workflow_runs_to_completion() {
  let wf = workflow(vec![
    action_node("n1", Some("n2"), set_context_config("greeting", "hello")),
    action_node("n2", None, set_context_config("farewell", "bye")),
  ]);

  let store = Arc::new(InMemoryContinuationStore::new());
  let engine = WorkflowEngine::new(registry(), store, EngineConfig::default());

  let result = engine.start(&wf, json!({"body": {}, "query": {}}), CancellationToken::new()).await.unwrap();

  assert_eq!(result.status, ExecutionStatus::Completed);
  assert_eq!(result.context.outputs["n1"]["greeting"], json!("hello"));
  assert_eq!(result.context.outputs["n2"]["farewell"], json!("bye"));
  assert_eq!(result.context.visited_nodes, vec!["n1".to_string(), "n2".to_string()]);
}

#[tokio::test]
async fn switch_output_overrides_static_on_success_edge() {
  let mut switch_config = Map::new();
  switch_config.insert("field".to_string(), Value::String("trigger.body.route".to_string()));
  let mut cases = Map::new();
  cases.insert("fast".to_string(), Value::String("n3".to_string()));
  switch_config.insert("cases".to_string(), Value::Object(cases));

  let switch_node = WorkflowNode {
    id: "n1".to_string(),
    name: "n1".to_string(),
    node_type: weave_model::NodeType::Switch,
    config: switch_config,
    on_success: Some("n2".to_string()),
    on_failure: None,
    timeout_ms: None,
  };

  let wf = workflow(vec![
    switch_node,
    action_node("n2", None, set_context_config("path", "slow")),
    action_node("n3", None, set_context_config("path", "fast")),
  ]);

  let store = Arc::new(InMemoryContinuationStore::new());
  let engine = WorkflowEngine::new(registry(), store, EngineConfig::default());

  let result = engine
    .start(&wf, json!({"body": {"route": "fast"}, "query": {}}), CancellationToken::new())
    .await
    .unwrap();

  assert_eq!(result.status, ExecutionStatus::Completed);
  assert!(result.context.visited_nodes.contains(&"n3".to_string()));
  assert!(!result.context.visited_nodes.contains(&"n2".to_string()));
}

#[tokio::test]
async fn long_delay_suspends_and_persists_a_continuation() {
  let mut delay_config = Map::new();
  delay_config.insert("duration".to_string(), Value::String("60s".to_string()));

  let delay_node = WorkflowNode {
    id: "n1".to_string(),
    name: "n1".to_string(),
    node_type: weave_model::NodeType::Delay,
    config: delay_config,
    on_success: Some("n2".to_string()),
    on_failure: None,
    timeout_ms: None,
  };

  let wf = workflow(vec![delay_node, action_node("n2", None, set_context_config("done", "true"))]);

  let store = Arc::new(InMemoryContinuationStore::new());
  let engine = WorkflowEngine::new(registry(), store.clone(), EngineConfig::default());

  let result = engine.start(&wf, json!({"body": {}, "query": {}}), CancellationToken::new()).await.unwrap();

  assert_eq!(result.status, ExecutionStatus::Suspended);
  let continuation_id = result.continuation_id.expect("continuation id");

  use weave_scheduler::ContinuationStore;
  let loaded = store.load(&continuation_id).await.unwrap().expect("continuation persisted");
  assert_eq!(loaded.resume_node_id, "n2");
}
