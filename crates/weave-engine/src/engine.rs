use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use weave_model::{Continuation, ExecutionContext, NodeType, WorkflowDefinition, WorkflowNode};
use weave_registry::{NodeOutcome, NodeRegistry};
use weave_resolver::FieldResolver;
use weave_scheduler::ContinuationStore;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::events::{ExecutionEvent, ExecutionNotifier, NoopNotifier};

/// Terminal state of a single execution (§3, §4.4).
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionStatus {
  Completed,
  Failed,
  Suspended,
  Cancelled,
}

#[derive(Debug, Clone)]
pub struct ExecutionResult {
  pub execution_id: String,
  pub workflow_id: String,
  pub tenant_id: String,
  pub status: ExecutionStatus,
  pub context: ExecutionContext,
  pub error: Option<String>,
  pub continuation_id: Option<String>,
}

/// Internal outcome of running a node chain (the top-level execution, or
/// one pass through a loop body), before it's translated into the public
/// `ExecutionResult`.
enum ChainOutcome {
  Completed,
  Failed(String),
  Suspended { resume_at: chrono::DateTime<chrono::Utc>, resume_node_id: Option<String> },
  Cancelled,
}

/// Drives a single `WorkflowDefinition` from its entry node (or a
/// persisted `Continuation`) to a terminal state.
///
/// Generic over `N: ExecutionNotifier`, defaulting to a no-op observer.
pub struct WorkflowEngine<N: ExecutionNotifier = NoopNotifier> {
  registry: NodeRegistry,
  continuations: Arc<dyn ContinuationStore>,
  config: EngineConfig,
  notifier: N,
}

impl WorkflowEngine<NoopNotifier> {
  pub fn new(registry: NodeRegistry, continuations: Arc<dyn ContinuationStore>, config: EngineConfig) -> Self {
    Self::with_notifier(registry, continuations, config, NoopNotifier)
  }
}

impl<N: ExecutionNotifier> WorkflowEngine<N> {
  pub fn with_notifier(registry: NodeRegistry, continuations: Arc<dyn ContinuationStore>, config: EngineConfig, notifier: N) -> Self {
    Self {
      registry,
      continuations,
      config,
      notifier,
    }
  }

  /// Start a fresh execution from the workflow's entry node.
  pub async fn start(&self, workflow: &WorkflowDefinition, trigger_payload: Value, cancel: CancellationToken) -> Result<ExecutionResult, EngineError> {
    let entry = workflow.entry_node()?;
    let execution_id = Uuid::new_v4().to_string();
    let mut context = ExecutionContext::new(workflow.tenant_id.clone(), workflow.id.clone(), execution_id.clone(), trigger_payload);

    self.notifier.notify(ExecutionEvent::ExecutionStarted {
      execution_id: execution_id.clone(),
      workflow_id: workflow.id.clone(),
    });

    let outcome = self.run_chain(workflow, Some(entry.id.clone()), &mut context, &cancel).await;
    self.finish(workflow, execution_id, context, outcome).await
  }

  /// Resume a previously suspended execution.
  pub async fn resume(&self, workflow: &WorkflowDefinition, continuation: Continuation, cancel: CancellationToken) -> Result<ExecutionResult, EngineError> {
    let mut context = continuation.context;
    let execution_id = continuation.execution_id;

    let outcome = self.run_chain(workflow, Some(continuation.resume_node_id), &mut context, &cancel).await;
    self.finish(workflow, execution_id, context, outcome).await
  }

  async fn finish(
    &self,
    workflow: &WorkflowDefinition,
    execution_id: String,
    context: ExecutionContext,
    outcome: Result<ChainOutcome, EngineError>,
  ) -> Result<ExecutionResult, EngineError> {
    let outcome = outcome?;

    let (status, error, continuation_id) = match outcome {
      ChainOutcome::Completed => {
        self.notifier.notify(ExecutionEvent::ExecutionCompleted {
          execution_id: execution_id.clone(),
        });
        (ExecutionStatus::Completed, None, None)
      }
      ChainOutcome::Failed(message) => {
        self.notifier.notify(ExecutionEvent::ExecutionFailed {
          execution_id: execution_id.clone(),
          error: message.clone(),
        });
        (ExecutionStatus::Failed, Some(message), None)
      }
      ChainOutcome::Cancelled => {
        self.notifier.notify(ExecutionEvent::ExecutionCancelled {
          execution_id: execution_id.clone(),
        });
        (ExecutionStatus::Cancelled, None, None)
      }
      ChainOutcome::Suspended { resume_at, resume_node_id } => {
        let Some(resume_node_id) = resume_node_id else {
          // Suspended with nowhere to resume to: treat as completed, the
          // suspending node was the last one in the chain.
          return Ok(ExecutionResult {
            execution_id,
            workflow_id: workflow.id.clone(),
            tenant_id: workflow.tenant_id.clone(),
            status: ExecutionStatus::Completed,
            context,
            error: None,
            continuation_id: None,
          });
        };
        let continuation = Continuation {
          id: Uuid::new_v4().to_string(),
          execution_id: execution_id.clone(),
          workflow_id: workflow.id.clone(),
          tenant_id: workflow.tenant_id.clone(),
          resume_node_id,
          context: context.clone(),
          scheduled_for: resume_at,
          created_at: chrono::Utc::now(),
        };
        let continuation_id = self.continuations.schedule(continuation).await?;
        self.notifier.notify(ExecutionEvent::ExecutionSuspended {
          execution_id: execution_id.clone(),
          continuation_id: continuation_id.clone(),
        });
        (ExecutionStatus::Suspended, None, Some(continuation_id))
      }
    };

    Ok(ExecutionResult {
      execution_id,
      workflow_id: workflow.id.clone(),
      tenant_id: workflow.tenant_id.clone(),
      status,
      context,
      error,
      continuation_id,
    })
  }

  /// Runs nodes starting at `current`, following `on_success`/`on_failure`
  /// edges (and SWITCH/LOOP output overrides) until termination,
  /// suspension, a safety cap trip, or cancellation.
  ///
  /// Boxed because LOOP bodies call back into this method (§4.2.9's
  /// engine/executor split — `LoopExecutor` only resolves the iteration
  /// plan, the engine drives the actual per-item subgraph dispatch).
  fn run_chain<'a>(
    &'a self,
    workflow: &'a WorkflowDefinition,
    mut current: Option<String>,
    context: &'a mut ExecutionContext,
    cancel: &'a CancellationToken,
  ) -> Pin<Box<dyn Future<Output = Result<ChainOutcome, EngineError>> + Send + 'a>> {
    Box::pin(async move {
      while let Some(node_id) = current.take() {
        if node_id.is_empty() {
          return Ok(ChainOutcome::Completed);
        }
        if cancel.is_cancelled() {
          return Ok(ChainOutcome::Cancelled);
        }
        if context.visited_nodes.len() as u64 >= self.config.max_nodes_per_execution {
          return Err(EngineError::TooManyNodes(self.config.max_nodes_per_execution));
        }
        if context.iteration_count >= self.config.max_iterations {
          return Err(EngineError::TooManyIterations(self.config.max_iterations));
        }

        let node = workflow.get_node(&node_id).ok_or_else(|| EngineError::UnknownNode(node_id.clone()))?.clone();
        self.notifier.notify(ExecutionEvent::NodeStarted {
          execution_id: context.execution_id.clone(),
          node_id: node.id.clone(),
        });

        let result = self.run_node(&node, context, cancel).await?;
        match result {
          NodeRunResult::Suspend { resume_at } => {
            return Ok(ChainOutcome::Suspended {
              resume_at,
              resume_node_id: node.on_success.clone(),
            });
          }
          NodeRunResult::Ran(node_result) => {
            self.notifier.notify(ExecutionEvent::NodeCompleted {
              execution_id: context.execution_id.clone(),
              node_id: node.id.clone(),
              success: node_result.success,
            });

            let success = node_result.success;
            let output = node_result.output.clone();
            context.record(&node.id, output.clone());

            if success && node.node_type == NodeType::Loop {
              self.run_loop(workflow, &node, &output, context, cancel).await?;
            }

            current = self.next_node(&node, success, &output);

            if !success && current.is_none() {
              return Ok(ChainOutcome::Failed(node_result.error.unwrap_or_else(|| "node failed".to_string())));
            }
          }
        }
      }

      Ok(ChainOutcome::Completed)
    })
  }

  fn next_node(&self, node: &WorkflowNode, success: bool, output: &Map<String, Value>) -> Option<String> {
    if !success {
      return node.on_failure.clone().filter(|s| !s.is_empty());
    }

    // SWITCH/LOOP can override routing via their own output (§4.4).
    if let Some(next) = output.get("next_node").and_then(Value::as_str) {
      return Some(next.to_string());
    }

    node.on_success.clone().filter(|s| !s.is_empty())
  }

  async fn run_node(&self, node: &WorkflowNode, context: &ExecutionContext, cancel: &CancellationToken) -> Result<NodeRunResult, EngineError> {
    let executor = self.registry.get(node.node_type)?;
    let resolver = FieldResolver::new(context, &node.config);
    let timeout = node
      .timeout_ms
      .map(std::time::Duration::from_millis)
      .unwrap_or(self.config.default_node_timeout);
    let started = Instant::now();

    let outcome = tokio::select! {
      _ = cancel.cancelled() => {
        let duration_ms = started.elapsed().as_millis() as u64;
        return Ok(NodeRunResult::Ran(weave_model::NodeResult::cancelled(&node.id, &node.name, duration_ms)));
      }
      timed = tokio::time::timeout(timeout, executor.execute(node, &resolver, context)) => {
        match timed {
          Ok(Ok(outcome)) => outcome,
          Ok(Err(e)) => {
            let duration_ms = started.elapsed().as_millis() as u64;
            return Ok(NodeRunResult::Ran(weave_model::NodeResult::failure(&node.id, &node.name, e.to_string(), duration_ms)));
          }
          Err(_elapsed) => {
            let duration_ms = started.elapsed().as_millis() as u64;
            return Ok(NodeRunResult::Ran(weave_model::NodeResult::failure(&node.id, &node.name, "node execution timed out", duration_ms)));
          }
        }
      }
    };

    Ok(match outcome {
      NodeOutcome::Completed(result) => NodeRunResult::Ran(result),
      NodeOutcome::Suspend { resume_at } => NodeRunResult::Suspend { resume_at },
    })
  }

  /// Drives LOOP's per-item subgraph dispatch (§4.2.9 Open Question): the
  /// `LoopExecutor` only validated config and resolved `iterate_over` into
  /// a plan; this is where `body_node` actually runs, once per item.
  async fn run_loop(
    &self,
    workflow: &WorkflowDefinition,
    loop_node: &WorkflowNode,
    plan: &Map<String, Value>,
    context: &mut ExecutionContext,
    cancel: &CancellationToken,
  ) -> Result<(), EngineError> {
    let Some(body_node) = plan.get("body_node").and_then(Value::as_str).map(str::to_string) else {
      return Ok(());
    };
    let items = plan.get("items").and_then(Value::as_array).cloned().unwrap_or_default();
    let item_var = plan.get("item_var").and_then(Value::as_str).unwrap_or("item").to_string();
    let index_var = plan.get("index_var").and_then(Value::as_str).unwrap_or("index").to_string();
    let max_iterations = plan.get("max_iterations").and_then(Value::as_i64).unwrap_or(items.len() as i64).max(0) as usize;

    let mut results = Vec::new();
    for (index, item) in items.iter().enumerate().take(max_iterations) {
      if cancel.is_cancelled() {
        break;
      }

      let mut vars = Map::new();
      vars.insert(item_var.clone(), item.clone());
      vars.insert(index_var.clone(), Value::from(index as u64));
      let scratch_id = format!("__loop_{}_{}", loop_node.id, index);
      context.record(&scratch_id, vars);

      match self.run_chain(workflow, Some(body_node.clone()), context, cancel).await? {
        ChainOutcome::Completed => {
          if let Some(last) = context.visited_nodes.last().cloned() {
            if let Some(output) = context.outputs.get(&last) {
              results.push(output.clone());
            }
          }
        }
        ChainOutcome::Failed(message) => {
          results.push(Value::String(format!("iteration {index} failed: {message}")));
        }
        ChainOutcome::Cancelled => break,
        ChainOutcome::Suspended { .. } => return Err(EngineError::SuspendInsideLoop),
      }
    }

    let mut merged = context.outputs.get(&loop_node.id).and_then(Value::as_object).cloned().unwrap_or_default();
    merged.insert("results".to_string(), Value::Array(results));
    context.outputs.insert(loop_node.id.clone(), Value::Object(merged));
    Ok(())
  }
}

enum NodeRunResult {
  Ran(weave_model::NodeResult),
  Suspend { resume_at: chrono::DateTime<chrono::Utc> },
}
