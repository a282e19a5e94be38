use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use weave_engine::{EngineConfig, ExecutionStatus, WorkflowEngine};
use weave_model::WorkflowDefinition;
use weave_registry::NodeRegistry;
use weave_scheduler::InMemoryContinuationStore;

/// weave - a multi-tenant, event-driven workflow execution engine
#[derive(Parser)]
#[command(name = "weave")]
#[command(version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Run a workflow definition once against a trigger payload
  Run {
    /// Path to the workflow definition (JSON)
    workflow_file: PathBuf,

    /// Path to a JSON trigger payload; defaults to an empty body/query
    #[arg(long)]
    payload: Option<PathBuf>,
  },
}

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

  let cli = Cli::parse();

  match cli.command {
    Commands::Run { workflow_file, payload } => run_workflow(workflow_file, payload).await,
  }
}

async fn run_workflow(workflow_file: PathBuf, payload_file: Option<PathBuf>) -> Result<()> {
  let workflow_content = tokio::fs::read_to_string(&workflow_file)
    .await
    .with_context(|| format!("failed to read workflow file: {}", workflow_file.display()))?;

  let workflow: WorkflowDefinition = serde_json::from_str(&workflow_content)
    .with_context(|| format!("failed to parse workflow file: {}", workflow_file.display()))?;

  workflow.validate().context("workflow failed validation")?;
  eprintln!("Loaded workflow '{}' with {} nodes", workflow.name, workflow.nodes.len());

  let payload = match payload_file {
    Some(path) => {
      let raw = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read payload file: {}", path.display()))?;
      serde_json::from_str(&raw).with_context(|| format!("failed to parse payload file: {}", path.display()))?
    }
    None => serde_json::json!({"body": {}, "query": {}}),
  };

  let registry = build_registry();
  let continuations = Arc::new(InMemoryContinuationStore::new());
  let engine = WorkflowEngine::new(registry, continuations, EngineConfig::default());

  let cancel = CancellationToken::new();
  let result = engine.start(&workflow, payload, cancel).await.context("workflow execution failed")?;

  eprintln!("Execution {} finished with status {:?}", result.execution_id, result.status);
  if let Some(error) = &result.error {
    eprintln!("Error: {error}");
  }
  if let Some(continuation_id) = &result.continuation_id {
    eprintln!("Suspended; continuation id: {continuation_id}");
  }

  println!("{}", serde_json::to_string_pretty(&result.context.outputs)?);

  if result.status == ExecutionStatus::Failed {
    std::process::exit(1);
  }
  Ok(())
}

/// Wires every node executor the demo CLI can run. The AI_AGENT and
/// SEND_MESSAGE executors need live collaborators (an `LlmClient`, a
/// `ChannelManager`); this demo wires them to in-memory stand-ins from
/// `weave-collab` rather than real providers.
fn build_registry() -> NodeRegistry {
  let mut registry = NodeRegistry::new();
  registry.register(Arc::new(weave_nodes::ActionExecutor));
  registry.register(Arc::new(weave_nodes::ConditionExecutor));
  registry.register(Arc::new(weave_nodes::SwitchExecutor));
  registry.register(Arc::new(weave_nodes::LoopExecutor));
  registry.register(Arc::new(weave_nodes::ValidateExecutor));
  registry.register(Arc::new(weave_nodes::DelayExecutor::default()));
  registry.register(Arc::new(weave_nodes::HttpExecutor::default()));
  registry.register(Arc::new(weave_nodes::TransformExecutor::new(Arc::new(
    weave_resolver::MinijinjaExpressionEvaluator::new(),
  ))));
  registry.register(Arc::new(weave_nodes::SendMessageExecutor::new(Arc::new(
    weave_collab::InMemoryChannelManager::new(Vec::new()),
  ))));
  registry.register(Arc::new(weave_nodes::AiAgentExecutor::new(
    vec![Arc::new(weave_collab::StubLlmClient::new("stub"))],
    Arc::new(weave_collab::InMemoryChatMemoryStore::new()),
  )));
  registry
}
