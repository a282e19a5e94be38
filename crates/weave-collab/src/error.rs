use thiserror::Error;

/// Errors surfaced by any external collaborator.
///
/// These propagate verbatim into the calling node's `NodeResult.error`
/// (§7 "Executor I/O errors") rather than aborting the engine.
#[derive(Debug, Error, Clone)]
pub enum CollabError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("channel {0} is not active")]
  ChannelInactive(String),

  #[error("adapter rejected message: {0}")]
  AdapterRejected(String),

  #[error("llm provider error: {0}")]
  Llm(String),

  #[error("store error: {0}")]
  Store(String),
}
