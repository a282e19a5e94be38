use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
  #[error("expression evaluation failed: {0}")]
  ExpressionFailed(String),
}
