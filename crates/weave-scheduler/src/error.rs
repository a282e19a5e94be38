use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
  #[error("continuation {0} not found")]
  NotFound(String),

  #[error("store error: {0}")]
  Store(String),
}
