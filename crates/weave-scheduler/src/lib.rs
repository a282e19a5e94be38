//! Continuation store and delay scheduler (§4.3): lets a suspended
//! execution (a DELAY node past the sync threshold, or any future
//! "wait for external event" node) persist its resume state and come
//! back to life on a worker tick instead of blocking a task.

mod error;
mod sqlite_store;
mod store;
mod worker;

pub use error::SchedulerError;
pub use sqlite_store::SqliteContinuationStore;
pub use store::{ContinuationStore, InMemoryContinuationStore};
pub use worker::{
  should_use_async, DelayScheduler, ResumeHandler, DEFAULT_BATCH_SIZE, DEFAULT_SYNC_THRESHOLD, TICK_INTERVAL,
};
