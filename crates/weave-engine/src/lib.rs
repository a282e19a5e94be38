//! The workflow execution engine (§4.4): graph traversal, per-node
//! dispatch through `weave-registry`, suspension/resume via
//! `weave-scheduler`, and the inbound-message-to-workflow matcher (§4.5).
//!
//! Walks a single-entry-node sequential graph one node at a time, routed
//! by `on_success`/`on_failure`/output overrides, with `Suspended` and
//! `Cancelled` as first-class terminal states alongside `Completed`/`Failed`.

mod config;
mod dispatch;
mod engine;
mod error;
mod events;

pub use config::EngineConfig;
pub use dispatch::{matches_webhook, MessageProcessor};
pub use engine::{ExecutionResult, ExecutionStatus, WorkflowEngine};
pub use error::EngineError;
pub use events::{ChannelNotifier, ExecutionEvent, ExecutionNotifier, NoopNotifier};
