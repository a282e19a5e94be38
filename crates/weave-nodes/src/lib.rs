//! Executors for the ten node types the engine dispatches (§4.2).
//!
//! Each node type is an independent, narrowly-scoped executor following a
//! resolve-then-execute shape: pull typed values out of the field
//! resolver, then run the node's own behavior.

mod action;
mod ai_agent;
mod condition;
mod delay;
mod duration;
mod http;
mod loop_node;
mod send_message;
mod switch_node;
mod transform;
mod validate;

pub use action::ActionExecutor;
pub use ai_agent::AiAgentExecutor;
pub use condition::ConditionExecutor;
pub use delay::{DelayExecutor, DEFAULT_SYNC_THRESHOLD};
pub use duration::{parse_duration_string, resolve_delay_duration};
pub use http::HttpExecutor;
pub use loop_node::{LoopExecutor, DEFAULT_MAX_ITERATIONS, HARD_MAX_ITERATIONS};
pub use send_message::SendMessageExecutor;
pub use switch_node::SwitchExecutor;
pub use transform::TransformExecutor;
pub use validate::ValidateExecutor;
