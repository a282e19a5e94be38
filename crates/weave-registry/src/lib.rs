//! The node executor contract and the registry that dispatches by
//! `NodeType` (§4.2).
//!
//! A closed, compile-time-known set of node types, each behind a uniform
//! `#[async_trait] trait ... : Send + Sync` contract; the registry is just
//! `HashMap<NodeType, Arc<dyn NodeExecutor>>`.

mod error;
mod executor;
mod registry;

pub use error::{NodeError, RegistryError};
pub use executor::{NodeExecutor, NodeOutcome};
pub use registry::NodeRegistry;
