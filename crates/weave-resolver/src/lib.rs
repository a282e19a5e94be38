//! Field resolution, template rendering, and expression evaluation.
//!
//! Implements the layered lookup across trigger / node config / upstream
//! output / default (§4.1), plus literal-preserving `{{ }}` template
//! rendering and strict-mode expression evaluation for TRANSFORM.

mod error;
mod expression;
mod path;
mod resolver;
mod template;

pub use error::ResolveError;
pub use expression::{ExpressionEvaluator, MinijinjaExpressionEvaluator};
pub use path::get_path;
pub use resolver::FieldResolver;
pub use template::render_template;
