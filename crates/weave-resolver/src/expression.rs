use minijinja::Environment;
use serde_json::Value;

use crate::error::ResolveError;

/// Evaluates an explicit expression against the execution context tree.
///
/// This is a narrower contract than [`crate::render_template`]: it is used
/// where a node declares a single expression to be evaluated to a typed
/// value (TRANSFORM's field mappings), rather than a string to interpolate
/// tokens into. The trait exists so a future CEL or JSONLogic evaluator can
/// be swapped in without touching node executors.
pub trait ExpressionEvaluator: Send + Sync {
  fn evaluate(&self, expression: &str, context: &Value) -> Result<Value, ResolveError>;
}

/// Default [`ExpressionEvaluator`], backed by `minijinja`.
///
/// `minijinja`'s own undefined-variable handling (rendering as an empty
/// string) is intentionally not relied on here the way
/// [`crate::render_template`] avoids it: an expression that references an
/// undefined path is treated as evaluation failure, not a silent empty
/// value, since TRANSFORM mappings need to tell "resolved to null" apart
/// from "path doesn't exist".
pub struct MinijinjaExpressionEvaluator {
  env: Environment<'static>,
}

impl MinijinjaExpressionEvaluator {
  pub fn new() -> Self {
    let mut env = Environment::new();
    env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);
    Self { env }
  }
}

impl Default for MinijinjaExpressionEvaluator {
  fn default() -> Self {
    Self::new()
  }
}

impl ExpressionEvaluator for MinijinjaExpressionEvaluator {
  fn evaluate(&self, expression: &str, context: &Value) -> Result<Value, ResolveError> {
    // A mapping's source expression may be a bare expression (`trigger.text`,
    // `'ok'`, `1 + 2`) or already wrapped in `{{ }}` the way the rest of the
    // config's templated strings are (`{{http_1.output.json.name}}`) — only
    // wrap it ourselves when it isn't already a print statement.
    let trimmed = expression.trim();
    let wrapped = if trimmed.starts_with("{{") && trimmed.ends_with("}}") {
      trimmed.to_string()
    } else {
      format!("{{{{ {expression} }}}}")
    };
    let tmpl = self
      .env
      .template_from_str(&wrapped)
      .map_err(|e| ResolveError::ExpressionFailed(e.to_string()))?;
    let ctx = minijinja::Value::from_serialize(context);
    let rendered = tmpl
      .render(ctx)
      .map_err(|e| ResolveError::ExpressionFailed(e.to_string()))?;

    // minijinja always renders to a string; recover richer JSON types by
    // reparsing when the whole output looks like a JSON literal, falling
    // back to the raw string otherwise.
    match serde_json::from_str::<Value>(&rendered) {
      Ok(v) => Ok(v),
      Err(_) => Ok(Value::String(rendered)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn evaluates_simple_arithmetic() {
    let eval = MinijinjaExpressionEvaluator::new();
    let result = eval.evaluate("1 + 2", &json!({})).unwrap();
    assert_eq!(result, json!(3));
  }

  #[test]
  fn resolves_context_path() {
    let eval = MinijinjaExpressionEvaluator::new();
    let ctx = json!({"trigger": {"text": "hi"}});
    let result = eval.evaluate("trigger.text", &ctx).unwrap();
    assert_eq!(result, json!("hi"));
  }

  #[test]
  fn undefined_path_is_an_error_not_empty_string() {
    let eval = MinijinjaExpressionEvaluator::new();
    let result = eval.evaluate("trigger.missing.deeper", &json!({"trigger": {}}));
    assert!(result.is_err());
  }

  #[test]
  fn string_concatenation_stays_a_string() {
    let eval = MinijinjaExpressionEvaluator::new();
    let ctx = json!({"trigger": {"name": "Ada"}});
    let result = eval.evaluate("'hello ' ~ trigger.name", &ctx).unwrap();
    assert_eq!(result, json!("hello Ada"));
  }
}
