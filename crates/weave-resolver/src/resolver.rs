use serde_json::{Map, Value};

use weave_model::ExecutionContext;

use crate::path::get_path;
use crate::template::render_template;

/// Resolves a node's concrete, typed input values given an execution
/// context and the node's raw config (§4.1).
///
/// Resolution priority for a bare field name `k` (no dots):
/// 1. `trigger.body.k` or `trigger.query.k`
/// 2. `node.config.k`
/// 3. `context.outputs[...].k`, matched against the most recently produced
///    node output that carries that key
/// 4. caller-supplied default
///
/// Dotted paths (e.g. `http_1.output.json.user.email`) bypass the priority
/// chain entirely and walk the full context tree rooted at the execution.
pub struct FieldResolver<'a> {
  context: &'a ExecutionContext,
  config: &'a Map<String, Value>,
}

impl<'a> FieldResolver<'a> {
  pub fn new(context: &'a ExecutionContext, config: &'a Map<String, Value>) -> Self {
    Self { context, config }
  }

  /// Resolve a field, applying the priority chain for bare names and a
  /// full-tree walk for dotted paths. Returns `None` if nothing resolves.
  ///
  /// A resolved string is passed through template rendering before being
  /// returned, so a literal config value like `"You said: {{trigger.text}}"`
  /// comes back fully substituted without a separate render step.
  pub fn resolve(&self, key: &str) -> Option<Value> {
    if key.contains('.') {
      return get_path(&self.context.as_tree(), key).map(|v| self.render_strings(v));
    }

    if let Some(v) = get_path(&self.context.trigger, &format!("body.{key}")) {
      return Some(self.render_strings(v));
    }
    if let Some(v) = get_path(&self.context.trigger, &format!("query.{key}")) {
      return Some(self.render_strings(v));
    }
    if let Some(v) = self.config.get(key) {
      return Some(self.render_strings(v.clone()));
    }
    // Upstream output: scan visited nodes most-recent-first so the last
    // node to produce this key wins.
    for node_id in self.context.visited_nodes.iter().rev() {
      if let Some(Value::Object(out)) = self.context.outputs.get(node_id)
        && let Some(v) = out.get(key)
      {
        return Some(self.render_strings(v.clone()));
      }
    }
    None
  }

  fn render_strings(&self, value: Value) -> Value {
    if let Value::String(s) = &value {
      Value::String(render_template(s, &self.context.as_tree()))
    } else {
      value
    }
  }

  pub fn get_string(&self, key: &str, default: &str) -> String {
    self
      .resolve(key)
      .and_then(|v| coerce_string(&v))
      .unwrap_or_else(|| default.to_string())
  }

  pub fn get_int(&self, key: &str, default: i64) -> i64 {
    self.resolve(key).and_then(|v| coerce_int(&v)).unwrap_or(default)
  }

  pub fn get_float(&self, key: &str, default: f64) -> f64 {
    self.resolve(key).and_then(|v| coerce_float(&v)).unwrap_or(default)
  }

  pub fn get_bool(&self, key: &str, default: bool) -> bool {
    self.resolve(key).and_then(|v| coerce_bool(&v)).unwrap_or(default)
  }

  pub fn get_map(&self, key: &str, default: Map<String, Value>) -> Map<String, Value> {
    let tree = self.context.as_tree();
    match self.resolve(key) {
      Some(Value::Object(m)) => render_value(&Value::Object(m), &tree).as_object().cloned().unwrap_or_default(),
      _ => default,
    }
  }

  /// Like `get_map`, but skips the recursive `{{ }}` template rendering
  /// `get_map` applies to every nested string. Use this for configs whose
  /// nested strings are themselves expressions meant for the expression
  /// evaluator (e.g. TRANSFORM's `mappings`), not literal templates —
  /// running both passes would template-render the expression text away
  /// before the evaluator ever sees it.
  pub fn get_map_raw(&self, key: &str, default: Map<String, Value>) -> Map<String, Value> {
    match self.resolve(key) {
      Some(Value::Object(m)) => m,
      _ => default,
    }
  }

  pub fn get_array(&self, key: &str, default: Vec<Value>) -> Vec<Value> {
    let tree = self.context.as_tree();
    match self.resolve(key) {
      Some(Value::Array(a)) => render_value(&Value::Array(a), &tree).as_array().cloned().unwrap_or_default(),
      _ => default,
    }
  }

  /// Render `{{ path.to.field }}` templates recursively through every
  /// string in the node's config before handing it to the executor.
  /// Unresolvable tokens are left untouched (rendering is best-effort).
  pub fn render_config(&self) -> Map<String, Value> {
    let tree = self.context.as_tree();
    render_value(&Value::Object(self.config.clone()), &tree)
      .as_object()
      .cloned()
      .unwrap_or_default()
  }
}

fn render_value(value: &Value, tree: &Value) -> Value {
  match value {
    Value::String(s) => Value::String(render_template(s, tree)),
    Value::Array(items) => Value::Array(items.iter().map(|v| render_value(v, tree)).collect()),
    Value::Object(map) => {
      let mut out = Map::new();
      for (k, v) in map {
        out.insert(k.clone(), render_value(v, tree));
      }
      Value::Object(out)
    }
    other => other.clone(),
  }
}

/// `"true"|"yes"|"1"|"false"|"no"|"0"` (case-insensitive) -> bool;
/// non-zero number -> `true`; anything else -> `None` (caller defaults).
pub fn coerce_bool(value: &Value) -> Option<bool> {
  match value {
    Value::Bool(b) => Some(*b),
    Value::Number(n) => n.as_f64().map(|f| f != 0.0),
    Value::String(s) => match s.to_ascii_lowercase().as_str() {
      "true" | "yes" | "1" => Some(true),
      "false" | "no" | "0" => Some(false),
      _ => None,
    },
    _ => None,
  }
}

pub fn coerce_string(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    Value::Null => None,
    other => Some(other.to_string()),
  }
}

pub fn coerce_int(value: &Value) -> Option<i64> {
  match value {
    Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
    Value::String(s) => s.trim().parse::<i64>().ok().or_else(|| s.trim().parse::<f64>().ok().map(|f| f as i64)),
    Value::Bool(b) => Some(if *b { 1 } else { 0 }),
    _ => None,
  }
}

pub fn coerce_float(value: &Value) -> Option<f64> {
  match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse::<f64>().ok(),
    Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn ctx_with(trigger: Value, outputs: Vec<(&str, Value)>, visited: Vec<&str>) -> ExecutionContext {
    let mut ctx = ExecutionContext::new("t1", "wf1", "ex1", trigger);
    for (id, out) in outputs {
      ctx.outputs.insert(id.to_string(), out);
    }
    ctx.visited_nodes = visited.into_iter().map(|s| s.to_string()).collect();
    ctx
  }

  #[test]
  fn trigger_body_outranks_config_and_output() {
    let ctx = ctx_with(json!({"body": {"k": "from_body"}}), vec![("n1", json!({"k": "from_output"}))], vec!["n1"]);
    let mut config = Map::new();
    config.insert("k".to_string(), json!("from_config"));
    let resolver = FieldResolver::new(&ctx, &config);
    assert_eq!(resolver.resolve("k"), Some(json!("from_body")));
  }

  #[test]
  fn config_outranks_output_when_no_trigger_value() {
    let ctx = ctx_with(json!({"body": {}}), vec![("n1", json!({"k": "from_output"}))], vec!["n1"]);
    let mut config = Map::new();
    config.insert("k".to_string(), json!("from_config"));
    let resolver = FieldResolver::new(&ctx, &config);
    assert_eq!(resolver.resolve("k"), Some(json!("from_config")));
  }

  #[test]
  fn falls_back_to_most_recent_output() {
    let ctx = ctx_with(
      json!({"body": {}}),
      vec![("n1", json!({"k": "older"})), ("n2", json!({"k": "newer"}))],
      vec!["n1", "n2"],
    );
    let config = Map::new();
    let resolver = FieldResolver::new(&ctx, &config);
    assert_eq!(resolver.resolve("k"), Some(json!("newer")));
  }

  #[test]
  fn missing_key_returns_none_and_default_applies() {
    let ctx = ctx_with(json!({"body": {}}), vec![], vec![]);
    let config = Map::new();
    let resolver = FieldResolver::new(&ctx, &config);
    assert_eq!(resolver.resolve("missing"), None);
    assert_eq!(resolver.get_string("missing", "fallback"), "fallback");
  }

  #[test]
  fn dotted_path_bypasses_priority_chain() {
    let ctx = ctx_with(json!({"body": {}}), vec![("http_1", json!({"json": {"user": {"email": "a@x.io"}}}))], vec!["http_1"]);
    let config = Map::new();
    let resolver = FieldResolver::new(&ctx, &config);
    assert_eq!(resolver.resolve("http_1.output.json.user.email"), Some(json!("a@x.io")));
  }

  #[test]
  fn bool_coercion_rules() {
    assert_eq!(coerce_bool(&json!("YES")), Some(true));
    assert_eq!(coerce_bool(&json!("no")), Some(false));
    assert_eq!(coerce_bool(&json!(0)), Some(false));
    assert_eq!(coerce_bool(&json!(5)), Some(true));
    assert_eq!(coerce_bool(&json!("banana")), None);
  }

  #[test]
  fn numeric_string_coerces_to_number() {
    assert_eq!(coerce_int(&json!("42")), Some(42));
    assert_eq!(coerce_float(&json!("3.5")), Some(3.5));
  }

  #[test]
  fn render_config_recurses_into_nested_strings() {
    let ctx = ctx_with(json!({"body": {}, "text": "hello"}), vec![], vec![]);
    let mut config = Map::new();
    config.insert("message".to_string(), json!("You said: {{trigger.text}}"));
    config.insert("nested".to_string(), json!({"inner": "{{trigger.text}}!"}));
    let resolver = FieldResolver::new(&ctx, &config);
    let rendered = resolver.render_config();
    assert_eq!(rendered["message"], json!("You said: hello"));
    assert_eq!(rendered["nested"]["inner"], json!("hello!"));
  }

  #[test]
  fn render_config_preserves_unresolvable_token() {
    let ctx = ctx_with(json!({"body": {}}), vec![], vec![]);
    let mut config = Map::new();
    config.insert("message".to_string(), json!("{{missing.path}}"));
    let resolver = FieldResolver::new(&ctx, &config);
    let rendered = resolver.render_config();
    assert_eq!(rendered["message"], json!("{{missing.path}}"));
  }
}
