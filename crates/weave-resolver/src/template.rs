use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::path::get_path;

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{\s*([^{}]+?)\s*\}\}").unwrap());

/// Scan `input` for `{{ dotted.path }}` tokens and substitute each with the
/// value found by walking `tree`. A token whose path fails to resolve is
/// left in the output verbatim, token boundaries and all (§4.1: rendering
/// is best-effort, never a hard error).
///
/// Non-string resolved values are rendered via their JSON string form
/// except bare strings, which are inlined without surrounding quotes.
pub fn render_template(input: &str, tree: &Value) -> String {
  TOKEN
    .replace_all(input, |caps: &regex::Captures| {
      let path = &caps[1];
      match get_path(tree, path) {
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
        None => caps[0].to_string(),
      }
    })
    .into_owned()
}
