use serde_json::Value;

/// Walk a dotted path (e.g. `http_1.output.json.user.email`) against a JSON
/// tree. Numeric segments index into arrays; anything else indexes into
/// objects. Returns `None` if any segment fails to resolve.
pub fn get_path(root: &Value, path: &str) -> Option<Value> {
  let mut current = root;
  for segment in path.split('.') {
    if segment.is_empty() {
      continue;
    }
    current = match current {
      Value::Object(map) => map.get(segment)?,
      Value::Array(items) => {
        let idx: usize = segment.parse().ok()?;
        items.get(idx)?
      }
      _ => return None,
    };
  }
  Some(current.clone())
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn walks_nested_objects() {
    let root = json!({"a": {"b": {"c": 42}}});
    assert_eq!(get_path(&root, "a.b.c"), Some(json!(42)));
  }

  #[test]
  fn walks_arrays_by_index() {
    let root = json!({"items": [10, 20, 30]});
    assert_eq!(get_path(&root, "items.1"), Some(json!(20)));
  }

  #[test]
  fn missing_path_returns_none() {
    let root = json!({"a": 1});
    assert_eq!(get_path(&root, "a.b.c"), None);
  }

  #[test]
  fn empty_path_returns_root() {
    let root = json!({"a": 1});
    assert_eq!(get_path(&root, ""), Some(root));
  }
}
