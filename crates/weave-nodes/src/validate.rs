use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use weave_model::{ExecutionContext, NodeResult, NodeType, WorkflowNode};
use weave_registry::{NodeError, NodeExecutor, NodeOutcome};
use weave_resolver::{get_path, FieldResolver};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://[^\s]+$").unwrap());

/// Applies a comma-separated rule grammar per field
/// (`required, email, number, string, url, min:N, max:N`) and outputs
/// `{valid, errors[], fields{}, error_count}` (§4.2.10).
pub struct ValidateExecutor;

fn is_empty_value(value: &Value) -> bool {
  match value {
    Value::Null => true,
    Value::String(s) => s.is_empty(),
    Value::Array(a) => a.is_empty(),
    Value::Object(o) => o.is_empty(),
    _ => false,
  }
}

fn numeric_value(value: &Value) -> Option<f64> {
  match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse::<f64>().ok(),
    _ => None,
  }
}

fn length_of(value: &Value) -> Option<f64> {
  match value {
    Value::String(s) => Some(s.chars().count() as f64),
    Value::Array(a) => Some(a.len() as f64),
    _ => None,
  }
}

fn apply_rule(rule: &str, value: Option<&Value>) -> Result<(), String> {
  if let Some(bound) = rule.strip_prefix("min:") {
    let n: f64 = bound.parse().map_err(|_| format!("invalid min bound {bound:?}"))?;
    let actual = value.and_then(|v| numeric_value(v).or_else(|| length_of(v)));
    return match actual {
      Some(a) if a >= n => Ok(()),
      Some(a) => Err(format!("value {a} is below minimum {n}")),
      None => Err("value has no measurable size".to_string()),
    };
  }
  if let Some(bound) = rule.strip_prefix("max:") {
    let n: f64 = bound.parse().map_err(|_| format!("invalid max bound {bound:?}"))?;
    let actual = value.and_then(|v| numeric_value(v).or_else(|| length_of(v)));
    return match actual {
      Some(a) if a <= n => Ok(()),
      Some(a) => Err(format!("value {a} exceeds maximum {n}")),
      None => Err("value has no measurable size".to_string()),
    };
  }

  match rule {
    "required" => match value {
      Some(v) if !is_empty_value(v) => Ok(()),
      _ => Err("value is required".to_string()),
    },
    "email" => match value.and_then(Value::as_str) {
      Some(s) if EMAIL_RE.is_match(s) => Ok(()),
      _ => Err("not a valid email address".to_string()),
    },
    "url" => match value.and_then(Value::as_str) {
      Some(s) if URL_RE.is_match(s) => Ok(()),
      _ => Err("not a valid url".to_string()),
    },
    "number" => match value {
      Some(v) if numeric_value(v).is_some() => Ok(()),
      _ => Err("not a number".to_string()),
    },
    "string" => match value {
      Some(Value::String(_)) => Ok(()),
      _ => Err("not a string".to_string()),
    },
    other => Err(format!("unknown validation rule {other:?}")),
  }
}

fn known_rule_token(token: &str) -> bool {
  matches!(token, "required" | "email" | "number" | "string" | "url") || token.starts_with("min:") || token.starts_with("max:")
}

#[async_trait]
impl NodeExecutor for ValidateExecutor {
  fn node_type(&self) -> NodeType {
    NodeType::Validate
  }

  fn validate(&self, config: &Map<String, Value>) -> Result<(), NodeError> {
    let Some(schema) = config.get("schema").and_then(Value::as_object) else {
      return Ok(());
    };
    for (field, rule_string) in schema {
      let Some(rules) = rule_string.as_str() else {
        return Err(NodeError::InvalidConfig {
          node_id: String::new(),
          message: format!("schema rule for {field} must be a string"),
        });
      };
      for token in rules.split(',').map(str::trim) {
        if !known_rule_token(token) {
          return Err(NodeError::InvalidConfig {
            node_id: String::new(),
            message: format!("unknown validation rule {token:?} for field {field}"),
          });
        }
      }
    }
    Ok(())
  }

  async fn execute(&self, node: &WorkflowNode, resolver: &FieldResolver<'_>, context: &ExecutionContext) -> Result<NodeOutcome, NodeError> {
    let schema = resolver.get_map("schema", Map::new());
    let fail_on_error = resolver.get_bool("fail_on_error", true);
    let tree = context.as_tree();

    let mut fields = Map::new();
    let mut errors = Vec::new();
    for (field_path, rule_string) in &schema {
      let Some(rules) = rule_string.as_str() else { continue };
      let value = get_path(&tree, field_path);
      let mut field_ok = true;
      for token in rules.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if let Err(message) = apply_rule(token, value.as_ref()) {
          field_ok = false;
          errors.push(Value::String(format!("{field_path}: {message}")));
        }
      }
      fields.insert(field_path.clone(), Value::Bool(field_ok));
    }

    let valid = errors.is_empty();
    let mut output = Map::new();
    output.insert("valid".to_string(), Value::Bool(valid));
    output.insert("error_count".to_string(), Value::from(errors.len() as i64));
    output.insert("errors".to_string(), Value::Array(errors));
    output.insert("fields".to_string(), Value::Object(fields));

    Ok(NodeOutcome::Completed(if valid || !fail_on_error {
      NodeResult::success(&node.id, &node.name, output, 0)
    } else {
      let mut result = NodeResult::failure(&node.id, &node.name, "validation failed", 0);
      result.output = output;
      result
    }))
  }
}
