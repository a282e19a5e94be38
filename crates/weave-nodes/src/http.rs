use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{Map, Value};
use weave_model::{ExecutionContext, NodeResult, NodeType, WorkflowNode};
use weave_registry::{NodeError, NodeExecutor, NodeOutcome};
use weave_resolver::FieldResolver;

/// Renders `url` / `headers` / `body`, retries transport errors with
/// exponential backoff, and never retries on a non-success response code
/// (§4.2.6).
pub struct HttpExecutor {
  client: reqwest::Client,
}

impl HttpExecutor {
  pub fn new(client: reqwest::Client) -> Self {
    Self { client }
  }
}

impl Default for HttpExecutor {
  fn default() -> Self {
    Self::new(reqwest::Client::new())
  }
}

fn default_success_codes() -> Vec<i64> {
  vec![200, 201, 204]
}

#[async_trait]
impl NodeExecutor for HttpExecutor {
  fn node_type(&self) -> NodeType {
    NodeType::Http
  }

  fn validate(&self, config: &Map<String, Value>) -> Result<(), NodeError> {
    if config.get("url").and_then(Value::as_str).map(str::is_empty).unwrap_or(true) {
      return Err(NodeError::InvalidConfig {
        node_id: String::new(),
        message: "url is required".to_string(),
      });
    }
    if let Some(method) = config.get("method").and_then(Value::as_str)
      && Method::from_bytes(method.as_bytes()).is_err()
    {
      return Err(NodeError::InvalidConfig {
        node_id: String::new(),
        message: format!("invalid HTTP method {method:?}"),
      });
    }
    Ok(())
  }

  async fn execute(&self, node: &WorkflowNode, resolver: &FieldResolver<'_>, _context: &ExecutionContext) -> Result<NodeOutcome, NodeError> {
    let method_str = resolver.get_string("method", "GET");
    let method = Method::from_bytes(method_str.as_bytes()).map_err(|e| NodeError::InvalidConfig {
      node_id: node.id.clone(),
      message: format!("invalid HTTP method {method_str:?}: {e}"),
    })?;
    let url = resolver.get_string("url", "");
    let headers = resolver.get_map("headers", Map::new());
    let body = resolver.get_map("body", Map::new());
    let body = if body.is_empty() { None } else { Some(Value::Object(body)) };
    let timeout_secs = resolver.get_float("timeout", 0.0);
    let success_codes: Vec<i64> = resolver
      .get_array("success_codes", Vec::new())
      .iter()
      .filter_map(|v| v.as_i64())
      .collect();
    let success_codes = if success_codes.is_empty() { default_success_codes() } else { success_codes };
    let retry_on_failure = resolver.get_bool("retry_on_failure", false);
    let max_retries = resolver.get_int("max_retries", 3).max(0) as u32;

    let mut attempt = 0u32;
    loop {
      let mut request = self.client.request(method.clone(), &url);
      let mut has_content_type = false;
      for (k, v) in &headers {
        if k.eq_ignore_ascii_case("content-type") {
          has_content_type = true;
        }
        if let Some(s) = v.as_str() {
          request = request.header(k, s);
        }
      }
      if let Some(body_value) = &body {
        if !has_content_type {
          request = request.header("Content-Type", "application/json");
        }
        request = request.json(body_value);
      }
      if timeout_secs > 0.0 {
        request = request.timeout(Duration::from_secs_f64(timeout_secs));
      }

      match request.send().await {
        Ok(response) => {
          let status_code = response.status().as_u16() as i64;
          let raw_body = response.text().await.unwrap_or_default();
          let json_body = serde_json::from_str::<Value>(&raw_body).ok();

          let mut output = Map::new();
          output.insert("status_code".to_string(), Value::from(status_code));
          output.insert("body".to_string(), Value::String(raw_body));
          if let Some(j) = json_body {
            output.insert("json".to_string(), j);
          }

          return if success_codes.contains(&status_code) {
            Ok(NodeOutcome::Completed(NodeResult::success(&node.id, &node.name, output, 0)))
          } else {
            let mut result = NodeResult::failure(&node.id, &node.name, format!("unexpected status code {status_code}"), 0);
            result.output = output;
            Ok(NodeOutcome::Completed(result))
          };
        }
        Err(e) if retry_on_failure && attempt < max_retries => {
          attempt += 1;
          tokio::time::sleep(Duration::from_secs(attempt as u64)).await;
          continue;
        }
        Err(e) => {
          return Ok(NodeOutcome::Completed(NodeResult::failure(&node.id, &node.name, format!("transport error: {e}"), 0)));
        }
      }
    }
  }
}
