//! Client for the football statistics API.
//!
//! Every tool call becomes one `GET base_url + path` with the API key in the
//! `x-apisports-key` header. The body is the provider's usual envelope:
//!
//! ```json
//! { "get": "teams", "parameters": {...}, "errors": [], "results": 2, "response": [...] }
//! ```
//!
//! Only `errors` and `response` are looked at. No retries, no timeout
//! override: the shared `reqwest::Client` defaults apply.

pub mod project;

use serde_json::Value;

use crate::config::UpstreamConfig;
use crate::error::{ToolError, ToolResult};

pub const API_KEY_HEADER: &str = "x-apisports-key";

/// Longest slice of an error body echoed back in [`ToolError::Status`].
const BODY_EXCERPT_LEN: usize = 200;

/// Endpoint path plus query pairs, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamQuery {
    pub path: &'static str,
    pub params: Vec<(&'static str, String)>,
}

impl UpstreamQuery {
    pub fn new(path: &'static str) -> Self {
        Self {
            path,
            params: Vec::new(),
        }
    }

    pub fn param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.params.push((key, value.into()));
        self
    }

    pub fn param_opt(self, key: &'static str, value: Option<String>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Issue the query and return the `response` member of the body. A missing or
    /// null `response` reads as an empty list; a scalar one is a payload error.
    pub async fn get(&self, query: &UpstreamQuery) -> ToolResult<Value> {
        let url = format!("{}{}", self.base_url, query.path);
        tracing::debug!(path = query.path, params = ?query.params, "upstream request");

        let resp = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(&query.params)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ToolError::Status {
                status: status.as_u16(),
                body: body.chars().take(BODY_EXCERPT_LEN).collect(),
            });
        }

        let mut body: Value = resp.json().await?;

        if let Some(message) = api_errors(&body) {
            return Err(ToolError::Api(message));
        }

        match body.get_mut("response").map(Value::take) {
            None | Some(Value::Null) => Ok(Value::Array(Vec::new())),
            Some(response @ (Value::Array(_) | Value::Object(_))) => Ok(response),
            Some(other) => Err(ToolError::Payload(format!(
                "expected `response` to be an array or object, got {other}"
            ))),
        }
    }
}

/// The provider reports failures (bad key, quota, bad parameter) with HTTP 200
/// and a non-empty `errors` member, either an object or an array.
fn api_errors(body: &Value) -> Option<String> {
    let messages: Vec<String> = match body.get("errors")? {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{k}: {}", v.as_str().unwrap_or(&v.to_string())))
            .collect(),
        Value::Array(items) => items
            .iter()
            .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
            .collect(),
        _ => Vec::new(),
    };

    if messages.is_empty() {
        None
    } else {
        Some(messages.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> UpstreamClient {
        UpstreamClient::new(&UpstreamConfig {
            base_url: server.base_url(),
            api_key: "test-key".to_string(),
            ..UpstreamConfig::default()
        })
    }

    #[test]
    fn test_api_errors_shapes() {
        assert_eq!(api_errors(&json!({"errors": []})), None);
        assert_eq!(api_errors(&json!({"response": []})), None);
        assert_eq!(
            api_errors(&json!({"errors": {"token": "Error/Missing application key."}})),
            Some("token: Error/Missing application key.".to_string())
        );
        assert_eq!(
            api_errors(&json!({"errors": ["quota exceeded"]})),
            Some("quota exceeded".to_string())
        );
    }

    #[test]
    fn test_query_builder_keeps_order() {
        let query = UpstreamQuery::new("/fixtures")
            .param("league", "39")
            .param_opt("team", None)
            .param_opt("season", Some("2024".to_string()))
            .param("next", "10");
        assert_eq!(
            query.params,
            vec![
                ("league", "39".to_string()),
                ("season", "2024".to_string()),
                ("next", "10".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_get_sends_key_and_params() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/teams")
                    .query_param("search", "Arsenal")
                    .header(API_KEY_HEADER, "test-key");
                then.status(200).json_body(json!({
                    "errors": [],
                    "results": 1,
                    "response": [{"team": {"id": 42, "name": "Arsenal"}}]
                }));
            })
            .await;

        let client = client_for(&server);
        let response = client
            .get(&UpstreamQuery::new("/teams").param("search", "Arsenal"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response[0]["team"]["name"], "Arsenal");
    }

    #[tokio::test]
    async fn test_missing_response_is_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/odds");
                then.status(200).json_body(json!({"errors": []}));
            })
            .await;

        let response = client_for(&server)
            .get(&UpstreamQuery::new("/odds"))
            .await
            .unwrap();
        assert_eq!(response, json!([]));
    }

    #[tokio::test]
    async fn test_scalar_response_is_payload_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/teams");
                then.status(200).json_body(json!({"errors": [], "response": "oops"}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/odds");
                then.status(200).json_body(json!({"errors": [], "response": null}));
            })
            .await;

        let err = client_for(&server)
            .get(&UpstreamQuery::new("/teams"))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Payload(_)));
        let rpc = err.to_jsonrpc_error();
        assert_eq!(rpc.code, crate::jsonrpc::INTERNAL_ERROR);
        assert!(rpc.message.starts_with("Unexpected upstream payload"));

        let response = client_for(&server)
            .get(&UpstreamQuery::new("/odds"))
            .await
            .unwrap();
        assert_eq!(response, json!([]));
    }

    #[tokio::test]
    async fn test_api_error_in_ok_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/teams");
                then.status(200).json_body(json!({
                    "errors": {"token": "Error/Missing application key."},
                    "response": []
                }));
            })
            .await;

        let err = client_for(&server)
            .get(&UpstreamQuery::new("/teams"))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Api(_)));
        assert!(err.to_string().contains("Missing application key"));
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/fixtures");
                then.status(503).body("service unavailable");
            })
            .await;

        let err = client_for(&server)
            .get(&UpstreamQuery::new("/fixtures"))
            .await
            .unwrap_err();
        match err {
            ToolError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "service unavailable");
            }
            other => panic!("expected Status error, got {other:?}"),
        }
    }
}
