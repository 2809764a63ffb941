pub mod health;
pub mod mcp;
pub mod tools;

use axum::http::{HeaderValue, StatusCode};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;

use crate::jsonrpc::{INTERNAL_ERROR, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR};
use crate::mcp::session::{RequestContext, SESSION_HEADER};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::health))
        // MCP endpoints
        .route("/mcp", get(mcp::mcp_get).post(mcp::mcp_post))
        .route("/sse", get(mcp::sse))
        // Side-channel listing and bare calls
        .route("/tools", get(tools::list_tools))
        .route("/tools/call", post(tools::call_tool))
        .with_state(state)
}

/// HTTP status for a JSON-RPC outcome. Bad params stay 200 with an error envelope.
pub fn status_for(error_code: Option<i32>) -> StatusCode {
    match error_code {
        None => StatusCode::OK,
        Some(PARSE_ERROR | INVALID_REQUEST | METHOD_NOT_FOUND) => StatusCode::BAD_REQUEST,
        Some(INTERNAL_ERROR) => StatusCode::INTERNAL_SERVER_ERROR,
        Some(_) => StatusCode::OK,
    }
}

/// Echo (or issue) the `mcp-session-id` header on a response.
pub fn with_session(mut response: Response, ctx: &RequestContext) -> Response {
    if let Ok(value) = HeaderValue::from_str(&ctx.session_id) {
        response.headers_mut().insert(SESSION_HEADER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UpstreamConfig;
    use crate::mcp::Dispatcher;
    use crate::tools::{ToolContext, ToolRegistry, KNOWN_TOOLS};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use httpmock::prelude::*;
    use serde_json::{json, Value};
    use std::sync::atomic::Ordering;
    use std::time::Duration;
    use tower::ServiceExt;

    fn state(base_url: String) -> AppState {
        let enabled: Vec<String> = KNOWN_TOOLS.iter().map(|s| s.to_string()).collect();
        let context = ToolContext::new(UpstreamConfig {
            base_url,
            api_key: "test-key".to_string(),
            ..UpstreamConfig::default()
        });
        AppState::new(
            Dispatcher::new(ToolRegistry::new(&enabled, context)),
            Duration::from_secs(30),
        )
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(resp: axum::response::Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(None), StatusCode::OK);
        assert_eq!(status_for(Some(PARSE_ERROR)), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(Some(METHOD_NOT_FOUND)), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(Some(-32602)), StatusCode::OK);
        assert_eq!(status_for(Some(INTERNAL_ERROR)), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_health() {
        let app = router(state("http://127.0.0.1:9".to_string()));
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["tools"].as_array().unwrap().len(), KNOWN_TOOLS.len());
    }

    #[tokio::test]
    async fn test_post_mcp_tool_call() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/teams").query_param("search", "Manchester");
                then.status(200).json_body(json!({"errors": [], "response": [
                    {"team": {"id": 33, "name": "Manchester United"}},
                    {"team": {"id": 50, "name": "Manchester City"}}
                ]}));
            })
            .await;

        let app = router(state(server.base_url()));
        let req = post_json(
            "/mcp",
            json!({"jsonrpc":"2.0","method":"tools/call","params":{"name":"search_teams","arguments":{"query":"Manchester"}},"id":1}),
        );
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key(SESSION_HEADER));

        let body = body_json(resp).await;
        assert_eq!(body["id"], 1);
        let text = body["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("Manchester United") && text.contains("Manchester City"));
    }

    #[tokio::test]
    async fn test_post_mcp_unknown_tool() {
        let app = router(state("http://127.0.0.1:9".to_string()));
        let req = post_json(
            "/mcp",
            json!({"jsonrpc":"2.0","method":"tools/call","params":{"name":"nonexistent","arguments":{}},"id":2}),
        );
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(resp).await,
            json!({"jsonrpc":"2.0","id":2,"error":{"code":-32601,"message":"Method not found"}})
        );
    }

    #[tokio::test]
    async fn test_post_mcp_malformed_body() {
        let app = router(state("http://127.0.0.1:9".to_string()));
        let req = Request::builder()
            .method("POST")
            .uri("/mcp")
            .body(Body::from("not json"))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"]["code"], PARSE_ERROR);
    }

    #[tokio::test]
    async fn test_session_header_is_echoed() {
        let app = router(state("http://127.0.0.1:9".to_string()));
        let req = Request::builder()
            .method("POST")
            .uri("/mcp")
            .header(SESSION_HEADER, "session-42")
            .body(Body::from(
                json!({"jsonrpc":"2.0","method":"initialize","params":{"capabilities":{}},"id":1}).to_string(),
            ))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[SESSION_HEADER], "session-42");
    }

    #[tokio::test]
    async fn test_notification_accepted() {
        let app = router(state("http://127.0.0.1:9".to_string()));
        let req = post_json("/mcp", json!({"jsonrpc":"2.0","method":"notifications/initialized"}));
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_get_mcp_json_listing() {
        let app = router(state("http://127.0.0.1:9".to_string()));
        let req = Request::builder().uri("/mcp").body(Body::empty()).unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let listing = body_json(resp).await;

        let req = Request::builder().uri("/tools").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(body_json(resp).await, listing);
        assert_eq!(listing["tools"][0]["name"], KNOWN_TOOLS[0]);
    }

    #[tokio::test]
    async fn test_get_mcp_event_stream() {
        let app_state = state("http://127.0.0.1:9".to_string());
        let live = app_state.live_streams.clone();
        let app = router(app_state);

        let req = Request::builder()
            .uri("/mcp")
            .header(header::ACCEPT, "text/event-stream")
            .header(SESSION_HEADER, "stream-7")
            .body(Body::empty())
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream"));
        assert_eq!(resp.headers()[SESSION_HEADER], "stream-7");
        assert_eq!(live.load(Ordering::SeqCst), 1);

        // Client goes away: the body and its heartbeat are dropped.
        drop(resp);
        assert_eq!(live.load(Ordering::SeqCst), 0);

        let req = Request::builder().uri("/sse").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert!(resp.headers().contains_key(SESSION_HEADER));
        assert_eq!(live.load(Ordering::SeqCst), 1);
        drop(resp);
        assert_eq!(live.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rest_tool_call() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/teams").query_param("search", "Arsenal");
                then.status(200).json_body(json!({"errors": [], "response": [
                    {"team": {"id": 42, "name": "Arsenal"}}
                ]}));
            })
            .await;

        let app = router(state(server.base_url()));
        let req = post_json(
            "/tools/call",
            json!({"name": "search_teams", "arguments": {"query": "Arsenal"}, "id": "abc"}),
        );
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key(SESSION_HEADER));
        let body = body_json(resp).await;
        assert_eq!(body["id"], "abc");
        assert!(body["content"][0]["text"].as_str().unwrap().contains("Arsenal"));

        let req = post_json("/tools/call", json!({"name": "nonexistent"}));
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert_eq!(body["id"], Value::Null);
        assert_eq!(body["error"]["code"], METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rest_tool_call_bad_bodies() {
        let app = router(state("http://127.0.0.1:9".to_string()));

        // No content-type and not JSON: still a result envelope, not an extractor rejection.
        let req = Request::builder()
            .method("POST")
            .uri("/tools/call")
            .header(SESSION_HEADER, "rest-1")
            .body(Body::from("{name: oops"))
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(resp.headers()[SESSION_HEADER], "rest-1");
        assert_eq!(
            body_json(resp).await,
            json!({"id": null, "error": {"code": PARSE_ERROR, "message": "Parse error"}})
        );

        // Valid JSON, wrong shape: the id is still echoed.
        let req = post_json("/tools/call", json!({"arguments": {}, "id": 9}));
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert_eq!(body["id"], 9);
        assert_eq!(body["error"]["code"], INVALID_REQUEST);
    }
}
