use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{status_for, with_session};
use crate::jsonrpc::{JsonRpcError, RequestId};
use crate::mcp::session::RequestContext;
use crate::state::AppState;

/// Bare tool call without the JSON-RPC wrapper.
#[derive(Debug, Deserialize)]
pub struct ToolCallBody {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Value>,
    #[serde(default)]
    pub id: Option<RequestId>,
}

/// GET /tools: static tool manifest
pub async fn list_tools(State(state): State<AppState>) -> Json<Value> {
    Json(state.dispatcher.registry().manifest())
}

/// POST /tools/call: `{name, arguments, id?}` in, `{id, content}` or `{id, error}` out
pub async fn call_tool(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let ctx = RequestContext::from_headers(&headers);
    with_session(envelope(&state, &body).await, &ctx)
}

async fn envelope(state: &AppState, body: &[u8]) -> Response {
    let value: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!("Failed to parse tool call body: {e}");
            return error_envelope(RequestId::Null, JsonRpcError::parse_error());
        }
    };

    let fallback_id = RequestId::of(&value);
    let call: ToolCallBody = match serde_json::from_value(value) {
        Ok(call) => call,
        Err(e) => {
            return error_envelope(
                fallback_id,
                JsonRpcError::invalid_request().with_data(json!({ "message": e.to_string() })),
            )
        }
    };

    let id = call.id.unwrap_or(RequestId::Null);
    match state.dispatcher.call_tool(&call.name, call.arguments).await {
        Ok(result) => Json(json!({ "id": id, "content": result.content })).into_response(),
        Err(error) => error_envelope(id, error),
    }
}

fn error_envelope(id: RequestId, error: JsonRpcError) -> Response {
    (
        status_for(Some(error.code)),
        Json(json!({ "id": id, "error": error })),
    )
        .into_response()
}
