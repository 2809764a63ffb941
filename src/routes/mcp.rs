use std::convert::Infallible;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::{Stream, StreamExt};

use super::{status_for, with_session};
use crate::mcp::session::RequestContext;
use crate::sse::{Frame, HeartbeatStream};
use crate::state::AppState;

/// POST /mcp: JSON-RPC dispatch
pub async fn mcp_post(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let ctx = RequestContext::from_headers(&headers);

    let response = match state.dispatcher.handle_body(&body, &ctx).await {
        Some(rpc) => (status_for(rpc.error_code()), Json(rpc)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    };
    with_session(response, &ctx)
}

/// GET /mcp: SSE stream when the client accepts `text/event-stream`, JSON tool list otherwise
pub async fn mcp_get(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let wants_stream = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/event-stream"));

    if wants_stream {
        let ctx = RequestContext::from_headers(&headers);
        with_session(event_stream(&state).into_response(), &ctx)
    } else {
        Json(state.dispatcher.registry().manifest()).into_response()
    }
}

/// GET /sse: SSE stream only
pub async fn sse(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let ctx = RequestContext::from_headers(&headers);
    with_session(event_stream(&state).into_response(), &ctx)
}

fn event_stream(state: &AppState) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let frames = HeartbeatStream::new(
        state.dispatcher.registry().manifest(),
        state.heartbeat,
        state.live_streams.clone(),
    );
    Sse::new(frames.map(|frame: Frame| Ok(frame.into_event())))
}
