//! Server-sent event stream: the tool manifest once, then periodic pings.
//!
//! The ping interval is owned by the stream. When a client disconnects, axum drops
//! the response body, which drops the interval with it; [`HeartbeatStream`]'s `Drop`
//! keeps the live-stream count honest.

use axum::response::sse::Event;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use serde_json::{json, Value};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_stream::wrappers::IntervalStream;

#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// `{"tools": [...]}`, sent once on connect.
    Tools(Value),
    /// Unix time in milliseconds.
    Ping(u64),
}

impl Frame {
    pub fn into_event(self) -> Event {
        match self {
            Frame::Tools(manifest) => Event::default().event("tools").data(manifest.to_string()),
            Frame::Ping(timestamp) => Event::default()
                .event("ping")
                .data(json!({ "type": "ping", "timestamp": timestamp }).to_string()),
        }
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

pub struct HeartbeatStream {
    inner: BoxStream<'static, Frame>,
    live: Arc<AtomicUsize>,
}

impl HeartbeatStream {
    pub fn new(manifest: Value, period: Duration, live: Arc<AtomicUsize>) -> Self {
        let count = live.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(live = count, "SSE client connected");

        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let pings = IntervalStream::new(ticker).map(|_| Frame::Ping(unix_millis()));

        Self {
            inner: stream::once(async move { Frame::Tools(manifest) })
                .chain(pings)
                .boxed(),
            live,
        }
    }
}

impl Stream for HeartbeatStream {
    type Item = Frame;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Frame>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl Drop for HeartbeatStream {
    fn drop(&mut self) {
        let remaining = self.live.fetch_sub(1, Ordering::SeqCst) - 1;
        tracing::info!(live = remaining, "SSE client disconnected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_manifest_then_pings() {
        let live = Arc::new(AtomicUsize::new(0));
        let manifest = json!({"tools": [{"name": "search"}]});
        let mut frames = HeartbeatStream::new(manifest.clone(), Duration::from_millis(20), live.clone());

        assert_eq!(frames.next().await, Some(Frame::Tools(manifest)));
        assert!(matches!(frames.next().await, Some(Frame::Ping(ts)) if ts > 0));
        assert!(matches!(frames.next().await, Some(Frame::Ping(_))));
        assert_eq!(live.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_drop_cancels_heartbeat() {
        let live = Arc::new(AtomicUsize::new(0));
        let first = HeartbeatStream::new(json!({"tools": []}), Duration::from_secs(30), live.clone());
        let second = HeartbeatStream::new(json!({"tools": []}), Duration::from_secs(30), live.clone());
        assert_eq!(live.load(Ordering::SeqCst), 2);

        drop(first);
        assert_eq!(live.load(Ordering::SeqCst), 1);

        // Dropping through an adapter, as axum does with the mapped body stream.
        let mapped = second.map(Frame::into_event);
        drop(mapped);
        assert_eq!(live.load(Ordering::SeqCst), 0);
    }
}
