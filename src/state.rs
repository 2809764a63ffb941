use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;

use crate::mcp::Dispatcher;

/// Shared by every handler; cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    /// SSE ping period.
    pub heartbeat: Duration,
    /// Number of open SSE streams.
    pub live_streams: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher, heartbeat: Duration) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            heartbeat,
            live_streams: Arc::new(AtomicUsize::new(0)),
        }
    }
}
