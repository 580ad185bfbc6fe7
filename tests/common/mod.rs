// Common test utilities and helper functions
//
// A recording fake transport so the connection manager can be driven
// without a signaling stack.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use streamlink::{
    EventSink, ManagerConfig, SessionOptions, TransportAdapter, TransportError, TransportEvent,
    TransportSession,
};
use url::Url;

/// One call to `open`
#[derive(Debug, Clone)]
pub struct OpenRecord {
    pub url: Url,
    pub options: SessionOptions,
    pub sink: EventSink,
}

impl OpenRecord {
    pub fn app(&self) -> String {
        query_param(&self.url, "app").unwrap_or_default()
    }

    pub fn stream(&self) -> String {
        query_param(&self.url, "stream").unwrap_or_default()
    }
}

#[derive(Default)]
struct FakeState {
    opened: Vec<OpenRecord>,
    open_errors: VecDeque<TransportError>,
    live_sessions: usize,
    max_live_sessions: usize,
    close_calls: usize,
}

#[derive(Clone, Default)]
pub struct FakeTransport {
    state: Arc<Mutex<FakeState>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        FakeTransport::default()
    }

    /// Make the next `open` call fail
    pub fn fail_next_open(&self, error: TransportError) {
        self.state.lock().unwrap().open_errors.push_back(error);
    }

    pub fn open_count(&self) -> usize {
        self.state.lock().unwrap().opened.len()
    }

    pub fn opened(&self) -> Vec<OpenRecord> {
        self.state.lock().unwrap().opened.clone()
    }

    pub fn last_open(&self) -> OpenRecord {
        self.state.lock().unwrap().opened.last().cloned().expect("no session opened")
    }

    /// Emit an event from the most recently opened session
    pub fn emit(&self, event: TransportEvent) {
        assert!(self.last_open().sink.emit(event), "manager dropped");
    }

    pub fn live_sessions(&self) -> usize {
        self.state.lock().unwrap().live_sessions
    }

    pub fn max_live_sessions(&self) -> usize {
        self.state.lock().unwrap().max_live_sessions
    }

    pub fn close_calls(&self) -> usize {
        self.state.lock().unwrap().close_calls
    }
}

#[async_trait::async_trait]
impl TransportAdapter for FakeTransport {
    async fn open(
        &self,
        signaling_url: &Url,
        options: &SessionOptions,
        events: EventSink,
    ) -> Result<Box<dyn TransportSession>, TransportError> {
        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.open_errors.pop_front() {
            return Err(error);
        }

        state.opened.push(OpenRecord {
            url: signaling_url.clone(),
            options: options.clone(),
            sink: events,
        });
        state.live_sessions += 1;
        state.max_live_sessions = state.max_live_sessions.max(state.live_sessions);

        Ok(Box::new(FakeSession {
            state: self.state.clone(),
            closed: false,
        }))
    }
}

struct FakeSession {
    state: Arc<Mutex<FakeState>>,
    closed: bool,
}

#[async_trait::async_trait]
impl TransportSession for FakeSession {
    async fn close(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.close_calls += 1;
        if !self.closed {
            self.closed = true;
            state.live_sessions -= 1;
        }
    }
}

pub fn query_param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Default config with a test signaling endpoint
pub fn test_config() -> ManagerConfig {
    ManagerConfig::builder()
        .signaling_url("http://127.0.0.1:8080/index/api/webrtc")
        .build()
        .expect("Failed to create test config")
}
