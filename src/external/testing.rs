//! Recording transport used by unit tests across the crate.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::client::{HttpTransport, OutboundRequest, TransportError};

/// Replies with queued responses in order and records every request.
///
/// When the queue is empty it answers with `fallback`.
pub struct RecordingTransport {
    responses: Mutex<VecDeque<Result<String, TransportError>>>,
    fallback: String,
    requests: Mutex<Vec<OutboundRequest>>,
}

impl RecordingTransport {
    pub fn replying(body: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            fallback: body.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_responses(responses: Vec<Result<String, TransportError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            fallback: String::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn request(&self, request: OutboundRequest) -> Result<String, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}
