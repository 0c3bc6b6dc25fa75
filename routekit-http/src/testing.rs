//! In-crate test transport.

use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use crate::request::RequestConfig;
use crate::response::RawResponse;
use crate::transport::Transport;
use crate::Result;

type Responder = Arc<dyn Fn(&RequestConfig) -> Result<RawResponse> + Send + Sync>;

/// Transport that records every request and answers from a closure.
#[derive(Clone)]
pub(crate) struct RecordingTransport {
    requests: Arc<Mutex<Vec<RequestConfig>>>,
    respond: Responder,
    delay: Option<Duration>,
}

impl RecordingTransport {
    /// Answers every request with an empty 200.
    pub(crate) fn new() -> Self {
        Self::responding(|request| Ok(RawResponse::new(StatusCode::OK, Bytes::new(), request.clone())))
    }

    /// Answers every request with the same JSON body.
    pub(crate) fn json(body: serde_json::Value) -> Self {
        Self::responding(move |request| RawResponse::json_body(&body, request.clone()))
    }

    pub(crate) fn responding<F>(respond: F) -> Self
    where
        F: Fn(&RequestConfig) -> Result<RawResponse> + Send + Sync + 'static,
    {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            respond: Arc::new(respond),
            delay: None,
        }
    }

    pub(crate) fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn count(&self) -> usize {
        self.requests.lock().len()
    }

    pub(crate) fn last(&self) -> Option<RequestConfig> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: RequestConfig) -> Result<RawResponse> {
        self.requests.lock().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.respond)(&request)
    }
}
