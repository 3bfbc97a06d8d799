//! Stub transport and recording status sink shared by the llm tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::transport::{AnalysisStatus, ChatTransport, OutboundRequest, RawResponse, StatusSink, WireError};

pub(crate) enum StubReply {
    Respond { status: u16, body: Option<String> },
    Fail(WireError),
    /// Never answers.
    Hang,
}

impl StubReply {
    pub(crate) fn ok_json(body: &str) -> Self {
        Self::Respond {
            status: 200,
            body: Some(body.to_string()),
        }
    }

    pub(crate) fn content(content: &str) -> Self {
        Self::ok_json(&serde_json::json!({ "choices": [{ "message": { "content": content } }] }).to_string())
    }
}

pub(crate) struct StubTransport {
    reply: StubReply,
    calls: AtomicUsize,
    last_headers: Mutex<Vec<(String, String)>>,
    last_body: Mutex<Option<serde_json::Value>>,
}

impl StubTransport {
    pub(crate) fn new(reply: StubReply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last_headers: Mutex::new(Vec::new()),
            last_body: Mutex::new(None),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_headers(&self) -> Vec<(String, String)> {
        self.last_headers.lock().unwrap().clone()
    }

    pub(crate) fn last_body(&self) -> Option<serde_json::Value> {
        self.last_body.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for StubTransport {
    async fn post(&self, request: OutboundRequest<'_>, _timeout: Duration) -> Result<RawResponse, WireError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_headers.lock().unwrap() = request
            .headers
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        *self.last_body.lock().unwrap() = serde_json::to_value(request.body).ok();

        match &self.reply {
            StubReply::Respond { status, body } => Ok(RawResponse {
                status: *status,
                body: body.clone(),
            }),
            StubReply::Fail(err) => Err(err.clone()),
            StubReply::Hang => std::future::pending().await,
        }
    }
}

#[derive(Default)]
pub(crate) struct RecordingSink {
    updates: Mutex<Vec<AnalysisStatus>>,
}

impl RecordingSink {
    pub(crate) fn updates(&self) -> Vec<AnalysisStatus> {
        self.updates.lock().unwrap().clone()
    }
}

impl StatusSink for RecordingSink {
    fn update(&self, status: &AnalysisStatus) {
        self.updates.lock().unwrap().push(status.clone());
    }
}
