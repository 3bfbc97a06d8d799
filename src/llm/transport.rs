//! One chat-completion attempt over HTTP.
//!
//! [`TransportClient`] owns the policy (credentials, headers, timeout, status
//! classification, duration) and delegates the wire work to a [`ChatTransport`].
//! The production transport is [`HttpTransport`]; tests plug in stubs.

use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tokio::time::Instant;
use tracing::debug;

use super::config::Credentials;
use super::error::{excerpt, AnalysisError};
use super::prompt::ChatRequest;

/// Progress notifications emitted while a request is in flight.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisStatus {
    Sending { model: String },
    Completed { duration: Duration },
}

/// Receives [`AnalysisStatus`] updates. Rendering is up to the implementor.
pub trait StatusSink: Send + Sync {
    fn update(&self, status: &AnalysisStatus);
}

/// Discards every update.
#[derive(Debug, Default)]
pub struct NoopStatus;

impl StatusSink for NoopStatus {
    fn update(&self, _status: &AnalysisStatus) {}
}

/// Reports updates through `tracing`.
#[derive(Debug, Default)]
pub struct LogStatus;

impl StatusSink for LogStatus {
    fn update(&self, status: &AnalysisStatus) {
        match status {
            AnalysisStatus::Sending { model } => tracing::info!("Sending request to {}", model),
            AnalysisStatus::Completed { duration } => {
                tracing::info!("Request completed in {:.2}s", duration.as_secs_f64())
            }
        }
    }
}

pub struct OutboundRequest<'a> {
    pub url: &'a str,
    pub headers: Vec<(&'static str, String)>,
    pub body: &'a ChatRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    /// `None` when the body could not be read.
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WireError {
    #[error("request timed out")]
    Timeout,

    #[error("{0}")]
    Network(String),
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn post(&self, request: OutboundRequest<'_>, timeout: Duration) -> Result<RawResponse, WireError>;
}

#[async_trait]
impl<T: ChatTransport + ?Sized> ChatTransport for Arc<T> {
    async fn post(&self, request: OutboundRequest<'_>, timeout: Duration) -> Result<RawResponse, WireError> {
        (**self).post(request, timeout).await
    }
}

pub struct HttpTransport {
    http_client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().build()?;
        Ok(Self { http_client })
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn post(&self, request: OutboundRequest<'_>, timeout: Duration) -> Result<RawResponse, WireError> {
        let mut builder = self.http_client.post(request.url).timeout(timeout);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.as_str());
        }

        let response = builder.json(request.body).send().await.map_err(wire_error)?;

        let status = response.status();
        if !status.is_success() {
            return Ok(RawResponse {
                status: status.as_u16(),
                body: response.text().await.ok(),
            });
        }

        let body = response.text().await.map_err(wire_error)?;
        Ok(RawResponse {
            status: status.as_u16(),
            body: Some(body),
        })
    }
}

fn wire_error(e: reqwest::Error) -> WireError {
    if e.is_timeout() {
        return WireError::Timeout;
    }

    let mut detail = e.to_string();
    let mut source = StdError::source(&e);
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = StdError::source(cause);
    }
    WireError::Network(detail)
}

/// Result of a single attempt, with the time it took.
#[derive(Debug)]
pub struct TransportOutcome {
    pub result: Result<Value, AnalysisError>,
    pub duration: Duration,
}

pub struct TransportClient<T> {
    transport: T,
    endpoint: String,
    sink: Arc<dyn StatusSink>,
}

impl<T: ChatTransport> TransportClient<T> {
    pub fn new(transport: T, endpoint: String, sink: Arc<dyn StatusSink>) -> Self {
        Self {
            transport,
            endpoint,
            sink,
        }
    }

    pub fn set_status_sink(&mut self, sink: Arc<dyn StatusSink>) {
        self.sink = sink;
    }

    /// Send `request` once. Never retries.
    pub async fn send(&self, request: &ChatRequest, credentials: &Credentials, timeout: Duration) -> TransportOutcome {
        let Some(api_key) = credentials.api_key() else {
            return TransportOutcome {
                result: Err(AnalysisError::MissingCredentials),
                duration: Duration::ZERO,
            };
        };

        let outbound = OutboundRequest {
            url: &self.endpoint,
            headers: request_headers(api_key, credentials),
            body: request,
        };

        self.sink.update(&AnalysisStatus::Sending {
            model: request.model.clone(),
        });
        debug!("Calling chat completion API: {} with model {}", self.endpoint, request.model);

        let started = Instant::now();
        let wire = tokio::time::timeout(timeout, self.transport.post(outbound, timeout)).await;

        let result = match wire {
            Err(_) | Ok(Err(WireError::Timeout)) => Err(AnalysisError::Timeout {
                limit_secs: timeout.as_secs(),
                elapsed_secs: started.elapsed().as_secs_f64(),
            }),
            Ok(Err(WireError::Network(detail))) => Err(AnalysisError::NetworkError { detail }),
            Ok(Ok(raw)) => decode(raw),
        };

        TransportOutcome {
            result,
            duration: started.elapsed(),
        }
    }
}

fn request_headers(api_key: &str, credentials: &Credentials) -> Vec<(&'static str, String)> {
    let mut headers = vec![
        ("Authorization", format!("Bearer {}", api_key)),
        ("Content-Type", "application/json".to_string()),
    ];
    if let Some(url) = &credentials.site_url {
        headers.push(("HTTP-Referer", url.clone()));
    }
    if let Some(name) = &credentials.site_name {
        headers.push(("X-Title", name.clone()));
    }
    headers
}

fn decode(raw: RawResponse) -> Result<Value, AnalysisError> {
    if !(200..300).contains(&raw.status) {
        return Err(AnalysisError::HttpError {
            status: raw.status,
            body_excerpt: raw.body.as_deref().map(excerpt),
        });
    }

    let body = raw.body.unwrap_or_default();
    serde_json::from_str(&body).map_err(|e| AnalysisError::MalformedResponse {
        detail: e.to_string(),
        excerpt: excerpt(&body),
    })
}
