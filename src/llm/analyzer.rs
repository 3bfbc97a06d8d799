use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{info, warn};

use super::config::{Credentials, LLMConfig};
use super::error::AnalysisError;
use super::interpreter::interpret;
use super::prompt::{build_request, AnalysisIntent};
use super::transport::{AnalysisStatus, ChatTransport, NoopStatus, StatusSink, TransportClient};

/// Outcome of one [`AnalysisService::analyze`] call.
///
/// Holds either the answer or the error, never both, plus the time spent
/// talking to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    success: bool,
    content: Option<String>,
    error: Option<AnalysisError>,
    duration_seconds: f64,
}

impl AnalysisResult {
    pub fn succeeded(content: String, duration: Duration) -> Self {
        Self {
            success: true,
            content: Some(content),
            error: None,
            duration_seconds: duration.as_secs_f64(),
        }
    }

    pub fn failed(error: AnalysisError, duration: Duration) -> Self {
        Self {
            success: false,
            content: None,
            error: Some(error),
            duration_seconds: duration.as_secs_f64(),
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn error(&self) -> Option<&AnalysisError> {
        self.error.as_ref()
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }
}

/// User interrupt flag shared between the caller and an in-flight analysis.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    sender: Arc<watch::Sender<bool>>,
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelSignal {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        if receiver.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Turns a query plus an intent into an [`AnalysisResult`].
///
/// Each call builds its own request and makes exactly one transport attempt;
/// nothing is shared between calls except the read-only configuration.
pub struct AnalysisService<T> {
    client: TransportClient<T>,
    config: LLMConfig,
    credentials: Credentials,
    sink: Arc<dyn StatusSink>,
}

impl<T: ChatTransport> AnalysisService<T> {
    pub fn new(transport: T, config: LLMConfig, credentials: Credentials) -> Self {
        let sink: Arc<dyn StatusSink> = Arc::new(NoopStatus);
        Self {
            client: TransportClient::new(transport, config.endpoint(), sink.clone()),
            config,
            credentials,
            sink,
        }
    }

    pub fn with_status_sink(mut self, sink: Arc<dyn StatusSink>) -> Self {
        self.client.set_status_sink(sink.clone());
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &LLMConfig {
        &self.config
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Like [`analyze`](Self::analyze), with the intent given by name.
    pub async fn analyze_named(&self, query: &str, intent: &str, cancel: &CancelSignal) -> AnalysisResult {
        match intent.parse::<AnalysisIntent>() {
            Ok(intent) => self.analyze(query, intent, cancel).await,
            Err(err) => {
                warn!("Rejected analysis request: {}", err);
                AnalysisResult::failed(err, Duration::ZERO)
            }
        }
    }

    /// The caller is expected to have rejected blank queries already.
    pub async fn analyze(&self, query: &str, intent: AnalysisIntent, cancel: &CancelSignal) -> AnalysisResult {
        info!("Starting {} analysis with model {}", intent, self.config.model);

        if cancel.is_cancelled() {
            return finish(Err(AnalysisError::Cancelled), Duration::ZERO);
        }
        let request = build_request(&self.config.model, query, intent);

        if cancel.is_cancelled() {
            return finish(Err(AnalysisError::Cancelled), Duration::ZERO);
        }
        let started = Instant::now();
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return finish(Err(AnalysisError::Cancelled), started.elapsed());
            }
            outcome = self.client.send(&request, &self.credentials, self.config.timeout()) => outcome,
        };

        if !matches!(outcome.result, Err(AnalysisError::MissingCredentials)) {
            self.sink.update(&AnalysisStatus::Completed {
                duration: outcome.duration,
            });
        }

        let content = outcome.result.and_then(|body| interpret(&body));
        finish(content, outcome.duration)
    }
}

fn finish(outcome: Result<String, AnalysisError>, duration: Duration) -> AnalysisResult {
    match outcome {
        Ok(content) => {
            info!("Analysis completed in {:.2}s", duration.as_secs_f64());
            AnalysisResult::succeeded(content, duration)
        }
        Err(err) => {
            warn!(kind = err.kind().as_str(), "Analysis failed after {:.2}s: {}", duration.as_secs_f64(), err);
            AnalysisResult::failed(err, duration)
        }
    }
}
