use async_trait::async_trait;
use reqwest::Client;
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Prefix of the proxy route a touch request is sent to
pub const TOUCH_PATH_PREFIX: &str = "/extensions/touch-";
/// Message carried by a touch that got a non-2xx response
pub const NOT_OK_MESSAGE: &str = "Network response was not ok";
/// Label of every diagnostic record emitted by a failed touch
pub const DIAGNOSTIC_LABEL: &str = "Error:";
pub const CONTENT_TYPE_JSON: &str = "application/json";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TouchError {
    #[error("Network response was not ok")]
    NotOk { status: u16 },
    #[error("{0}")]
    Transport(String),
}

/// The concrete object a touch is aimed at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTarget {
    pub namespace: String,
    pub name: String,
}

/// A single touch, built fresh for every activation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TouchRequest {
    pub slug: String,
    pub target: Option<ResourceTarget>,
}

impl TouchRequest {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            target: None,
        }
    }

    pub fn with_target(mut self, target: Option<ResourceTarget>) -> Self {
        self.target = target;
        self
    }

    /// `/extensions/touch-<slug>`, followed by `/<namespace>/<name>` when aimed at an object
    pub fn path(&self) -> String {
        match &self.target {
            Some(target) => format!(
                "{}{}/{}/{}",
                TOUCH_PATH_PREFIX, self.slug, target.namespace, target.name
            ),
            None => format!("{}{}", TOUCH_PATH_PREFIX, self.slug),
        }
    }
}

/// What goes over the wire for one touch. There is never a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutRequest {
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl PutRequest {
    pub fn json(path: String) -> Self {
        Self {
            path,
            headers: vec![("Content-Type".to_string(), CONTENT_TYPE_JSON.to_string())],
        }
    }
}

/// Sends a bodiless PUT and reports the response status code
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TouchTransport: Send + Sync {
    async fn put(&self, request: &PutRequest) -> Result<u16, TouchError>;
}

/// Transport backed by reqwest, resolving paths against a base URL
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        // No timeout: a touch runs until the server answers or the connection fails
        let client = Client::builder()
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl TouchTransport for HttpTransport {
    async fn put(&self, request: &PutRequest) -> Result<u16, TouchError> {
        let url = format!("{}{}", self.base_url, request.path);
        debug!("PUT {}", url);

        let mut builder = self.client.put(&url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TouchError::Transport(e.to_string()))?;

        Ok(response.status().as_u16())
    }
}

/// Receives `(label, error)` records for failed touches
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, label: &str, error: &TouchError);
}

/// Writes diagnostics to the tracing subscriber
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn record(&self, label: &str, error: &TouchError) {
        error!("{} {}", label, error);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRecord {
    pub label: String,
    pub error: TouchError,
}

impl DiagnosticRecord {
    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

/// Keeps diagnostics in memory so they can be inspected
#[derive(Debug, Default)]
pub struct MemoryDiagnostics {
    records: Mutex<Vec<DiagnosticRecord>>,
}

impl MemoryDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<DiagnosticRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

impl DiagnosticSink for MemoryDiagnostics {
    fn record(&self, label: &str, error: &TouchError) {
        if let Ok(mut records) = self.records.lock() {
            records.push(DiagnosticRecord {
                label: label.to_string(),
                error: error.clone(),
            });
        }
    }
}

/// Transport and diagnostics shared by every touch action of a module
#[derive(Clone)]
pub struct TouchWiring {
    pub transport: Arc<dyn TouchTransport>,
    pub diagnostics: Arc<dyn DiagnosticSink>,
}

impl TouchWiring {
    pub fn new(transport: Arc<dyn TouchTransport>, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            transport,
            diagnostics,
        }
    }

    /// Real HTTP transport with failures going to the log
    pub fn http(base_url: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self::new(
            Arc::new(HttpTransport::new(base_url)?),
            Arc::new(TracingDiagnostics),
        ))
    }
}

/// Fire-and-forget mutation bound to a clickable control.
///
/// `activate` always resolves to `()`: a failed request is reported to the
/// diagnostic sink and then dropped. There is no retry and no timeout.
#[derive(Clone)]
pub struct TouchAction {
    request: TouchRequest,
    wiring: TouchWiring,
}

impl TouchAction {
    pub fn new(request: TouchRequest, wiring: TouchWiring) -> Self {
        Self { request, wiring }
    }

    pub fn request(&self) -> &TouchRequest {
        &self.request
    }

    pub async fn activate(&self) {
        if let Err(err) = self.send().await {
            self.wiring.diagnostics.record(DIAGNOSTIC_LABEL, &err);
        }
    }

    /// Runs the action as its own task; repeated triggers are not deduplicated
    pub fn trigger(&self) -> JoinHandle<()> {
        let action = self.clone();
        tokio::spawn(async move { action.activate().await })
    }

    async fn send(&self) -> Result<(), TouchError> {
        let put = PutRequest::json(self.request.path());
        let status = self.wiring.transport.put(&put).await?;
        if !(200..300).contains(&status) {
            return Err(TouchError::NotOk { status });
        }
        debug!("Touched {} ({})", put.path, status);
        Ok(())
    }
}

impl PartialEq for TouchAction {
    fn eq(&self, other: &Self) -> bool {
        self.request == other.request
    }
}

impl fmt::Debug for TouchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TouchAction")
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}
