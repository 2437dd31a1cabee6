//! Client for the parking-record service: reports a recognized plate as a
//! vehicle entry or exit.
//!
//! Each call is a blocking request/response. Status codes map onto a closed
//! set of outcomes that callers branch on; nothing is dropped silently.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{info, warn};

pub const API_KEY_HEADER: &str = "X-API-KEY";

/// Which record to create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Entry,
    Exit,
}

impl RecordKind {
    pub fn path(&self) -> &'static str {
        match self {
            RecordKind::Entry => "/api/v1/parking-records/entry",
            RecordKind::Exit => "/api/v1/parking-records/exit",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Entry => write!(f, "entry"),
            RecordKind::Exit => write!(f, "exit"),
        }
    }
}

/// Result of one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// 201: record created
    Recorded,
    /// 404: vehicle not registered
    NotRegistered,
    /// 403: API key rejected
    Unauthorized,
    /// Any other status
    ServerError { status: u16 },
    /// The request never got a response
    Connectivity { message: String },
}

impl SubmissionOutcome {
    pub fn from_status(status: u16) -> Self {
        match status {
            201 => SubmissionOutcome::Recorded,
            404 => SubmissionOutcome::NotRegistered,
            403 => SubmissionOutcome::Unauthorized,
            other => SubmissionOutcome::ServerError { status: other },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Recorded)
    }
}

impl fmt::Display for SubmissionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionOutcome::Recorded => write!(f, "record created"),
            SubmissionOutcome::NotRegistered => write!(f, "vehicle not registered"),
            SubmissionOutcome::Unauthorized => write!(f, "unauthorized"),
            SubmissionOutcome::ServerError { status } => write!(f, "server error (status {})", status),
            SubmissionOutcome::Connectivity { message } => write!(f, "could not reach server: {}", message),
        }
    }
}

/// Retries for connectivity failures only; HTTP statuses are never retried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff_ms: 200,
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = (self.multiplier.max(1) as u64).saturating_pow(retry.saturating_sub(1));
        Duration::from_millis(self.initial_backoff_ms.saturating_mul(factor))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_key: String::new(),
            timeout_secs: 10,
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Serialize)]
struct PlateRequest<'a> {
    plate: &'a str,
}

/// Blocking HTTP client for the record service
pub struct RecordClient {
    client: reqwest::blocking::Client,
    config: SubmissionConfig,
}

impl RecordClient {
    pub fn new(config: SubmissionConfig) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { client, config })
    }

    pub fn endpoint(&self, kind: RecordKind) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), kind.path())
    }

    /// Post `{"plate": <text>}` and classify the response
    pub fn submit(&self, plate: &str, kind: RecordKind) -> SubmissionOutcome {
        let attempts = self.config.retry.max_attempts.max(1);
        let mut outcome = self.submit_once(plate, kind);

        for retry in 1..attempts {
            if !matches!(outcome, SubmissionOutcome::Connectivity { .. }) {
                break;
            }
            let delay = self.config.retry.backoff(retry);
            warn!(%kind, retry, delay_ms = delay.as_millis() as u64, "retrying submission");
            std::thread::sleep(delay);
            outcome = self.submit_once(plate, kind);
        }

        info!(%kind, plate, outcome = %outcome, "submission finished");
        outcome
    }

    fn submit_once(&self, plate: &str, kind: RecordKind) -> SubmissionOutcome {
        let response = self
            .client
            .post(self.endpoint(kind))
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&PlateRequest { plate })
            .send();

        match response {
            Ok(resp) => SubmissionOutcome::from_status(resp.status().as_u16()),
            Err(e) => SubmissionOutcome::Connectivity { message: e.to_string() },
        }
    }
}
