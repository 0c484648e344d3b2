//! HTTP client for the Health Beacon backend.
//!
//! Wraps a `reqwest::Client` with a fixed base URL, JSON bodies and a
//! request timeout, and classifies every failure into an [`ApiError`]:
//! - 400 → invalid input
//! - 500 → server error
//! - connection refused / unreachable → backend unavailable
//! - anything else → the server's own message when it sent one

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

use crate::error::ApiError;

/// Which backend operation a failure belongs to, for user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    SymptomAnalysis,
    NearbyDoctors,
    EmergencySigns,
    Health,
}

impl Endpoint {
    fn invalid_input_message(self) -> &'static str {
        match self {
            Self::SymptomAnalysis => "Invalid symptoms provided. Please check your input.",
            Self::NearbyDoctors => "Invalid location provided. Please check the address or coordinates.",
            Self::EmergencySigns | Self::Health => "Invalid request.",
        }
    }

    fn server_error_message(self) -> &'static str {
        match self {
            Self::SymptomAnalysis => "Server error occurred during symptom analysis.",
            Self::NearbyDoctors => "Server error occurred while searching for doctors.",
            Self::EmergencySigns => "Server error occurred while loading emergency signs.",
            Self::Health => "Backend server is not responding",
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthReport {
    pub status: Option<String>,
    pub message: Option<String>,
    pub timestamp: Option<String>,
    pub environment: Option<String>,
}

/// Client for the backend API.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    health_timeout: Duration,
}

impl ApiClient {
    /// Create a new backend client.
    pub fn new(base_url: &str, timeout_seconds: u64, health_timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        tracing::debug!(base_url = base_url, "API client initialized");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            health_timeout: Duration::from_secs(health_timeout_seconds),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a JSON body and decode the JSON answer.
    pub(crate) async fn post<T: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
        endpoint: Endpoint,
    ) -> Result<R, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(method = "POST", url = %url, "API request");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(e, endpoint))?;

        read_json(response, endpoint).await
    }

    /// GET and decode the JSON answer.
    pub(crate) async fn get<R: DeserializeOwned>(
        &self,
        path: &str,
        endpoint: Endpoint,
    ) -> Result<R, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(method = "GET", url = %url, "API request");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error(e, endpoint))?;

        read_json(response, endpoint).await
    }

    /// Check that the backend is reachable. Any 2xx counts as online.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<HealthReport, ApiError> {
        let url = format!("{}/health", self.base_url);
        debug!(method = "GET", url = %url, "API request");

        let response = self
            .client
            .get(&url)
            .timeout(self.health_timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, Endpoint::Health))?;

        let status = response.status();
        debug!(status = %status, url = %response.url(), "API response");
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(classify_status(status, error_details(text), Endpoint::Health));
        }

        // The body is informational only.
        Ok(serde_json::from_str(&text).unwrap_or_default())
    }
}

async fn read_json<R: DeserializeOwned>(
    response: reqwest::Response,
    endpoint: Endpoint,
) -> Result<R, ApiError> {
    let status = response.status();
    debug!(status = %status, url = %response.url(), "API response");

    if status.is_success() {
        response.json::<R>().await.map_err(|e| {
            error!(error = %e, ?endpoint, "Failed to parse API response");
            ApiError::Unexpected {
                message: format!("Invalid response from the server: {e}"),
                details: Value::Null,
            }
        })
    } else {
        let text = response.text().await.unwrap_or_default();
        Err(classify_status(status, error_details(text), endpoint))
    }
}

/// Error body as JSON when it parses, else the raw text.
fn error_details(text: String) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

/// Map a non-success status to an [`ApiError`].
pub(crate) fn classify_status(status: StatusCode, details: Value, endpoint: Endpoint) -> ApiError {
    match status {
        StatusCode::BAD_REQUEST => {
            warn!(?endpoint, details = %details, "Backend rejected request");
            ApiError::InvalidInput {
                message: endpoint.invalid_input_message().to_string(),
                details,
            }
        }
        StatusCode::INTERNAL_SERVER_ERROR => {
            error!(?endpoint, details = %details, "Backend server error");
            ApiError::Server {
                message: endpoint.server_error_message().to_string(),
                details,
            }
        }
        _ => {
            let message = server_message(&details)
                .unwrap_or_else(|| format!("API error: {}", status.as_u16()));
            error!(?endpoint, status = %status, message = %message, "Backend error");
            ApiError::Unexpected { message, details }
        }
    }
}

/// Map a transport failure (no HTTP status) to an [`ApiError`].
fn transport_error(e: reqwest::Error, endpoint: Endpoint) -> ApiError {
    error!(error = %e, ?endpoint, "API request failed");

    if e.is_connect() {
        ApiError::BackendUnavailable {
            details: "Connection refused".to_string(),
        }
    } else if e.is_timeout() {
        ApiError::Unexpected {
            message: "The request timed out. Please try again.".to_string(),
            details: Value::String(e.to_string()),
        }
    } else {
        ApiError::Unexpected {
            message: e.to_string(),
            details: Value::Null,
        }
    }
}

/// Pull a human-readable message out of an error body (`detail` is what
/// the backend framework sends, `message`/`error` cover the rest).
fn server_message(details: &Value) -> Option<String> {
    match details {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Object(map) => ["detail", "message", "error"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    }
}
