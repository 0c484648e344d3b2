//! Error taxonomy for the symptom-checker client.
//!
//! `ValidationError` covers user input rejected before any request is sent,
//! `ApiError` classifies failed backend calls, and `PageError` is the display
//! state a page keeps when either of them (or an offline backend) stops an
//! action.

use serde_json::Value;
use thiserror::Error;

use crate::geolocation::GeolocationError;

/// User-input errors. No network call is made when one of these is raised.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Please tell us how you're feeling")]
    EmptySymptoms,

    #[error("Please add a bit more detail (at least {min} characters)")]
    SymptomsTooShort { min: usize },

    #[error("Please enter an address or use your current location")]
    MissingLocation,

    #[error("Search radius must be a positive number of kilometers")]
    InvalidRadius,

    #[error("Result limit must be at least 1")]
    InvalidLimit,
}

/// A classified backend failure.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP 400.
    #[error("{message}")]
    InvalidInput { message: String, details: Value },

    /// HTTP 500.
    #[error("{message}")]
    Server { message: String, details: Value },

    /// Connection refused or host unreachable.
    #[error("Backend unavailable: cannot connect to the server. Please ensure it is running.")]
    BackendUnavailable { details: String },

    #[error("{message}")]
    Unexpected { message: String, details: Value },
}

impl ApiError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::Server { .. } => "SERVER_ERROR",
            Self::BackendUnavailable { .. } => "BACKEND_UNAVAILABLE",
            Self::Unexpected { .. } => "UNEXPECTED",
        }
    }

    /// Supporting data for the failure: the server body when there was one.
    pub fn details(&self) -> Value {
        match self {
            Self::InvalidInput { details, .. }
            | Self::Server { details, .. }
            | Self::Unexpected { details, .. } => details.clone(),
            Self::BackendUnavailable { details } => Value::String(details.clone()),
        }
    }

    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidInput { .. })
    }
}

/// What a page shows when its primary action could not complete.
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Location(#[from] GeolocationError),

    #[error("Backend server is not available. Please try again later.")]
    BackendOffline,
}

impl PageError {
    /// Input errors are shown inline next to the form; the rest as a banner.
    pub fn is_inline(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api(err) => err.is_retryable(),
            Self::BackendOffline => true,
            Self::Validation(_) | Self::Location(_) => false,
        }
    }
}
