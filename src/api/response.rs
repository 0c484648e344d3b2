//! Result envelope handed to callers that want the `{success, ...}` shape

use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, ValidationError};

/// `{success: true, data}` or `{success: false, error, details}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
            details: None,
        }
    }

    pub fn failed(error: &ApiError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            code: Some(error.error_code().to_string()),
            details: Some(error.details()),
        }
    }

    /// Input refused before any request was sent.
    pub fn rejected(error: &ValidationError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            code: Some("VALIDATION_ERROR".to_string()),
            details: None,
        }
    }
}

impl<T: Serialize> From<Result<T, ApiError>> for ApiResponse<T> {
    fn from(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::failed(&e),
        }
    }
}
