//! Symptom analysis and emergency-sign endpoints.

use serde_json::Value;
use tracing::{debug, error, instrument};

use super::api_client::{ApiClient, Endpoint};
use crate::domain::{AnalysisResult, AnalyzeRequest};
use crate::error::ApiError;

impl ApiClient {
    /// Analyze symptoms. Single attempt, no retries.
    #[instrument(skip(self, request), fields(symptoms = request.symptoms.len()))]
    pub async fn analyze_symptoms(&self, request: &AnalyzeRequest) -> Result<AnalysisResult, ApiError> {
        debug!(?request, "Sending symptom analysis request");

        let body: Value = self
            .post("/symptoms/analyze", request, Endpoint::SymptomAnalysis)
            .await?;

        serde_json::from_value(unwrap_analysis(body)).map_err(|e| {
            error!(error = %e, "Analysis response has an unexpected shape");
            ApiError::Unexpected {
                message: "The server returned an unexpected analysis format.".to_string(),
                details: Value::String(e.to_string()),
            }
        })
    }

    /// Warning signs that call for emergency care.
    #[instrument(skip(self))]
    pub async fn emergency_signs(&self) -> Result<Vec<String>, ApiError> {
        let body: Value = self
            .get("/symptoms/emergency-signs", Endpoint::EmergencySigns)
            .await?;

        let signs = body
            .pointer("/data/signs")
            .or_else(|| body.get("signs"))
            .and_then(Value::as_array)
            .map(|signs| {
                signs
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(signs)
    }
}

/// The envelope differs between deployments: try `data.analysis`, then
/// `analysis`, then `data`, then the body itself.
fn unwrap_analysis(mut body: Value) -> Value {
    for pointer in ["/data/analysis", "/analysis", "/data"] {
        if let Some(inner) = body.pointer_mut(pointer) {
            if inner.is_object() {
                return inner.take();
            }
        }
    }
    body
}
