//! Analysis results page.

use tracing::debug;

use super::{AnalysisPayload, BackendStatus, DoctorsPayload, Navigation, Page, Payload};
use crate::domain::{AnalysisResult, Condition, Specialist};
use crate::error::PageError;
use crate::services::ApiClient;

#[derive(Debug)]
pub struct ResultsPage {
    payload: AnalysisPayload,
    conditions: Vec<Condition>,
    emergency_signs: Vec<String>,
    backend: BackendStatus,
}

impl ResultsPage {
    pub fn new(payload: AnalysisPayload) -> Self {
        let conditions = payload.analysis.derived_conditions();
        Self {
            payload,
            conditions,
            emergency_signs: Vec::new(),
            backend: BackendStatus::Unknown,
        }
    }

    /// Health check, then the emergency signs if the backend answers.
    pub async fn mount(&mut self, api: &ApiClient) {
        self.backend = BackendStatus::probe(api).await;
        if self.backend.is_online() {
            match api.emergency_signs().await {
                Ok(signs) => self.emergency_signs = signs,
                Err(e) => debug!(error = %e, "Emergency signs unavailable"),
            }
        }
    }

    pub fn symptoms(&self) -> &str {
        &self.payload.symptoms
    }

    pub fn analysis(&self) -> &AnalysisResult {
        &self.payload.analysis
    }

    /// Conditions with severity and description filled in.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn emergency_signs(&self) -> &[String] {
        &self.emergency_signs
    }

    pub fn backend(&self) -> &BackendStatus {
        &self.backend
    }

    pub fn can_find_doctors(&self) -> bool {
        self.backend.is_online()
    }

    pub(crate) fn set_backend(&mut self, status: BackendStatus) {
        self.backend = status;
    }

    pub fn find_doctors(&self) -> Result<Navigation, PageError> {
        if !self.can_find_doctors() {
            return Err(PageError::BackendOffline);
        }

        let specialty = self
            .payload
            .analysis
            .specialist
            .as_ref()
            .and_then(Specialist::primary_specialty)
            .map(str::to_string);

        Ok(Navigation::with_payload(
            Page::FindDoctors,
            Payload::Doctors(DoctorsPayload {
                conditions: self.conditions.clone(),
                specialty,
                origin: Some(self.payload.clone()),
            }),
        ))
    }

    /// Back to the entry page with the text still filled in.
    pub fn back(&self) -> Navigation {
        Navigation::with_payload(Page::SymptomEntry, Payload::Analysis(self.payload.clone()))
    }
}
