//! Symptom entry page.

use tracing::{info, warn};

use super::{AnalysisPayload, BackendStatus, Navigation, Notice, Page, Payload};
use crate::domain::symptoms::parse_symptom_text;
use crate::domain::{AnalyzeRequest, PatientInfo};
use crate::error::PageError;
use crate::services::ApiClient;

pub const EXAMPLE_SYMPTOMS: [&str; 3] = [
    "I have a headache and feel dizzy",
    "My throat is sore and I'm coughing",
    "I feel tired all the time and have no energy",
];

#[derive(Debug)]
pub struct SymptomEntryPage {
    text: String,
    patient: PatientInfo,
    backend: BackendStatus,
    notice: Option<Notice>,
}

impl SymptomEntryPage {
    pub fn new(prefill: Option<String>) -> Self {
        Self {
            text: prefill.unwrap_or_default(),
            patient: PatientInfo::default(),
            backend: BackendStatus::Unknown,
            notice: None,
        }
    }

    pub async fn mount(&mut self, api: &ApiClient) {
        self.backend = BackendStatus::probe(api).await;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn backend(&self) -> &BackendStatus {
        &self.backend
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Fill meter for the text box, 0–100.
    pub fn progress(&self) -> u8 {
        (self.text.chars().count() * 2).min(100) as u8
    }

    pub fn can_submit(&self) -> bool {
        self.backend.is_online()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.notice = None;
    }

    /// Load one of [`EXAMPLE_SYMPTOMS`]. Returns false for an unknown index.
    pub fn use_example(&mut self, index: usize) -> bool {
        match EXAMPLE_SYMPTOMS.get(index) {
            Some(example) => {
                self.set_text(*example);
                true
            }
            None => false,
        }
    }

    pub fn set_patient_info(&mut self, patient: PatientInfo) {
        self.patient = patient;
    }

    pub(crate) fn set_backend(&mut self, status: BackendStatus) {
        self.backend = status;
    }

    /// Validate, analyze, and hand the result to the results page.
    pub async fn submit(&mut self, api: &ApiClient, session_id: &str) -> Result<Navigation, PageError> {
        self.notice = None;

        let inputs = parse_symptom_text(&self.text).map_err(|e| self.fail(e.into()))?;
        if !self.backend.is_online() {
            return Err(self.fail(PageError::BackendOffline));
        }

        let request = AnalyzeRequest::new(inputs, Some(self.patient.clone()))
            .map_err(|e| self.fail(e.into()))?
            .with_session(session_id);

        let analysis = api
            .analyze_symptoms(&request)
            .await
            .map_err(|e| self.fail(e.into()))?;

        info!(conditions = analysis.conditions.len(), "Analysis completed");
        Ok(Navigation::with_payload(
            Page::Results,
            Payload::Analysis(AnalysisPayload {
                symptoms: self.text.clone(),
                analysis,
            }),
        ))
    }

    fn fail(&mut self, err: PageError) -> PageError {
        warn!(error = %err, "Symptom submission failed");
        self.notice = Some(Notice::from(&err));
        err
    }
}
