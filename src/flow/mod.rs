//! Three-page symptom checker flow.
//!
//! `symptom-entry → results → find-doctors`. Each page owns its state and
//! changes it only through its own transition methods; moving between pages
//! hands the destination a [`Payload`] that is consumed on arrival. Arriving
//! without the payload a page needs sends the user back a step.

pub mod find_doctors;
pub mod results;
pub mod symptom_entry;

use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{AnalysisResult, Condition};
use crate::error::PageError;
use crate::geolocation::Geolocator;
use crate::services::ApiClient;

pub use find_doctors::{FindDoctorsPage, LocationPermission};
pub use results::ResultsPage;
pub use symptom_entry::SymptomEntryPage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    SymptomEntry,
    Results,
    FindDoctors,
}

impl Page {
    pub fn path(self) -> &'static str {
        match self {
            Self::SymptomEntry => "/symptom-checker",
            Self::Results => "/results",
            Self::FindDoctors => "/find-doctors",
        }
    }
}

/// What the results page needs: the text the user typed and its analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisPayload {
    pub symptoms: String,
    pub analysis: AnalysisResult,
}

/// What the doctor search needs. `origin` lets the page go back to the
/// results it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct DoctorsPayload {
    pub conditions: Vec<Condition>,
    pub specialty: Option<String>,
    pub origin: Option<AnalysisPayload>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Analysis(AnalysisPayload),
    Doctors(DoctorsPayload),
}

/// A requested move to another page.
#[derive(Debug, Clone, PartialEq)]
pub struct Navigation {
    pub to: Page,
    pub payload: Option<Payload>,
}

impl Navigation {
    pub fn to(page: Page) -> Self {
        Self {
            to: page,
            payload: None,
        }
    }

    pub fn with_payload(page: Page, payload: Payload) -> Self {
        Self {
            to: page,
            payload: Some(payload),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendStatus {
    Unknown,
    Online,
    Offline(String),
}

impl BackendStatus {
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }

    /// Best-effort liveness probe; never fails.
    pub async fn probe(api: &ApiClient) -> Self {
        match api.health_check().await {
            Ok(_) => Self::Online,
            Err(e) => {
                warn!(error = %e, "Backend health check failed");
                Self::Offline(e.to_string())
            }
        }
    }
}

/// A message a page shows after a failed action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    /// Inline next to the form rather than as a banner.
    pub inline: bool,
    /// Repeating the same action may succeed.
    pub retryable: bool,
}

impl From<&PageError> for Notice {
    fn from(err: &PageError) -> Self {
        Self {
            message: err.to_string(),
            inline: err.is_inline(),
            retryable: err.is_retryable(),
        }
    }
}

#[derive(Debug)]
pub enum ActivePage {
    SymptomEntry(SymptomEntryPage),
    Results(ResultsPage),
    FindDoctors(FindDoctorsPage),
}

impl ActivePage {
    pub fn page(&self) -> Page {
        match self {
            Self::SymptomEntry(_) => Page::SymptomEntry,
            Self::Results(_) => Page::Results,
            Self::FindDoctors(_) => Page::FindDoctors,
        }
    }
}

/// Decide where a navigation really lands. Pages reached without their
/// payload redirect one step back until a page without requirements.
pub fn resolve(nav: Navigation) -> (Page, Option<Payload>) {
    match (nav.to, nav.payload) {
        (Page::Results, Some(Payload::Analysis(payload))) => {
            (Page::Results, Some(Payload::Analysis(payload)))
        }
        (Page::Results, _) => {
            debug!("Results opened without an analysis, redirecting");
            resolve(Navigation::to(Page::SymptomEntry))
        }
        (Page::FindDoctors, Some(Payload::Doctors(payload))) => {
            (Page::FindDoctors, Some(Payload::Doctors(payload)))
        }
        (Page::FindDoctors, _) => {
            debug!("Doctor search opened without conditions, redirecting");
            resolve(Navigation::to(Page::Results))
        }
        (Page::SymptomEntry, payload) => (Page::SymptomEntry, payload),
    }
}

/// Owns the active page and the collaborators its actions need.
pub struct FlowController {
    api: ApiClient,
    geolocator: Arc<Geolocator>,
    session_id: String,
    active: ActivePage,
}

impl FlowController {
    pub fn new(api: ApiClient, geolocator: Arc<Geolocator>) -> Self {
        Self {
            api,
            geolocator,
            session_id: Uuid::new_v4().to_string(),
            active: ActivePage::SymptomEntry(SymptomEntryPage::new(None)),
        }
    }

    /// Mount the first page.
    pub async fn start(&mut self) -> Page {
        self.navigate(Navigation::to(Page::SymptomEntry)).await
    }

    pub fn page(&self) -> Page {
        self.active.page()
    }

    pub fn active(&self) -> &ActivePage {
        &self.active
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn symptom_entry_mut(&mut self) -> Option<&mut SymptomEntryPage> {
        match &mut self.active {
            ActivePage::SymptomEntry(page) => Some(page),
            _ => None,
        }
    }

    pub fn find_doctors_mut(&mut self) -> Option<&mut FindDoctorsPage> {
        match &mut self.active {
            ActivePage::FindDoctors(page) => Some(page),
            _ => None,
        }
    }

    /// Enter a page, applying the payload guards, and run its mount hook.
    pub async fn navigate(&mut self, nav: Navigation) -> Page {
        let requested = nav.to;
        let (page, payload) = resolve(nav);
        if page != requested {
            info!(from = requested.path(), to = page.path(), "Redirected");
        }

        self.active = match (page, payload) {
            (Page::Results, Some(Payload::Analysis(payload))) => {
                ActivePage::Results(ResultsPage::new(payload))
            }
            (Page::FindDoctors, Some(Payload::Doctors(payload))) => {
                ActivePage::FindDoctors(FindDoctorsPage::new(payload))
            }
            (_, Some(Payload::Analysis(payload))) => {
                ActivePage::SymptomEntry(SymptomEntryPage::new(Some(payload.symptoms)))
            }
            _ => ActivePage::SymptomEntry(SymptomEntryPage::new(None)),
        };

        match &mut self.active {
            ActivePage::SymptomEntry(entry) => entry.mount(&self.api).await,
            ActivePage::Results(results) => results.mount(&self.api).await,
            ActivePage::FindDoctors(doctors) => doctors.mount(&self.api, &self.geolocator).await,
        }

        debug!(page = page.path(), "Page mounted");
        page
    }

    /// Re-run the active page's backend check.
    pub async fn retry_health_check(&mut self) {
        let status = BackendStatus::probe(&self.api).await;
        match &mut self.active {
            ActivePage::SymptomEntry(page) => page.set_backend(status),
            ActivePage::Results(page) => page.set_backend(status),
            ActivePage::FindDoctors(page) => page.set_backend(status),
        }
    }

    /// Primary action of the symptom entry page: analyze and move on.
    pub async fn submit_symptoms(&mut self) -> Result<Page, PageError> {
        let ActivePage::SymptomEntry(page) = &mut self.active else {
            return Ok(self.page());
        };
        let nav = page.submit(&self.api, &self.session_id).await?;
        Ok(self.navigate(nav).await)
    }

    /// Primary action of the results page.
    pub async fn open_find_doctors(&mut self) -> Result<Page, PageError> {
        let ActivePage::Results(page) = &mut self.active else {
            return Ok(self.page());
        };
        let nav = page.find_doctors()?;
        Ok(self.navigate(nav).await)
    }

    /// Primary action of the doctor search page.
    pub async fn search_doctors(&mut self) -> Result<(), PageError> {
        match &mut self.active {
            ActivePage::FindDoctors(page) => page.search(&self.api).await,
            _ => Ok(()),
        }
    }

    pub async fn use_my_location(&mut self) -> Result<(), PageError> {
        match &mut self.active {
            ActivePage::FindDoctors(page) => page.use_my_location(&self.api, &self.geolocator).await,
            _ => Ok(()),
        }
    }

    pub async fn back(&mut self) -> Page {
        let nav = match &self.active {
            ActivePage::SymptomEntry(_) => return Page::SymptomEntry,
            ActivePage::Results(page) => page.back(),
            ActivePage::FindDoctors(page) => page.back(),
        };
        self.navigate(nav).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geolocation::{DeniedPosition, FixedPosition};
    use crate::domain::Coordinates;
    use crate::test_support::{MockBackend, MockBackendBuilder};
    use axum::http::StatusCode;
    use serde_json::json;

    fn analysis_payload() -> AnalysisPayload {
        AnalysisPayload {
            symptoms: "headache, fever".to_string(),
            analysis: AnalysisResult::default(),
        }
    }

    #[test]
    fn results_without_analysis_redirects_to_entry() {
        assert_eq!(resolve(Navigation::to(Page::Results)).0, Page::SymptomEntry);

        let wrong = Navigation::with_payload(
            Page::Results,
            Payload::Doctors(DoctorsPayload {
                conditions: vec![],
                specialty: None,
                origin: None,
            }),
        );
        assert_eq!(resolve(wrong).0, Page::SymptomEntry);
    }

    #[test]
    fn find_doctors_without_conditions_redirects_back_through_results() {
        assert_eq!(resolve(Navigation::to(Page::FindDoctors)).0, Page::SymptomEntry);
    }

    #[test]
    fn payloads_reach_their_pages() {
        let (page, payload) = resolve(Navigation::with_payload(
            Page::Results,
            Payload::Analysis(analysis_payload()),
        ));
        assert_eq!(page, Page::Results);
        assert_eq!(payload, Some(Payload::Analysis(analysis_payload())));

        let (page, _) = resolve(Navigation::with_payload(
            Page::FindDoctors,
            Payload::Doctors(DoctorsPayload {
                conditions: vec![],
                specialty: None,
                origin: None,
            }),
        ));
        assert_eq!(page, Page::FindDoctors);
    }

    #[tokio::test]
    async fn full_flow_from_symptoms_to_doctors() {
        let backend = MockBackendBuilder::online()
            .analyze(
                StatusCode::OK,
                json!({"status": "success", "data": {"analysis": {
                    "riskLevel": "high",
                    "confidence": 80,
                    "possibleConditions": [{"name": "Migraine"}],
                    "specialistRecommendation": {"specialty": "Neurology", "urgency": "urgent"}
                }}}),
            )
            .nearby(
                StatusCode::OK,
                json!({
                    "center": {"latitude": 12.97, "longitude": 77.59},
                    "radius_km": 5.0,
                    "total": 1,
                    "doctors": [{"name": "Neuro Clinic", "coordinates": {"latitude": 12.98, "longitude": 77.6}, "distance_km": 1.25}]
                }),
            )
            .emergency_signs(StatusCode::OK, json!({"data": {"signs": ["Loss of consciousness"]}}))
            .spawn()
            .await;

        let home = Coordinates {
            latitude: 12.97,
            longitude: 77.59,
        };
        let geolocator = Arc::new(Geolocator::new(Arc::new(FixedPosition::new(home))));
        let mut flow = FlowController::new(backend.client(), geolocator);

        assert_eq!(flow.start().await, Page::SymptomEntry);
        flow.symptom_entry_mut()
            .unwrap()
            .set_text("throbbing headache, light sensitivity");
        assert_eq!(flow.submit_symptoms().await.unwrap(), Page::Results);

        let sent = &backend.bodies("/symptoms/analyze")[0];
        assert_eq!(sent["sessionId"], flow.session_id());
        assert_eq!(sent["symptoms"][1]["name"], "light sensitivity");

        let ActivePage::Results(results) = flow.active() else {
            panic!("expected results page");
        };
        assert_eq!(results.emergency_signs(), ["Loss of consciousness"]);

        assert_eq!(flow.open_find_doctors().await.unwrap(), Page::FindDoctors);
        let ActivePage::FindDoctors(doctors) = flow.active() else {
            panic!("expected doctor search");
        };
        // Position granted on mount triggers the search automatically.
        assert_eq!(doctors.permission(), &LocationPermission::Granted);
        assert_eq!(doctors.doctors()[0].name, "Neuro Clinic");
        assert_eq!(doctors.conditions()[0].name, "Migraine");

        assert_eq!(flow.back().await, Page::Results);
        assert_eq!(flow.back().await, Page::SymptomEntry);
        let ActivePage::SymptomEntry(entry) = flow.active() else {
            panic!("expected symptom entry");
        };
        assert_eq!(entry.text(), "throbbing headache, light sensitivity");
    }

    #[tokio::test]
    async fn offline_backend_blocks_submit_until_retry() {
        let backend = MockBackend::builder()
            .health(StatusCode::SERVICE_UNAVAILABLE, json!({"detail": "down"}))
            .spawn()
            .await;
        let mut flow = FlowController::new(
            backend.client(),
            Arc::new(Geolocator::new(Arc::new(DeniedPosition))),
        );
        flow.start().await;

        let entry = flow.symptom_entry_mut().unwrap();
        assert!(!entry.can_submit());
        entry.set_text("sore throat and a dry cough");

        let err = flow.submit_symptoms().await.unwrap_err();
        assert!(matches!(err, PageError::BackendOffline));
        assert_eq!(flow.page(), Page::SymptomEntry);
        assert!(backend.bodies("/symptoms/analyze").is_empty());

        // Retrying the check stays possible while offline.
        flow.retry_health_check().await;
        assert_eq!(backend.bodies("/health").len(), 2);
    }
}
