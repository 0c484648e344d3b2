//! Doctor search page.
//!
//! Tries the device position on mount and searches with it right away. When
//! the position is refused or unavailable the page stays usable: the user
//! types an address instead and a tip explains why.

use tracing::{info, warn};

use super::{BackendStatus, DoctorsPayload, Navigation, Notice, Page, Payload};
use crate::domain::doctors::{DEFAULT_LIMIT, DEFAULT_RADIUS_KM, LIMIT_CHOICES, MAX_RADIUS_KM, MIN_RADIUS_KM};
use crate::domain::{Condition, Coordinates, Doctor, DoctorsQuery, DoctorsResponse};
use crate::error::PageError;
use crate::geolocation::{GeolocationError, Geolocator};
use crate::services::ApiClient;

pub const LOCATION_DISABLED_TIP: &str =
    "Location is turned off. Type an address or area to find doctors nearby.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationPermission {
    Pending,
    Granted,
    Denied(GeolocationError),
}

#[derive(Debug)]
pub struct FindDoctorsPage {
    payload: DoctorsPayload,
    permission: LocationPermission,
    coordinates: Option<Coordinates>,
    address: String,
    radius_km: f64,
    limit: u32,
    results: Option<DoctorsResponse>,
    backend: BackendStatus,
    notice: Option<Notice>,
}

impl FindDoctorsPage {
    pub fn new(payload: DoctorsPayload) -> Self {
        Self {
            payload,
            permission: LocationPermission::Pending,
            coordinates: None,
            address: String::new(),
            radius_km: DEFAULT_RADIUS_KM,
            limit: DEFAULT_LIMIT,
            results: None,
            backend: BackendStatus::Unknown,
            notice: None,
        }
    }

    /// Health check, then one attempt at the device position. A granted
    /// position on a live backend searches immediately.
    pub async fn mount(&mut self, api: &ApiClient, geolocator: &Geolocator) {
        self.backend = BackendStatus::probe(api).await;

        if self.locate(geolocator).await.is_ok() && self.backend.is_online() {
            // Failures are already on the page as a notice.
            let _ = self.search(api).await;
        }
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.payload.conditions
    }

    pub fn specialty(&self) -> Option<&str> {
        self.payload.specialty.as_deref()
    }

    pub fn permission(&self) -> &LocationPermission {
        &self.permission
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.coordinates
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn backend(&self) -> &BackendStatus {
        &self.backend
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn doctors(&self) -> &[Doctor] {
        self.results
            .as_ref()
            .map(|r| r.doctors.as_slice())
            .unwrap_or_default()
    }

    pub fn map_center(&self) -> Option<Coordinates> {
        self.results.as_ref().map(|r| r.center)
    }

    pub fn results(&self) -> Option<&DoctorsResponse> {
        self.results.as_ref()
    }

    /// Shown while the device position is not available.
    pub fn location_tip(&self) -> Option<&'static str> {
        match self.permission {
            LocationPermission::Denied(_) => Some(LOCATION_DISABLED_TIP),
            _ => None,
        }
    }

    pub fn can_search(&self) -> bool {
        self.backend.is_online()
    }

    pub fn set_address(&mut self, address: impl Into<String>) {
        self.address = address.into();
    }

    /// Clamped to the slider range.
    pub fn set_radius_km(&mut self, radius_km: f64) {
        if radius_km.is_finite() {
            self.radius_km = radius_km.clamp(MIN_RADIUS_KM, MAX_RADIUS_KM);
        }
    }

    /// Only the offered choices are accepted.
    pub fn set_limit(&mut self, limit: u32) -> bool {
        let accepted = LIMIT_CHOICES.contains(&limit);
        if accepted {
            self.limit = limit;
        }
        accepted
    }

    pub(crate) fn set_backend(&mut self, status: BackendStatus) {
        self.backend = status;
    }

    /// "Use my location": ask for the position again and search with it.
    pub async fn use_my_location(&mut self, api: &ApiClient, geolocator: &Geolocator) -> Result<(), PageError> {
        self.locate(geolocator).await.map_err(|e| self.fail(e))?;
        self.address.clear();
        self.search(api).await
    }

    /// Search with the typed address, else the known position.
    pub async fn search(&mut self, api: &ApiClient) -> Result<(), PageError> {
        self.notice = None;

        let query = DoctorsQuery::new(self.coordinates, Some(&self.address), self.radius_km, self.limit)
            .map_err(|e| self.fail(e.into()))?;
        if !self.backend.is_online() {
            return Err(self.fail(PageError::BackendOffline));
        }

        match api.find_nearby_doctors(&query).await {
            Ok(response) => {
                info!(total = response.total, "Doctor search completed");
                self.results = Some(response);
                Ok(())
            }
            Err(e) => {
                self.results = None;
                Err(self.fail(e.into()))
            }
        }
    }

    pub fn back(&self) -> Navigation {
        match &self.payload.origin {
            Some(origin) => Navigation::with_payload(Page::Results, Payload::Analysis(origin.clone())),
            None => Navigation::to(Page::Results),
        }
    }

    async fn locate(&mut self, geolocator: &Geolocator) -> Result<Coordinates, PageError> {
        match geolocator.current_position().await {
            Ok(coords) => {
                self.permission = LocationPermission::Granted;
                self.coordinates = Some(coords);
                Ok(coords)
            }
            Err(e) => {
                // A tip, not a failure: the address search still works.
                self.permission = LocationPermission::Denied(e);
                self.coordinates = None;
                Err(e.into())
            }
        }
    }

    fn fail(&mut self, err: PageError) -> PageError {
        warn!(error = %err, "Doctor search failed");
        self.notice = Some(Notice::from(&err));
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, ValidationError};
    use crate::geolocation::{DeniedPosition, FixedPosition};
    use crate::test_support::{MockBackend, MockBackendBuilder};
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::Arc;

    fn payload() -> DoctorsPayload {
        DoctorsPayload {
            conditions: vec![],
            specialty: None,
            origin: None,
        }
    }

    fn nearby_body() -> serde_json::Value {
        json!({
            "center": {"latitude": 12.9716, "longitude": 77.5946},
            "radius_km": 10.0,
            "total": 1,
            "doctors": [{
                "name": "City General Hospital",
                "coordinates": {"latitude": 12.9766, "longitude": 77.5996},
                "distance_km": 0.79
            }]
        })
    }

    #[tokio::test]
    async fn refused_location_drops_the_earlier_fix() {
        let backend = MockBackendBuilder::online()
            .nearby(StatusCode::OK, nearby_body())
            .spawn()
            .await;
        let api = backend.client();
        let granted = Geolocator::new(Arc::new(FixedPosition::new(Coordinates {
            latitude: 12.9716,
            longitude: 77.5946,
        })));
        let denied = Geolocator::new(Arc::new(DeniedPosition));

        let mut page = FindDoctorsPage::new(payload());
        page.mount(&api, &granted).await;
        assert_eq!(backend.bodies("/doctors/nearby").len(), 1);

        let err = page.use_my_location(&api, &denied).await.unwrap_err();
        assert!(matches!(err, PageError::Location(GeolocationError::PermissionDenied)));
        assert!(page.coordinates.is_none());
        assert!(page.notice().is_some());
        assert_eq!(page.location_tip(), Some(LOCATION_DISABLED_TIP));

        let err = page.search(&api).await.unwrap_err();
        assert!(matches!(err, PageError::Validation(ValidationError::MissingLocation)));
        assert_eq!(backend.bodies("/doctors/nearby").len(), 1);
    }

    #[tokio::test]
    async fn denied_location_leaves_the_address_form_usable() {
        let backend = MockBackendBuilder::online()
            .nearby(StatusCode::OK, nearby_body())
            .spawn()
            .await;
        let api = backend.client();
        let geolocator = Geolocator::new(Arc::new(DeniedPosition));

        let mut page = FindDoctorsPage::new(payload());
        page.mount(&api, &geolocator).await;

        assert_eq!(
            page.permission(),
            &LocationPermission::Denied(GeolocationError::PermissionDenied)
        );
        assert_eq!(page.location_tip(), Some(LOCATION_DISABLED_TIP));
        assert!(page.notice().is_none());
        assert!(page.can_search());
        assert!(backend.bodies("/doctors/nearby").is_empty());

        page.set_address("Bangalore");
        page.set_radius_km(10.0);
        assert!(page.set_limit(20));
        page.search(&api).await.unwrap();

        assert_eq!(page.doctors().len(), 1);
        assert_eq!(page.map_center().unwrap().latitude, 12.9716);
        assert_eq!(
            backend.bodies("/doctors/nearby"),
            vec![json!({"address": "Bangalore", "radius_km": 10.0, "limit": 20})]
        );
    }

    #[tokio::test]
    async fn unsupported_location_without_address_asks_for_one() {
        let backend = MockBackendBuilder::online().spawn().await;
        let api = backend.client();

        let mut page = FindDoctorsPage::new(payload());
        page.mount(&api, &Geolocator::unsupported()).await;
        assert_eq!(
            page.permission(),
            &LocationPermission::Denied(GeolocationError::Unsupported)
        );

        let err = page.search(&api).await.unwrap_err();
        assert!(matches!(err, PageError::Validation(ValidationError::MissingLocation)));
        assert!(page.notice().unwrap().inline);
    }

    #[tokio::test]
    async fn failed_search_clears_previous_results() {
        let backend = MockBackendBuilder::online()
            .nearby(StatusCode::INTERNAL_SERVER_ERROR, json!({"detail": "Overpass service error"}))
            .spawn()
            .await;
        let api = backend.client();

        let mut page = FindDoctorsPage::new(payload());
        page.backend = BackendStatus::Online;
        page.results = Some(serde_json::from_value(nearby_body()).unwrap());
        page.set_address("Bangalore");

        let err = page.search(&api).await.unwrap_err();
        assert!(matches!(err, PageError::Api(ApiError::Server { .. })));
        assert!(page.doctors().is_empty());
        assert!(page.notice().unwrap().message.contains("searching for doctors"));
    }

    #[tokio::test]
    async fn offline_backend_blocks_search() {
        let backend = MockBackend::builder().spawn().await;
        let api = backend.client();

        let mut page = FindDoctorsPage::new(payload());
        page.mount(&api, &Geolocator::unsupported()).await;
        page.set_address("Chennai");

        let err = page.search(&api).await.unwrap_err();
        assert!(matches!(err, PageError::BackendOffline));
        assert!(backend.bodies("/doctors/nearby").is_empty());
    }

    #[test]
    fn radius_and_limit_stay_in_range() {
        let mut page = FindDoctorsPage::new(payload());
        assert_eq!(page.radius_km(), 5.0);
        assert_eq!(page.limit(), 20);

        page.set_radius_km(120.0);
        assert_eq!(page.radius_km(), 50.0);
        page.set_radius_km(0.2);
        assert_eq!(page.radius_km(), 1.0);

        assert!(!page.set_limit(30));
        assert_eq!(page.limit(), 20);
        assert!(page.set_limit(100));
    }

    #[test]
    fn back_without_origin_goes_to_results() {
        let page = FindDoctorsPage::new(payload());
        assert_eq!(page.back(), Navigation::to(Page::Results));
    }
}
