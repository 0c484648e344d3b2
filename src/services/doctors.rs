//! Nearby-doctor search endpoint.

use serde_json::Value;
use tracing::{error, instrument};

use super::api_client::{ApiClient, Endpoint};
use crate::domain::doctors::NearbyPayload;
use crate::domain::{DoctorsQuery, DoctorsResponse};
use crate::error::ApiError;

impl ApiClient {
    /// Search for doctors around a location. Coordinate ranges are left to
    /// the server to reject.
    #[instrument(skip(self), fields(radius_km = query.radius_km, limit = query.limit))]
    pub async fn find_nearby_doctors(&self, query: &DoctorsQuery) -> Result<DoctorsResponse, ApiError> {
        let payload: NearbyPayload = self
            .post("/doctors/nearby", query, Endpoint::NearbyDoctors)
            .await?;

        DoctorsResponse::from_payload(payload, query).ok_or_else(|| {
            error!("Nearby search response has no center and no doctors to center on");
            ApiError::Unexpected {
                message: "The server did not return a map center for this search.".to_string(),
                details: Value::Null,
            }
        })
    }
}
