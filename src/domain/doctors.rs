//! Nearby-doctor search query and results.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const DEFAULT_RADIUS_KM: f64 = 5.0;
pub const MIN_RADIUS_KM: f64 = 1.0;
pub const MAX_RADIUS_KM: f64 = 50.0;
pub const DEFAULT_LIMIT: u32 = 20;
/// Result limits offered by the search form.
pub const LIMIT_CHOICES: [u32; 5] = [10, 20, 25, 50, 100];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Where to search around. Exactly one form is ever sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SearchLocation {
    /// Sent flat as `latitude` / `longitude`.
    Coordinates { latitude: f64, longitude: f64 },
    Address { address: String },
}

impl SearchLocation {
    pub fn coordinates(&self) -> Option<Coordinates> {
        match self {
            Self::Coordinates {
                latitude,
                longitude,
            } => Some(Coordinates {
                latitude: *latitude,
                longitude: *longitude,
            }),
            Self::Address { .. } => None,
        }
    }
}

impl From<Coordinates> for SearchLocation {
    fn from(coords: Coordinates) -> Self {
        Self::Coordinates {
            latitude: coords.latitude,
            longitude: coords.longitude,
        }
    }
}

/// Body of `POST /doctors/nearby`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoctorsQuery {
    #[serde(flatten)]
    pub location: SearchLocation,
    pub radius_km: f64,
    pub limit: u32,
}

impl DoctorsQuery {
    /// Build a query from whatever the user provided. A typed address wins
    /// over known coordinates; neither is an input error.
    pub fn new(
        coordinates: Option<Coordinates>,
        address: Option<&str>,
        radius_km: f64,
        limit: u32,
    ) -> Result<Self, ValidationError> {
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(ValidationError::InvalidRadius);
        }
        if limit == 0 {
            return Err(ValidationError::InvalidLimit);
        }

        let location = match (address.map(str::trim).filter(|a| !a.is_empty()), coordinates) {
            (Some(address), _) => SearchLocation::Address {
                address: address.to_string(),
            },
            (None, Some(coords)) => coords.into(),
            (None, None) => return Err(ValidationError::MissingLocation),
        };

        Ok(Self {
            location,
            radius_km,
            limit,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub name: String,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub coordinates: Coordinates,
    #[serde(default)]
    pub distance_km: Option<f64>,
}

impl Doctor {
    pub fn distance_label(&self) -> Option<String> {
        self.distance_km.map(|d| format!("{d:.1} km"))
    }
}

/// Raw response of the nearby search, before a map center is settled.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct NearbyPayload {
    #[serde(default)]
    pub center: Option<Coordinates>,
    #[serde(default)]
    pub radius_km: Option<f64>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub doctors: Vec<Doctor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorsResponse {
    pub center: Coordinates,
    pub radius_km: f64,
    pub total: u64,
    pub doctors: Vec<Doctor>,
}

impl DoctorsResponse {
    /// Settle the map center: the server's, then the query's coordinates,
    /// then the first doctor. `None` when there is nothing to center on.
    pub(crate) fn from_payload(payload: NearbyPayload, query: &DoctorsQuery) -> Option<Self> {
        let center = payload
            .center
            .or_else(|| query.location.coordinates())
            .or_else(|| payload.doctors.first().map(|d| d.coordinates))?;

        Some(Self {
            center,
            radius_km: payload.radius_km.unwrap_or(query.radius_km),
            total: payload.total.unwrap_or(payload.doctors.len() as u64),
            doctors: payload.doctors,
        })
    }
}
