//! Single-shot device location lookup.
//!
//! A [`Geolocator`] asks its [`PositionSource`] once per call, bounded by a
//! timeout, and reuses a recent fix when one is young enough. Failures are a
//! closed set: denied, unavailable, timed out, or no location support at all.

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::domain::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("Location access denied by user.")]
    PermissionDenied,

    #[error("Location information is unavailable.")]
    PositionUnavailable,

    #[error("Location request timed out.")]
    Timeout,

    #[error("Geolocation is not supported on this device.")]
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeolocationOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix that may be returned instead of a fresh query.
    pub maximum_age: Duration,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(5 * 60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub coordinates: Coordinates,
    pub accuracy_m: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

/// Something that can report where the device is.
pub trait PositionSource: Send + Sync {
    fn current_position<'a>(
        &'a self,
        options: &'a GeolocationOptions,
    ) -> BoxFuture<'a, Result<Position, GeolocationError>>;
}

/// A location configured up front (e.g. `HEALTH_BEACON_DEVICE_LOCATION`).
pub struct FixedPosition {
    coordinates: Coordinates,
}

impl FixedPosition {
    pub fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }
}

impl PositionSource for FixedPosition {
    fn current_position<'a>(
        &'a self,
        _options: &'a GeolocationOptions,
    ) -> BoxFuture<'a, Result<Position, GeolocationError>> {
        Box::pin(async move {
            Ok(Position {
                coordinates: self.coordinates,
                accuracy_m: None,
                timestamp: Utc::now(),
            })
        })
    }
}

/// The user declined to share their location.
pub struct DeniedPosition;

impl PositionSource for DeniedPosition {
    fn current_position<'a>(
        &'a self,
        _options: &'a GeolocationOptions,
    ) -> BoxFuture<'a, Result<Position, GeolocationError>> {
        Box::pin(async { Err(GeolocationError::PermissionDenied) })
    }
}

pub struct Geolocator {
    source: Option<Arc<dyn PositionSource>>,
    options: GeolocationOptions,
    last_fix: Mutex<Option<Position>>,
}

impl Geolocator {
    pub fn new(source: Arc<dyn PositionSource>) -> Self {
        Self {
            source: Some(source),
            options: GeolocationOptions::default(),
            last_fix: Mutex::new(None),
        }
    }

    /// A device without any location capability.
    pub fn unsupported() -> Self {
        Self {
            source: None,
            options: GeolocationOptions::default(),
            last_fix: Mutex::new(None),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        if settings.location_disabled {
            Self::new(Arc::new(DeniedPosition))
        } else if let Some(coords) = settings.device_location {
            Self::new(Arc::new(FixedPosition::new(coords)))
        } else {
            Self::unsupported()
        }
    }

    pub fn with_options(mut self, options: GeolocationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn is_supported(&self) -> bool {
        self.source.is_some()
    }

    /// Ask for the current position once.
    pub async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        let Some(source) = &self.source else {
            return Err(GeolocationError::Unsupported);
        };

        if let Some(fix) = self.cached_fix() {
            debug!("Using cached position");
            return Ok(fix.coordinates);
        }

        let position = match tokio::time::timeout(
            self.options.timeout,
            source.current_position(&self.options),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(GeolocationError::Timeout),
        }
        .map_err(|e| {
            warn!(error = %e, "Position lookup failed");
            e
        })?;

        *self.last_fix.lock() = Some(position);
        Ok(position.coordinates)
    }

    fn cached_fix(&self) -> Option<Position> {
        let fix = (*self.last_fix.lock())?;
        let age = Utc::now().signed_duration_since(fix.timestamp).to_std().ok()?;
        (age <= self.options.maximum_age).then_some(fix)
    }
}
