use anyhow::{bail, Context, Result};
use std::env;

use crate::domain::Coordinates;

/// Base URL baked in at build time, if the build environment provides one.
const DEFAULT_API_BASE_URL: &str = match option_env!("HEALTH_BEACON_API_URL") {
    Some(url) => url,
    None => "http://localhost:8002/api",
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }

    pub fn is_prod(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,

    // Backend API
    pub api_base_url: String,
    pub api_timeout_seconds: u64,
    pub health_timeout_seconds: u64,

    // Geolocation
    pub device_location: Option<Coordinates>,
    pub location_disabled: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let env = Environment::parse(&env::var("ENV").unwrap_or_else(|_| "dev".to_string()));

        // Backend API
        let api_base_url = env::var("HEALTH_BEACON_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        validate_base_url(&api_base_url)?;
        let api_timeout_seconds = env::var("HEALTH_BEACON_API_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30); // analysis calls wait on an LLM
        let health_timeout_seconds = env::var("HEALTH_BEACON_HEALTH_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        // Geolocation
        let device_location = match env::var("HEALTH_BEACON_DEVICE_LOCATION") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                parse_coordinates(&raw).context("HEALTH_BEACON_DEVICE_LOCATION must be \"lat,lon\"")?,
            ),
            _ => None,
        };
        let location_disabled = env::var("HEALTH_BEACON_LOCATION_DISABLED")
            .map(|s| matches!(s.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Settings {
            env,
            api_base_url,
            api_timeout_seconds,
            health_timeout_seconds,
            device_location,
            location_disabled,
        })
    }

    /// Override the backend URL (e.g. from a command-line flag).
    pub fn with_api_base_url(mut self, url: &str) -> Result<Self> {
        validate_base_url(url)?;
        self.api_base_url = url.to_string();
        Ok(self)
    }
}

pub fn validate_base_url(url: &str) -> Result<()> {
    let parsed = url::Url::parse(url).with_context(|| format!("Invalid API base URL: {url}"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("API base URL must use http or https: {url}");
    }
    Ok(())
}

/// Parse a `"lat,lon"` pair.
pub fn parse_coordinates(raw: &str) -> Result<Coordinates> {
    let (lat, lon) = raw
        .split_once(',')
        .context("expected a comma between latitude and longitude")?;
    let latitude: f64 = lat.trim().parse().context("latitude is not a number")?;
    let longitude: f64 = lon.trim().parse().context("longitude is not a number")?;
    Ok(Coordinates {
        latitude,
        longitude,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parsing_defaults_to_dev() {
        assert_eq!(Environment::parse("production"), Environment::Prod);
        assert_eq!(Environment::parse("STAGING"), Environment::Staging);
        assert_eq!(Environment::parse("anything"), Environment::Dev);
    }

    #[test]
    fn parses_device_location() {
        let coords = parse_coordinates(" 12.97, 77.59 ").unwrap();
        assert_eq!(coords.latitude, 12.97);
        assert_eq!(coords.longitude, 77.59);

        assert!(parse_coordinates("12.97").is_err());
        assert!(parse_coordinates("north,77.59").is_err());
    }

    #[test]
    fn rejects_non_http_base_urls() {
        assert!(validate_base_url("http://localhost:8002/api").is_ok());
        assert!(validate_base_url("ftp://example.com").is_err());
        assert!(validate_base_url("not a url").is_err());
    }
}
