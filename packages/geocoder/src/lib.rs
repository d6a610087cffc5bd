//! Reverse geocoding client
//!
//! Resolves a latitude/longitude pair to a human readable place name using a
//! Nominatim-compatible `/reverse` endpoint.

// Enforce strict error handling in application code, but allow expect/unwrap in tests
#![cfg_attr(not(test), deny(clippy::expect_used, clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_AGENT: &str = "nutrisync-ta/1.0";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("geocoding service returned status {0}")]
    Status(u16),
}

#[derive(Clone, Debug)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl GeocoderConfig {
    pub fn new(base_url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            user_agent: user_agent.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_USER_AGENT)
    }
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ReverseGeocoder {
    client: reqwest::Client,
    reverse_url: String,
}

impl ReverseGeocoder {
    /// # Errors
    /// Fails if the HTTP client cannot be built, e.g. the user agent is not a
    /// valid header value.
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            reverse_url: format!("{}/reverse", config.base_url.trim_end_matches('/')),
        })
    }

    /// Look up the display name for a coordinate pair.
    ///
    /// `Ok(None)` means the service answered but had no usable name.
    pub async fn place_name(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<String>, GeocodeError> {
        let lat = format!("{latitude:.6}");
        let lon = format!("{longitude:.6}");

        let response = self
            .client
            .get(&self.reverse_url)
            .query(&[("format", "jsonv2"), ("lat", lat.as_str()), ("lon", lon.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(GeocodeError::Status(status.as_u16()));
        }

        let body: ReverseResponse = response.json().await?;
        let name = body
            .display_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        debug!("Reverse geocoded {},{} -> {:?}", lat, lon, name);

        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = GeocoderConfig::default();
        assert_eq!(config.base_url, "https://nominatim.openstreetmap.org");
        assert_eq!(config.user_agent, "nutrisync-ta/1.0");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_reverse_url_strips_trailing_slash() {
        let config = GeocoderConfig::new("http://localhost:8088/", "test-agent");
        let geocoder = ReverseGeocoder::new(&config).unwrap();
        assert_eq!(geocoder.reverse_url, "http://localhost:8088/reverse");
    }

    #[test]
    fn test_invalid_user_agent_is_rejected() {
        let config = GeocoderConfig::new(DEFAULT_BASE_URL, "bad\nagent");
        assert!(ReverseGeocoder::new(&config).is_err());
    }

    #[test]
    fn test_status_error_message() {
        let error = GeocodeError::Status(503);
        assert_eq!(error.to_string(), "geocoding service returned status 503");
    }
}
