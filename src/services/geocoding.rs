//! Client for the external geocoding service.
//!
//! Results are persisted on the zone/client rows so an address is only
//! geocoded when it is created or changed.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{instrument, warn};

use crate::errors::ServiceError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Raw geocoder response, kept close to the wire shape so the proxy endpoint
/// can forward it untouched.
#[derive(Debug, Serialize, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub geometry: Geometry,
    #[serde(default)]
    pub formatted_address: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Geometry {
    pub location: Location,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

/// Geocoding service turning free-text addresses into coordinates
#[derive(Clone)]
pub struct GeocodingService {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GeocodingService {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        if api_key.is_none() {
            warn!("geocoding API key is not configured; geocoding requests will fail");
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client construction cannot fail with static options");

        Self {
            http,
            base_url,
            api_key,
        }
    }

    /// Query the geocoder for an address.
    ///
    /// `OK` and `ZERO_RESULTS` are successful responses; any other upstream
    /// status surfaces as an external API error.
    #[instrument(skip(self))]
    pub async fn get_coordinates(&self, address: &str) -> Result<GeocodeResponse, ServiceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ServiceError::InternalError("geocoding API key is not configured".to_string()))?;

        let address = address.trim();
        if address.is_empty() {
            return Err(ServiceError::BadRequest("address is required".to_string()));
        }

        let response = self
            .http
            .get(&self.base_url)
            .query(&[("address", address), ("key", api_key)])
            .send()
            .await
            .map_err(|e| ServiceError::ExternalApiError(format!("geocoding request failed: {e}")))?;

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::ExternalApiError(format!("geocoding response unreadable: {e}")))?;

        if body.status != "OK" && body.status != "ZERO_RESULTS" {
            let detail = body
                .error_message
                .unwrap_or_else(|| format!("geocoding failed with status {}", body.status));
            return Err(ServiceError::ExternalApiError(detail));
        }

        Ok(body)
    }

    /// Geocode an address to its first-candidate coordinates, `None` when the
    /// geocoder knows no match.
    pub async fn locate(&self, address: &str) -> Result<Option<Coordinates>, ServiceError> {
        let response = self.get_coordinates(address).await?;
        Ok(response.results.first().map(|r| Coordinates {
            latitude: r.geometry.location.lat,
            longitude: r.geometry.location.lng,
        }))
    }
}
