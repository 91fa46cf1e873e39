use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::models::Coordinates;

/// Errors that can occur when geocoding a postal code
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid access token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Resolves a postal code to coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the postal code is unknown
    async fn locate(&self, postal_code: &str) -> Result<Option<Coordinates>, GeocodeError>;
}

/// Forward-geocoding client for a Mapbox-compatible places API
///
/// Looks up `{endpoint}/geocoding/v5/mapbox.places/{postal_code}.json` and
/// reads the `[longitude, latitude]` center of the first feature.
pub struct HttpGeocoder {
    endpoint: String,
    access_token: String,
    country: String,
    client: Client,
}

impl HttpGeocoder {
    /// Create a new geocoding client
    pub fn new(
        endpoint: String,
        access_token: String,
        country: String,
        timeout: Duration,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint,
            access_token,
            country,
            client,
        })
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn locate(&self, postal_code: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let url = format!(
            "{}/geocoding/v5/mapbox.places/{}.json?types=postcode&limit=1&country={}&access_token={}",
            self.endpoint.trim_end_matches('/'),
            urlencoding::encode(postal_code.trim()),
            urlencoding::encode(&self.country),
            urlencoding::encode(&self.access_token),
        );

        tracing::debug!("Geocoding postal code: {}", postal_code);

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(GeocodeError::Unauthorized);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(GeocodeError::ApiError(format!(
                "Failed to geocode {}: {}",
                postal_code, status
            )));
        }

        let json: Value = response.json().await?;
        parse_center(&json)
    }
}

/// Extract the first feature's center from a places response
fn parse_center(json: &Value) -> Result<Option<Coordinates>, GeocodeError> {
    let features = json
        .get("features")
        .and_then(|f| f.as_array())
        .ok_or_else(|| GeocodeError::InvalidResponse("Missing features array".into()))?;

    let feature = match features.first() {
        Some(feature) => feature,
        None => return Ok(None),
    };

    let center = feature
        .get("center")
        .and_then(|c| c.as_array())
        .filter(|c| c.len() == 2)
        .ok_or_else(|| GeocodeError::InvalidResponse("Feature has no center".into()))?;

    match (center[0].as_f64(), center[1].as_f64()) {
        (Some(longitude), Some(latitude)) => Ok(Some(Coordinates::new(latitude, longitude))),
        _ => Err(GeocodeError::InvalidResponse("Non-numeric center".into())),
    }
}
