use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{error::GeocodeError, model::Coordinates, provider::truncate_body};

use super::Geocoder;

/// OpenStreetMap Nominatim search client.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    endpoint: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct NmPlace {
    lat: String,
    lon: String,
}

impl NominatimGeocoder {
    pub fn new(endpoint: impl Into<String>, http: Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            http,
        }
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn resolve(&self, location: &str) -> Result<Coordinates, GeocodeError> {
        debug!(endpoint = %self.endpoint, location, "geocoding");

        let res = self
            .http
            .get(&self.endpoint)
            .query(&[("q", location), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(GeocodeError::Transport)?;

        let status = res.status();
        let body = res.text().await.map_err(GeocodeError::Transport)?;

        if !status.is_success() {
            return Err(GeocodeError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let places: Vec<NmPlace> = serde_json::from_str(&body).map_err(GeocodeError::Parse)?;

        let place = places.first().ok_or_else(|| GeocodeError::NoResults {
            location: location.to_string(),
        })?;

        let coords = Coordinates {
            latitude: parse_degrees("lat", &place.lat),
            longitude: parse_degrees("lon", &place.lon),
        };
        debug!(lat = coords.latitude, lon = coords.longitude, "geocoder result");

        Ok(coords)
    }
}

/// Unparseable values become 0.0 rather than failing the lookup.
fn parse_degrees(field: &str, raw: &str) -> f64 {
    raw.trim().parse().unwrap_or_else(|_| {
        warn!(field, raw, "geocoder returned a non-numeric coordinate, using 0.0");
        0.0
    })
}
