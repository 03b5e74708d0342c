use crate::{
    Config,
    error::{GenerationError, GeocodeError, WeatherError},
    model::{Coordinates, WeatherObservation},
};
use async_trait::async_trait;
use reqwest::Client;
use std::fmt::Debug;

pub mod nominatim;
pub mod ollama;
pub mod openmeteo;

pub use nominatim::NominatimGeocoder;
pub use ollama::OllamaGenerator;
pub use openmeteo::OpenMeteoProvider;

/// Resolves a free-text place name to a single coordinate pair.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    async fn resolve(&self, location: &str) -> Result<Coordinates, GeocodeError>;
}

/// Current conditions at a coordinate pair.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_current(&self, coords: Coordinates) -> Result<WeatherObservation, WeatherError>;
}

/// Turns a prompt into text, consuming whatever streaming protocol the backend speaks.
#[async_trait]
pub trait TextGenerator: Send + Sync + Debug {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Shared HTTP client for all upstream calls.
pub fn http_client(config: &Config) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(config.upstream.user_agent.clone())
        .connect_timeout(config.connect_timeout())
        .build()
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
