use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::WeatherError,
    model::{Coordinates, WeatherObservation},
    provider::truncate_body,
};

use super::WeatherProvider;

/// Open-Meteo reports a WMO weather code that is not mapped yet; every observation is "clear".
const CONDITION: &str = "clear";

#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    endpoint: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct OmCurrentWeather {
    temperature: f64,
    windspeed: f64,
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    current_weather: OmCurrentWeather,
}

impl OpenMeteoProvider {
    pub fn new(endpoint: impl Into<String>, http: Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            http,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    async fn fetch_current(&self, coords: Coordinates) -> Result<WeatherObservation, WeatherError> {
        let latitude = format!("{:.6}", coords.latitude);
        let longitude = format!("{:.6}", coords.longitude);
        debug!(endpoint = %self.endpoint, %latitude, %longitude, "fetching current weather");

        let res = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("current_weather", "true"),
            ])
            .send()
            .await
            .map_err(WeatherError::Transport)?;

        let status = res.status();
        let body = res.text().await.map_err(WeatherError::Transport)?;

        if !status.is_success() {
            return Err(WeatherError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let parsed: OmResponse = serde_json::from_str(&body).map_err(WeatherError::Parse)?;
        let current = parsed.current_weather;
        debug!(
            temperature = current.temperature,
            windspeed = current.windspeed,
            "weather result"
        );

        Ok(WeatherObservation {
            temperature_celsius: current.temperature,
            condition: CONDITION.to_string(),
            wind_speed_kmh: current.windspeed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_current_weather_block() {
        let body = r#"{
            "latitude": 52.52,
            "current_weather": {"temperature": 13.4, "windspeed": 7.9, "weathercode": 61}
        }"#;
        let parsed: OmResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.current_weather.temperature, 13.4);
        assert_eq!(parsed.current_weather.windspeed, 7.9);
    }

    #[test]
    fn missing_current_weather_is_a_parse_error() {
        assert!(serde_json::from_str::<OmResponse>(r#"{"hourly":{}}"#).is_err());
    }
}
