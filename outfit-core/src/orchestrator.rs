//! # Suggestion Orchestrator
//!
//! Runs one request through the pipeline:
//! 1. Validate the input
//! 2. Geocode the location
//! 3. Fetch current weather for the coordinates
//! 4. Build the prompt
//! 5. Generate the suggestion
//!
//! Stages run strictly in order and the first failure ends the request. All three
//! outbound calls share one deadline, fixed when the request starts.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, error, info, instrument};

use crate::{
    Config,
    error::{GenerationError, GeocodeError, SuggestError, ValidationError, WeatherError},
    model::{Suggestion, SuggestionRequest, SuggestionResponse, SuggestionTrace},
    prompt::build_prompt,
    provider::{
        Geocoder, NominatimGeocoder, OllamaGenerator, OpenMeteoProvider, TextGenerator,
        WeatherProvider, http_client,
    },
};

#[derive(Debug, Clone)]
pub struct SuggestionOrchestrator {
    geocoder: Arc<dyn Geocoder>,
    weather: Arc<dyn WeatherProvider>,
    generator: Arc<dyn TextGenerator>,
    request_timeout: Duration,
}

impl SuggestionOrchestrator {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        weather: Arc<dyn WeatherProvider>,
        generator: Arc<dyn TextGenerator>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            geocoder,
            weather,
            generator,
            request_timeout,
        }
    }

    /// Wire the Nominatim, Open-Meteo and Ollama clients from config, sharing one HTTP client.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = http_client(config)?;
        let upstream = &config.upstream;

        Ok(Self::new(
            Arc::new(NominatimGeocoder::new(&upstream.geocoder_url, http.clone())),
            Arc::new(OpenMeteoProvider::new(&upstream.weather_url, http.clone())),
            Arc::new(OllamaGenerator::new(&upstream.generation_url, http)),
            config.request_timeout(),
        ))
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Decode a raw request body and run the pipeline on it.
    pub async fn handle_json(&self, body: &[u8]) -> Result<Suggestion, SuggestError> {
        let request: SuggestionRequest = serde_json::from_slice(body).map_err(|err| {
            error!(%err, "request body is not valid JSON");
            ValidationError::InvalidJson(err)
        })?;

        self.handle(&request).await
    }

    #[instrument(skip_all, fields(location = %request.location))]
    pub async fn handle(&self, request: &SuggestionRequest) -> Result<Suggestion, SuggestError> {
        let started_at = Utc::now();
        let start = Instant::now();
        let deadline = start + self.request_timeout;
        debug!(?request, "handling suggestion request");

        let missing = request.missing_fields();
        if !missing.is_empty() {
            info!(?missing, "rejecting request with missing fields");
            return Err(ValidationError::MissingFields(missing).into());
        }

        let coordinates = timeout_at(deadline, self.geocoder.resolve(&request.location))
            .await
            .unwrap_or(Err(GeocodeError::TimedOut))
            .inspect_err(|err| error!(error = ?err, "geocoding failed"))?;
        info!(
            "geocoded {} to lat={:.6} lon={:.6}",
            request.location, coordinates.latitude, coordinates.longitude
        );

        let weather = timeout_at(deadline, self.weather.fetch_current(coordinates))
            .await
            .unwrap_or(Err(WeatherError::TimedOut))
            .inspect_err(|err| error!(error = ?err, "weather lookup failed"))?;
        info!(
            "weather temp={:.1} condition={} wind={:.1}",
            weather.temperature_celsius, weather.condition, weather.wind_speed_kmh
        );

        let prompt = build_prompt(request, &weather);
        debug!(%prompt, "prompt built");

        let suggestion = timeout_at(deadline, self.generator.generate(&prompt))
            .await
            .unwrap_or(Err(GenerationError::TimedOut))
            .inspect_err(|err| {
                // Partial text is never handed back to the caller.
                error!(
                    error = ?err,
                    partial_len = err.partial().map(str::len),
                    "generation failed"
                )
            })?;
        info!(chars = suggestion.chars().count(), "suggestion generated");

        let elapsed_ms = start.elapsed().as_millis();

        Ok(Suggestion {
            response: SuggestionResponse { suggestion },
            trace: SuggestionTrace {
                started_at,
                coordinates,
                weather,
                prompt,
                elapsed_ms,
            },
        })
    }
}
