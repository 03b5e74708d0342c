//! Error taxonomy of the suggestion pipeline.
//!
//! Every stage has its own error type; [`SuggestError`] unifies them and knows the
//! single plain-text message shown to HTTP callers for each class.

use thiserror::Error;

/// Client-side problems with the incoming request.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("request body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("failed to reach geocoder")]
    Transport(#[source] reqwest::Error),

    #[error("geocoder responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse geocoder response")]
    Parse(#[source] serde_json::Error),

    #[error("no results for location '{location}'")]
    NoResults { location: String },

    #[error("geocoding did not finish before the request deadline")]
    TimedOut,
}

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("failed to reach weather provider")]
    Transport(#[source] reqwest::Error),

    #[error("weather provider responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse weather response")]
    Parse(#[source] serde_json::Error),

    #[error("weather lookup did not finish before the request deadline")]
    TimedOut,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("failed to reach generation service")]
    Transport(#[source] reqwest::Error),

    #[error("generation service responded with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The stream broke after some text had been gathered.
    #[error("generation stream interrupted after {} bytes", .partial.len())]
    Interrupted {
        partial: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("generation did not finish before the request deadline")]
    TimedOut,
}

impl GenerationError {
    /// Text gathered before the failure, if any.
    pub fn partial(&self) -> Option<&str> {
        match self {
            GenerationError::Interrupted { partial, .. } => Some(partial),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SuggestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    #[error(transparent)]
    Weather(#[from] WeatherError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl SuggestError {
    /// `true` for problems the caller can fix (400 class).
    pub fn is_client_error(&self) -> bool {
        matches!(self, SuggestError::Validation(_))
    }

    /// Fixed message exposed to callers. Sub-causes are never distinguished.
    pub fn public_message(&self) -> &'static str {
        match self {
            SuggestError::Validation(ValidationError::InvalidJson(_)) => "Invalid JSON body",
            SuggestError::Validation(ValidationError::MissingFields(_)) => {
                "Missing required fields"
            }
            SuggestError::Geocode(_) => "Failed to geocode location",
            SuggestError::Weather(_) => "Failed to fetch weather data",
            SuggestError::Generation(_) => "Failed to get AI suggestion",
        }
    }
}
