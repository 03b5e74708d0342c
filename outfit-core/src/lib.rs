//! Core library for the outfit advisor.
//!
//! This crate defines:
//! - Configuration of the inbound server and the three upstream services
//! - Clients for geocoding, current weather and streaming text generation
//! - The prompt template and the orchestrator that chains everything together
//!
//! It is used by `outfit-server`, but the orchestrator can be driven from any async context.

pub mod config;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod prompt;
pub mod provider;

pub use config::{Config, ServerConfig, UpstreamConfig};
pub use error::{GenerationError, GeocodeError, SuggestError, ValidationError, WeatherError};
pub use model::{
    Coordinates, GenerationChunk, Suggestion, SuggestionRequest, SuggestionResponse,
    SuggestionTrace, WeatherObservation,
};
pub use orchestrator::SuggestionOrchestrator;
pub use provider::{Geocoder, TextGenerator, WeatherProvider};
