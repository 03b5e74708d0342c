use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /suggest`. Absent or `null` fields take their zero value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub height: String,
    #[serde(deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(deserialize_with = "null_as_default")]
    pub occasion: String,
    /// Satisfaction with the previous suggestion; only `1..=7` has an effect.
    #[serde(deserialize_with = "null_as_default")]
    pub rating: i64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl SuggestionRequest {
    /// Names of the required fields that are empty, in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("height", &self.height),
            ("location", &self.location),
            ("occasion", &self.occasion),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub temperature_celsius: f64,
    pub condition: String,
    /// Diagnostic only, never part of the prompt.
    pub wind_speed_kmh: f64,
}

/// One record of the newline-delimited generation stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GenerationChunk {
    #[serde(rename = "response")]
    pub fragment: String,
    #[serde(rename = "done")]
    pub is_final: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionResponse {
    pub suggestion: String,
}

/// Per-request diagnostics returned next to the response.
#[derive(Debug, Clone, Serialize)]
pub struct SuggestionTrace {
    pub started_at: DateTime<Utc>,
    pub coordinates: Coordinates,
    pub weather: WeatherObservation,
    pub prompt: String,
    pub elapsed_ms: u128,
}

/// Successful pipeline outcome.
#[derive(Debug, Clone)]
pub struct Suggestion {
    pub response: SuggestionResponse,
    pub trace: SuggestionTrace,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_fields_default_when_absent() {
        let req: SuggestionRequest =
            serde_json::from_str(r#"{"location":"Oslo"}"#).expect("valid json");

        assert_eq!(req.location, "Oslo");
        assert_eq!(req.rating, 0);
        assert_eq!(req.missing_fields(), vec!["height", "occasion"]);
    }

    #[test]
    fn null_request_fields_take_zero_value() {
        let req: SuggestionRequest = serde_json::from_str(
            r#"{"height":null,"location":"Oslo","occasion":"dinner","rating":null}"#,
        )
        .expect("null is accepted");

        assert_eq!(req.height, "");
        assert_eq!(req.rating, 0);
        assert_eq!(req.missing_fields(), vec!["height"]);
    }

    #[test]
    fn wrong_field_type_is_still_rejected() {
        assert!(serde_json::from_str::<SuggestionRequest>(r#"{"rating":"five"}"#).is_err());
    }

    #[test]
    fn chunk_uses_wire_names() {
        let chunk: GenerationChunk =
            serde_json::from_str(r#"{"response":"hi","done":true,"model":"x"}"#).unwrap();
        assert_eq!(chunk.fragment, "hi");
        assert!(chunk.is_final);

        let empty: GenerationChunk = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, GenerationChunk::default());
    }
}
