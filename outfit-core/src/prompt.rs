use crate::model::{SuggestionRequest, WeatherObservation};

/// Appended when the caller rated the previous suggestion poorly.
pub const RETRY_SUFFIX: &str = " The previous suggestion wasn't good enough. Make a better one.";

/// Ratings in this range ask for a better suggestion.
const RETRY_RATINGS: std::ops::Range<i64> = 1..8;

/// Builds the instruction sent to the generation service.
pub fn build_prompt(request: &SuggestionRequest, weather: &WeatherObservation) -> String {
    let mut prompt = format!(
        "Suggest clothing for a person with height {} attending a {} in {} weather with temperature {:.1}°C.",
        request.height, request.occasion, weather.condition, weather.temperature_celsius,
    );

    if RETRY_RATINGS.contains(&request.rating) {
        prompt.push_str(RETRY_SUFFIX);
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(rating: i64) -> SuggestionRequest {
        SuggestionRequest {
            height: "180cm".into(),
            location: "Lisbon".into(),
            occasion: "wedding".into(),
            rating,
        }
    }

    fn clear(temperature_celsius: f64) -> WeatherObservation {
        WeatherObservation {
            temperature_celsius,
            condition: "clear".into(),
            wind_speed_kmh: 3.0,
        }
    }

    #[test]
    fn low_rating_appends_retry_suffix() {
        let prompt = build_prompt(&request(5), &clear(21.3));
        assert_eq!(
            prompt,
            "Suggest clothing for a person with height 180cm attending a wedding in clear \
             weather with temperature 21.3°C. The previous suggestion wasn't good enough. \
             Make a better one."
        );
    }

    #[test]
    fn suffix_only_for_ratings_one_to_seven() {
        for rating in 1..=7 {
            assert!(build_prompt(&request(rating), &clear(10.0)).ends_with(RETRY_SUFFIX));
        }
        for rating in [i64::MIN, -3, -1, 0, 8, 9, 10, 100] {
            let prompt = build_prompt(&request(rating), &clear(10.0));
            assert!(!prompt.contains("previous suggestion"), "rating {rating}");
            assert!(prompt.ends_with("10.0°C."));
        }
    }

    #[test]
    fn temperature_has_one_decimal() {
        assert!(build_prompt(&request(0), &clear(-4.0)).ends_with("temperature -4.0°C."));
        assert!(build_prompt(&request(0), &clear(18.26)).ends_with("temperature 18.3°C."));
    }
}
