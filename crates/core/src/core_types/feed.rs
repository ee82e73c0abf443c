//! Upstream weather-service payload
//!
//! The weather service answers with a JSON object carrying the current
//! conditions as a WMO weather code plus raw numbers. This module parses that
//! payload leniently and converts it into a [`WeatherInput`]. A field of the
//! wrong type is treated as missing, and an unparseable payload becomes an
//! empty reading: effects are cosmetic, so a bad feed must never surface as an
//! error.

use crate::core_types::weather::{ViewMode, WeatherInput, WeatherType};
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Current-conditions payload from the weather service
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeedReading {
    /// Presentation mode echoed back by the service (`normal`, `dev`, `god`)
    #[serde(deserialize_with = "lenient_view_mode")]
    pub view_mode: Option<ViewMode>,
    /// Air temperature (°C)
    #[serde(deserialize_with = "lenient_number")]
    pub temperature: Option<f64>,
    /// Wind speed (km/h)
    #[serde(deserialize_with = "lenient_number")]
    pub wind_speed: Option<f64>,
    /// WMO weather interpretation code
    #[serde(deserialize_with = "lenient_number")]
    pub weather_code: Option<f64>,
}

impl FeedReading {
    /// Parse a payload, falling back to an empty reading on malformed JSON
    pub fn from_json(payload: &str) -> Self {
        match serde_json::from_str(payload) {
            Ok(reading) => reading,
            Err(e) => {
                warn!("Discarding malformed weather payload: {e}");
                Self::default()
            }
        }
    }

    /// Convert to engine input. The weather code is mapped through the WMO table.
    pub fn into_input(self) -> WeatherInput {
        let code = self
            .weather_code
            .filter(|c| c.is_finite() && c.fract() == 0.0)
            .map(|c| c as i32);

        WeatherInput {
            temperature: self.temperature.map(|t| t as f32),
            wind_speed: self.wind_speed.map(|w| w as f32),
            weather_type: Some(WeatherType::from_wmo_code(code)),
            view_mode: self.view_mode,
            is_active: Some(true),
        }
    }
}

/// Accept any JSON value; keep it only if it is a number (or a numeric string).
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct LenientNumber;

    impl<'de> Visitor<'de> for LenientNumber {
        type Value = Option<f64>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("any value")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(v.is_finite().then_some(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(v.trim().parse::<f64>().ok().filter(|n| n.is_finite()))
        }

        fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2: Deserializer<'de>>(self, d: D2) -> Result<Self::Value, D2::Error> {
            d.deserialize_any(self)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            while seq.next_element::<IgnoredAny>()?.is_some() {}
            Ok(None)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            Ok(None)
        }
    }

    deserializer.deserialize_any(LenientNumber)
}

/// Unknown or mistyped view modes become `None` instead of failing the payload.
fn lenient_view_mode<'de, D>(deserializer: D) -> Result<Option<ViewMode>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_payload() {
        let payload = r#"{
            "viewMode": "normal",
            "mode": "live",
            "latitude": 48.2,
            "longitude": 16.4,
            "temperature": -3.5,
            "windSpeed": 27.0,
            "humidity": 80,
            "weatherCode": 71,
            "raw": { "hourly": { "temperature_2m": [1, 2, 3] } }
        }"#;
        let input = FeedReading::from_json(payload).into_input();
        assert_eq!(input.temperature, Some(-3.5));
        assert_eq!(input.wind_speed, Some(27.0));
        assert_eq!(input.weather_type, Some(WeatherType::Snow));
        assert_eq!(input.view_mode, Some(ViewMode::Normal));
        assert_eq!(input.is_active, Some(true));
    }

    #[test]
    fn test_mistyped_fields_become_missing() {
        let payload = r#"{
            "viewMode": 7,
            "temperature": "warm",
            "windSpeed": { "value": 3 },
            "weatherCode": true
        }"#;
        let feed = FeedReading::from_json(payload);
        assert_eq!(feed.temperature, None);
        assert_eq!(feed.wind_speed, None);
        assert_eq!(feed.weather_code, None);
        assert_eq!(feed.view_mode, None);
        assert_eq!(feed.into_input().weather_type, Some(WeatherType::Clear));
    }

    #[test]
    fn test_numeric_strings_and_aliases() {
        let feed = FeedReading::from_json(r#"{"temperature":"31.5","viewMode":"dev","weatherCode":"95"}"#);
        assert_eq!(feed.temperature, Some(31.5));
        assert_eq!(feed.view_mode, Some(ViewMode::Diagnostic));
        assert_eq!(feed.into_input().weather_type, Some(WeatherType::Thunder));
    }

    #[test]
    fn test_garbage_payload_is_empty() {
        assert_eq!(FeedReading::from_json("not json"), FeedReading::default());
        assert_eq!(FeedReading::from_json("\"sunny\""), FeedReading::default());
    }

    #[test]
    fn test_fractional_code_is_ignored() {
        let feed = FeedReading::from_json(r#"{"weatherCode": 61.5}"#);
        assert_eq!(feed.into_input().weather_type, Some(WeatherType::Clear));
    }
}
