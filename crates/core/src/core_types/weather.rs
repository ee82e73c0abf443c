//! Weather readings and the effect conditions derived from them
//!
//! A [`WeatherReading`] is the single snapshot of environmental parameters that
//! drives every effect. It is always fully populated: the partial
//! [`WeatherInput`] supplied by the feed is sanitised on the way in, so nothing
//! downstream has to deal with missing or non-finite values.
//!
//! [`EffectConditions`] turns a reading into the boolean gates each effect
//! checks (freezing, windy, raining, ...). Keeping the thresholds in one place
//! means the simulator, the schedulers and the particle systems can never
//! disagree about which condition is active.

use crate::core_types::units::{Celsius, KilometersPerHour};
use crate::core_types::vec2::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_1_SQRT_2;
use std::fmt;

/// Wind speed above which the cursor drifts and wind streaks appear (km/h)
pub const WINDY_THRESHOLD_KMH: f32 = 20.0;

/// Temperature above which condensation forms on the cursor (°C)
pub const HOT_THRESHOLD_C: f32 = 30.0;

/// Sky condition reported by the weather feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherType {
    /// Clear sky
    #[default]
    Clear,
    /// Partly cloudy to overcast
    Cloudy,
    /// Fog or depositing rime fog
    Fog,
    /// Drizzle, rain or showers
    Rain,
    /// Snow fall, snow grains or snow showers
    Snow,
    /// Thunderstorm, with or without hail
    Thunder,
}

impl WeatherType {
    /// Map a WMO weather interpretation code to a sky condition.
    ///
    /// Missing and unknown codes map to [`WeatherType::Clear`].
    ///
    /// # Example
    /// ```
    /// use weather_fx_core::WeatherType;
    ///
    /// assert_eq!(WeatherType::from_wmo_code(Some(63)), WeatherType::Rain);
    /// assert_eq!(WeatherType::from_wmo_code(Some(96)), WeatherType::Thunder);
    /// assert_eq!(WeatherType::from_wmo_code(None), WeatherType::Clear);
    /// ```
    pub fn from_wmo_code(code: Option<i32>) -> Self {
        match code {
            Some(1..=3) => WeatherType::Cloudy,
            Some(45 | 48) => WeatherType::Fog,
            Some(51..=67 | 80..=82) => WeatherType::Rain,
            Some(71..=77 | 85..=86) => WeatherType::Snow,
            Some(95..=99) => WeatherType::Thunder,
            _ => WeatherType::Clear,
        }
    }

    /// Convert from u8 for FFI compatibility
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(WeatherType::Clear),
            1 => Some(WeatherType::Cloudy),
            2 => Some(WeatherType::Fog),
            3 => Some(WeatherType::Rain),
            4 => Some(WeatherType::Snow),
            5 => Some(WeatherType::Thunder),
            _ => None,
        }
    }

    /// Convert to u8 for FFI compatibility
    pub fn as_u8(self) -> u8 {
        match self {
            WeatherType::Clear => 0,
            WeatherType::Cloudy => 1,
            WeatherType::Fog => 2,
            WeatherType::Rain => 3,
            WeatherType::Snow => 4,
            WeatherType::Thunder => 5,
        }
    }
}

impl fmt::Display for WeatherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WeatherType::Clear => "clear",
            WeatherType::Cloudy => "cloudy",
            WeatherType::Fog => "fog",
            WeatherType::Rain => "rain",
            WeatherType::Snow => "snow",
            WeatherType::Thunder => "thunder",
        };
        f.write_str(name)
    }
}

/// How the host is presenting the weather
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Live weather with all effects
    #[default]
    Normal,
    /// Plain data view; suppresses every effect
    #[serde(alias = "dev")]
    Diagnostic,
    /// Hand-picked weather (manual override panel)
    #[serde(alias = "god")]
    Override,
}

impl ViewMode {
    /// Convert from u8 for FFI compatibility
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ViewMode::Normal),
            1 => Some(ViewMode::Diagnostic),
            2 => Some(ViewMode::Override),
            _ => None,
        }
    }

    /// Convert to u8 for FFI compatibility
    pub fn as_u8(self) -> u8 {
        match self {
            ViewMode::Normal => 0,
            ViewMode::Diagnostic => 1,
            ViewMode::Override => 2,
        }
    }
}

/// Partial weather reading as supplied by a collaborator.
///
/// Every field is optional; [`WeatherReading::from_input`] fills the gaps.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WeatherInput {
    /// Air temperature (°C)
    pub temperature: Option<f32>,
    /// Wind speed (km/h)
    pub wind_speed: Option<f32>,
    /// Sky condition
    pub weather_type: Option<WeatherType>,
    /// Presentation mode
    pub view_mode: Option<ViewMode>,
    /// Whether the weather session is live. Missing means "yes": an update is an activation.
    pub is_active: Option<bool>,
}

impl WeatherInput {
    /// Fully specified active reading
    pub fn active(temperature: f32, wind_speed: f32, weather_type: WeatherType) -> Self {
        Self {
            temperature: Some(temperature),
            wind_speed: Some(wind_speed),
            weather_type: Some(weather_type),
            view_mode: Some(ViewMode::Normal),
            is_active: Some(true),
        }
    }

    /// Same reading with a different view mode
    pub fn with_view_mode(mut self, view_mode: ViewMode) -> Self {
        self.view_mode = Some(view_mode);
        self
    }

    /// Same reading with an explicit activity flag
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }
}

/// Sanitised weather snapshot. Replaced wholesale, never mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub(crate) temperature: Celsius,
    pub(crate) wind_speed: KilometersPerHour,
    pub(crate) weather_type: WeatherType,
    pub(crate) view_mode: ViewMode,
    pub(crate) is_active: bool,
}

impl Default for WeatherReading {
    fn default() -> Self {
        Self::inert()
    }
}

impl WeatherReading {
    /// Reading used outside of a weather session
    pub const fn inert() -> Self {
        Self {
            temperature: Celsius::ROOM,
            wind_speed: KilometersPerHour::CALM,
            weather_type: WeatherType::Clear,
            view_mode: ViewMode::Normal,
            is_active: false,
        }
    }

    /// Build a reading from partial input, silently defaulting anything missing or malformed.
    ///
    /// - temperature: missing or non-finite → 20°C
    /// - wind speed: missing, non-finite or negative → 0 km/h
    /// - weather type → clear, view mode → normal, activity → active
    pub fn from_input(input: WeatherInput) -> Self {
        let temperature = input
            .temperature
            .filter(|t| t.is_finite())
            .map_or(Celsius::ROOM, Celsius::new);
        let wind_speed = input
            .wind_speed
            .filter(|w| w.is_finite() && *w >= 0.0)
            .map_or(KilometersPerHour::CALM, KilometersPerHour::new);

        Self {
            temperature,
            wind_speed,
            weather_type: input.weather_type.unwrap_or_default(),
            view_mode: input.view_mode.unwrap_or_default(),
            is_active: input.is_active.unwrap_or(true),
        }
    }

    /// Air temperature
    pub fn temperature(&self) -> Celsius {
        self.temperature
    }

    /// Wind speed
    pub fn wind_speed(&self) -> KilometersPerHour {
        self.wind_speed
    }

    /// Sky condition
    pub fn weather_type(&self) -> WeatherType {
        self.weather_type
    }

    /// Presentation mode
    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Whether a weather session is live
    pub fn is_active(&self) -> bool {
        self.is_active
    }
}

/// Unit wind direction in viewport space (+x right, +y down).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindDirection {
    x: f32,
    y: f32,
}

impl Default for WindDirection {
    fn default() -> Self {
        Self::EAST
    }
}

impl WindDirection {
    /// Blowing right
    pub const EAST: WindDirection = WindDirection { x: 1.0, y: 0.0 };
    /// Blowing left
    pub const WEST: WindDirection = WindDirection { x: -1.0, y: 0.0 };
    /// Blowing down the screen
    pub const SOUTH: WindDirection = WindDirection { x: 0.0, y: 1.0 };
    /// Blowing up the screen
    pub const NORTH: WindDirection = WindDirection { x: 0.0, y: -1.0 };
    pub const SOUTH_EAST: WindDirection = WindDirection { x: FRAC_1_SQRT_2, y: FRAC_1_SQRT_2 };
    pub const SOUTH_WEST: WindDirection = WindDirection { x: -FRAC_1_SQRT_2, y: FRAC_1_SQRT_2 };
    pub const NORTH_EAST: WindDirection = WindDirection { x: FRAC_1_SQRT_2, y: -FRAC_1_SQRT_2 };
    pub const NORTH_WEST: WindDirection = WindDirection { x: -FRAC_1_SQRT_2, y: -FRAC_1_SQRT_2 };

    /// The eight directions the wind scheduler chooses from
    pub const COMPASS: [WindDirection; 8] = [
        Self::EAST,
        Self::WEST,
        Self::SOUTH,
        Self::NORTH,
        Self::SOUTH_EAST,
        Self::SOUTH_WEST,
        Self::NORTH_EAST,
        Self::NORTH_WEST,
    ];

    /// Normalise an arbitrary vector. Zero-length or non-finite input falls back to east.
    pub fn new(x: f32, y: f32) -> Self {
        let len = x.hypot(y);
        if !len.is_finite() || len <= f32::EPSILON {
            return Self::EAST;
        }
        Self {
            x: (x / len).clamp(-1.0, 1.0),
            y: (y / len).clamp(-1.0, 1.0),
        }
    }

    /// Horizontal component
    pub fn x(&self) -> f32 {
        self.x
    }

    /// Vertical component
    pub fn y(&self) -> f32 {
        self.y
    }

    /// As a vector
    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Effect gates derived from a reading and the host's suppression flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct EffectConditions {
    /// Session active, not in diagnostic mode, not suppressed
    pub enabled: bool,
    /// Below freezing and not a thunderstorm: drives the freeze cycle
    pub freezing: bool,
    /// Wind above the drift threshold
    pub windy: bool,
    /// Rain or thunder: drives the precipitation trail and rain field
    pub raining: bool,
    /// Thunderstorm: drives strikes and the flash sequence
    pub thunder: bool,
    pub snowy: bool,
    pub foggy: bool,
    /// Above the condensation threshold
    pub hot: bool,
    /// Snow or sub-zero: the cursor follows with heavy lag
    pub heavy_lag: bool,
}

impl EffectConditions {
    /// Evaluate every gate for a reading
    pub fn evaluate(reading: &WeatherReading, suppressed: bool) -> Self {
        let enabled =
            reading.is_active && reading.view_mode != ViewMode::Diagnostic && !suppressed;
        if !enabled {
            return Self::default();
        }

        let cold = reading.temperature.is_below_freezing();
        let kind = reading.weather_type;
        let snowy = kind == WeatherType::Snow;

        Self {
            enabled,
            freezing: cold && kind != WeatherType::Thunder,
            windy: *reading.wind_speed > WINDY_THRESHOLD_KMH,
            raining: matches!(kind, WeatherType::Rain | WeatherType::Thunder),
            thunder: kind == WeatherType::Thunder,
            snowy,
            foggy: kind == WeatherType::Fog,
            hot: *reading.temperature > HOT_THRESHOLD_C,
            heavy_lag: cold || snowy,
        }
    }

    /// Wind streaks blow in strong wind and in every thunderstorm
    pub fn wind_streaks(&self) -> bool {
        self.windy || self.thunder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default() {
        let reading = WeatherReading::from_input(WeatherInput::default());
        assert_eq!(reading.temperature(), Celsius::new(20.0));
        assert_eq!(reading.wind_speed(), KilometersPerHour::CALM);
        assert_eq!(reading.weather_type(), WeatherType::Clear);
        assert_eq!(reading.view_mode(), ViewMode::Normal);
        assert!(reading.is_active());
    }

    #[test]
    fn test_non_finite_fields_default() {
        let input = WeatherInput {
            temperature: Some(f32::NAN),
            wind_speed: Some(f32::INFINITY),
            ..WeatherInput::default()
        };
        let reading = WeatherReading::from_input(input);
        assert_eq!(*reading.temperature(), 20.0);
        assert_eq!(*reading.wind_speed(), 0.0);

        let negative_wind = WeatherInput {
            wind_speed: Some(-12.0),
            ..WeatherInput::default()
        };
        assert_eq!(*WeatherReading::from_input(negative_wind).wind_speed(), 0.0);
    }

    #[test]
    fn test_wmo_mapping() {
        let cases = [
            (None, WeatherType::Clear),
            (Some(0), WeatherType::Clear),
            (Some(2), WeatherType::Cloudy),
            (Some(45), WeatherType::Fog),
            (Some(48), WeatherType::Fog),
            (Some(51), WeatherType::Rain),
            (Some(81), WeatherType::Rain),
            (Some(73), WeatherType::Snow),
            (Some(86), WeatherType::Snow),
            (Some(95), WeatherType::Thunder),
            (Some(44), WeatherType::Clear),
            (Some(-1), WeatherType::Clear),
        ];
        for (code, expected) in cases {
            assert_eq!(WeatherType::from_wmo_code(code), expected, "code {code:?}");
        }
    }

    #[test]
    fn test_type_conversion() {
        for kind in [
            WeatherType::Clear,
            WeatherType::Cloudy,
            WeatherType::Fog,
            WeatherType::Rain,
            WeatherType::Snow,
            WeatherType::Thunder,
        ] {
            assert_eq!(WeatherType::from_u8(kind.as_u8()), Some(kind));
        }
        assert_eq!(WeatherType::from_u8(6), None);
        assert_eq!(ViewMode::from_u8(1), Some(ViewMode::Diagnostic));
        assert_eq!(ViewMode::from_u8(3), None);
    }

    #[test]
    fn test_wind_direction_normalises() {
        let dir = WindDirection::new(3.0, 4.0);
        assert!((dir.x() - 0.6).abs() < 1e-6);
        assert!((dir.y() - 0.8).abs() < 1e-6);
        assert_eq!(WindDirection::new(0.0, 0.0), WindDirection::EAST);
        assert_eq!(WindDirection::new(f32::NAN, 1.0), WindDirection::EAST);

        for dir in WindDirection::COMPASS {
            assert!((dir.as_vec2().norm() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_conditions_inactive_are_all_off() {
        let reading = WeatherReading::from_input(
            WeatherInput::active(-10.0, 80.0, WeatherType::Thunder).with_active(false),
        );
        assert_eq!(EffectConditions::evaluate(&reading, false), EffectConditions::default());

        let diagnostic = WeatherReading::from_input(
            WeatherInput::active(-10.0, 80.0, WeatherType::Snow).with_view_mode(ViewMode::Diagnostic),
        );
        assert!(!EffectConditions::evaluate(&diagnostic, false).enabled);

        let live = WeatherReading::from_input(WeatherInput::active(-10.0, 80.0, WeatherType::Snow));
        assert!(!EffectConditions::evaluate(&live, true).enabled);
    }

    #[test]
    fn test_freeze_gate_excludes_thunder() {
        let storm = WeatherReading::from_input(WeatherInput::active(-5.0, 5.0, WeatherType::Thunder));
        let cond = EffectConditions::evaluate(&storm, false);
        assert!(!cond.freezing);
        assert!(cond.thunder && cond.raining && cond.heavy_lag);
        assert!(cond.wind_streaks());

        let snow = WeatherReading::from_input(WeatherInput::active(-5.0, 5.0, WeatherType::Snow));
        let cond = EffectConditions::evaluate(&snow, false);
        assert!(cond.freezing && cond.snowy && cond.heavy_lag);
        assert!(!cond.windy);
    }

    #[test]
    fn test_thresholds_are_strict() {
        let edge = WeatherReading::from_input(WeatherInput::active(30.0, 20.0, WeatherType::Clear));
        let cond = EffectConditions::evaluate(&edge, false);
        assert!(!cond.hot);
        assert!(!cond.windy);
        assert!(!cond.heavy_lag);
    }
}
