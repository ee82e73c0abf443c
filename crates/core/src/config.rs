//! Tunable constants for every effect
//!
//! All "feel" constants live here as named, overridable values. `Default`
//! reproduces the tuned values of the live site; hosts may load a different
//! configuration through serde and must pass it through
//! [`EffectsConfig::validate`] (done by `EffectsEngine::new`).
//!
//! # Example
//! ```
//! use weather_fx_core::EffectsConfig;
//!
//! let mut config = EffectsConfig::default();
//! config.thunder.strike_probability = 0.5;
//! assert!(config.validate().is_ok());
//!
//! config.precipitation.capacity = 0;
//! assert!(config.validate().is_err());
//! ```

use crate::core_types::units::Millis;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a configuration was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A random range has its bounds swapped
    #[error("{name}: minimum {min} exceeds maximum {max}")]
    InvertedRange { name: &'static str, min: f64, max: f64 },

    /// A cadence, duration or capacity that must be non-zero is zero
    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },

    /// A probability outside [0, 1]
    #[error("{name} must be within [0, 1], got {value}")]
    Probability { name: &'static str, value: f32 },

    /// A follow coefficient outside (0, 1]
    #[error("{name} must be within (0, 1], got {value}")]
    Smoothing { name: &'static str, value: f32 },

    /// A value that must be finite and non-negative
    #[error("{name} must be finite and non-negative, got {value}")]
    Negative { name: &'static str, value: f32 },
}

/// Inclusive random range of milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MillisRange {
    pub min: Millis,
    pub max: Millis,
}

impl MillisRange {
    /// Range between two raw millisecond values
    pub const fn new(min: u64, max: u64) -> Self {
        Self {
            min: Millis::new(min),
            max: Millis::new(max),
        }
    }

    /// Draw a duration uniformly from the range
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Millis {
        if self.min >= self.max {
            return self.min;
        }
        Millis::new(rng.random_range(*self.min..=*self.max))
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if self.min > self.max {
            return Err(ConfigError::InvertedRange {
                name,
                min: *self.min as f64,
                max: *self.max as f64,
            });
        }
        Ok(())
    }
}

/// Half-open random range of floats `[min, max)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpanRange {
    pub min: f32,
    pub max: f32,
}

impl SpanRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Draw a value uniformly from the range
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.min >= self.max {
            return self.min;
        }
        rng.random_range(self.min..self.max)
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(ConfigError::Negative {
                name,
                value: if self.min.is_finite() { self.max } else { self.min },
            });
        }
        if self.min > self.max {
            return Err(ConfigError::InvertedRange {
                name,
                min: f64::from(self.min),
                max: f64::from(self.max),
            });
        }
        Ok(())
    }
}

/// Cursor motion constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KinematicsConfig {
    /// Input younger than this counts as "moving"
    pub moving_window: Millis,
    /// Idle time before wind drift takes over
    pub drift_idle: Millis,
    /// Drift speed at zero wind (px per tick)
    pub drift_base_speed: f32,
    /// Wind speed divisor in `base + wind / divisor` (km/h per px-per-tick)
    pub drift_wind_divisor: f32,
    /// Follow coefficient in normal conditions
    pub follow_smoothing: f32,
    /// Follow coefficient in snow or sub-zero temperatures
    pub heavy_smoothing: f32,
    /// How long a press keeps the cursor in its pressed state
    pub press_pulse: Millis,
}

impl Default for KinematicsConfig {
    fn default() -> Self {
        Self {
            moving_window: Millis::new(100),
            drift_idle: Millis::new(300),
            drift_base_speed: 0.3,
            drift_wind_divisor: 50.0,
            follow_smoothing: 0.15,
            heavy_smoothing: 0.02,
            press_pulse: Millis::new(150),
        }
    }
}

impl KinematicsConfig {
    /// Drift step length per tick for a wind speed (km/h). Linear and unclamped.
    pub fn drift_speed(&self, wind_kmh: f32) -> f32 {
        self.drift_base_speed + wind_kmh / self.drift_wind_divisor
    }
}

/// Freeze cycle timings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreezeConfig {
    /// Delay from the cold snap to the first freeze
    pub first_delay: MillisRange,
    /// How long the cursor stays frozen
    pub hold: MillisRange,
    /// Pause between a thaw and the next freeze
    pub cooldown: MillisRange,
}

impl Default for FreezeConfig {
    fn default() -> Self {
        Self {
            first_delay: MillisRange::new(1000, 2000),
            hold: MillisRange::new(3000, 5000),
            cooldown: MillisRange::new(5000, 8000),
        }
    }
}

/// Cursor lightning flash timings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashConfig {
    /// Wait after the strike so the screen-wide flash finishes first
    pub delay: Millis,
    /// Length of each pulse
    pub pulse: Millis,
    /// Start-to-start spacing between pulses
    pub spacing: Millis,
    /// Number of pulses
    pub pulses: u32,
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            delay: Millis::new(600),
            pulse: Millis::new(50),
            spacing: Millis::new(100),
            pulses: 2,
        }
    }
}

/// Wind direction rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindConfig {
    /// Time between direction changes, re-drawn after every change
    pub interval: MillisRange,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            interval: MillisRange::new(3000, 8000),
        }
    }
}

/// Thunder strike triggering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThunderConfig {
    /// Time between strike checks
    pub check_interval: Millis,
    /// Chance that a check produces a strike
    pub strike_probability: f32,
}

impl Default for ThunderConfig {
    fn default() -> Self {
        Self {
            check_interval: Millis::new(4000),
            strike_probability: 0.3,
        }
    }
}

/// Cursor-local particle trail
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailConfig {
    /// Spawn cadence
    pub interval: Millis,
    /// Maximum offset from the cursor on each axis (px)
    pub jitter: f32,
    /// Queue length; the oldest particle is evicted beyond this
    pub capacity: usize,
    /// Give each particle a random rotation in [0°, 360°)
    pub random_rotation: bool,
}

impl TrailConfig {
    /// Raindrops shed while it rains
    pub fn precipitation() -> Self {
        Self {
            interval: Millis::new(80),
            jitter: 20.0,
            capacity: 15,
            random_rotation: false,
        }
    }

    /// Sweat beads while it is hot
    pub fn condensation() -> Self {
        Self {
            interval: Millis::new(500),
            jitter: 15.0,
            capacity: 6,
            random_rotation: true,
        }
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if self.interval == Millis::ZERO {
            return Err(ConfigError::Zero { name });
        }
        if self.capacity == 0 {
            return Err(ConfigError::Zero { name });
        }
        if !self.jitter.is_finite() || self.jitter < 0.0 {
            return Err(ConfigError::Negative {
                name,
                value: self.jitter,
            });
        }
        Ok(())
    }
}

/// Screen-wide ambient particle pools
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbientConfig {
    pub rain_count: usize,
    /// Fall duration of a raindrop (s)
    pub rain_duration: SpanRange,
    pub snow_count: usize,
    /// Fall duration of a snowflake (s)
    pub snow_duration: SpanRange,
    /// Snowflake diameter (px)
    pub snow_size: SpanRange,
    pub wind_count: usize,
    /// Flight duration of a wind streak (s)
    pub wind_duration: SpanRange,
    /// Magnitude of the negative start offset (s); the field starts mid-motion
    pub start_offset: SpanRange,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            rain_count: 300,
            rain_duration: SpanRange::new(0.3, 0.5),
            snow_count: 200,
            snow_duration: SpanRange::new(2.0, 6.0),
            snow_size: SpanRange::new(8.0, 16.0),
            wind_count: 30,
            wind_duration: SpanRange::new(0.4, 1.4),
            start_offset: SpanRange::new(0.0, 2.0),
        }
    }
}

/// Primitives the host can provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostCapabilities {
    /// One-shot timers. Without them every timed effect stays dormant.
    pub timers: bool,
    /// Per-frame callbacks. Without them the cursor stops advancing.
    pub animation_frames: bool,
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self {
            timers: true,
            animation_frames: true,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    pub kinematics: KinematicsConfig,
    pub freeze: FreezeConfig,
    pub flash: FlashConfig,
    pub wind: WindConfig,
    pub thunder: ThunderConfig,
    pub precipitation: TrailConfig,
    pub condensation: TrailConfig,
    pub ambient: AmbientConfig,
    pub host: HostCapabilities,
    /// Fixed RNG seed for reproducible runs; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            kinematics: KinematicsConfig::default(),
            freeze: FreezeConfig::default(),
            flash: FlashConfig::default(),
            wind: WindConfig::default(),
            thunder: ThunderConfig::default(),
            precipitation: TrailConfig::precipitation(),
            condensation: TrailConfig::condensation(),
            ambient: AmbientConfig::default(),
            host: HostCapabilities::default(),
            seed: None,
        }
    }
}

impl EffectsConfig {
    /// Default configuration with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Check every constant for consistency
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let k = &self.kinematics;
        for (name, value) in [
            ("kinematics.follow_smoothing", k.follow_smoothing),
            ("kinematics.heavy_smoothing", k.heavy_smoothing),
        ] {
            if value.is_nan() || value <= 0.0 || value > 1.0 {
                return Err(ConfigError::Smoothing { name, value });
            }
        }
        if !k.drift_base_speed.is_finite() || k.drift_base_speed < 0.0 {
            return Err(ConfigError::Negative {
                name: "kinematics.drift_base_speed",
                value: k.drift_base_speed,
            });
        }
        if !k.drift_wind_divisor.is_finite() || k.drift_wind_divisor <= 0.0 {
            return Err(ConfigError::Zero {
                name: "kinematics.drift_wind_divisor",
            });
        }

        self.freeze.first_delay.validate("freeze.first_delay")?;
        self.freeze.hold.validate("freeze.hold")?;
        self.freeze.cooldown.validate("freeze.cooldown")?;
        if self.freeze.hold.min == Millis::ZERO {
            return Err(ConfigError::Zero { name: "freeze.hold" });
        }

        if self.flash.pulse == Millis::ZERO {
            return Err(ConfigError::Zero { name: "flash.pulse" });
        }
        if self.flash.pulses > 1 && self.flash.spacing <= self.flash.pulse {
            // pulses must not overlap
            return Err(ConfigError::InvertedRange {
                name: "flash.pulse/spacing",
                min: *self.flash.pulse as f64,
                max: *self.flash.spacing as f64,
            });
        }

        self.wind.interval.validate("wind.interval")?;
        if self.wind.interval.min == Millis::ZERO {
            return Err(ConfigError::Zero {
                name: "wind.interval",
            });
        }

        if self.thunder.check_interval == Millis::ZERO {
            return Err(ConfigError::Zero {
                name: "thunder.check_interval",
            });
        }
        let p = self.thunder.strike_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(ConfigError::Probability {
                name: "thunder.strike_probability",
                value: p,
            });
        }

        self.precipitation.validate("precipitation")?;
        self.condensation.validate("condensation")?;

        let a = &self.ambient;
        a.rain_duration.validate("ambient.rain_duration")?;
        a.snow_duration.validate("ambient.snow_duration")?;
        a.snow_size.validate("ambient.snow_size")?;
        a.wind_duration.validate("ambient.wind_duration")?;
        a.start_offset.validate("ambient.start_offset")?;
        if a.start_offset.min < 0.0 {
            return Err(ConfigError::Negative {
                name: "ambient.start_offset",
                value: a.start_offset.min,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(EffectsConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_default_drift_speed() {
        let k = KinematicsConfig::default();
        assert!((k.drift_speed(20.0) - 0.7).abs() < 1e-6);
        assert!((k.drift_speed(100.0) - 2.3).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = EffectsConfig::default();
        config.thunder.strike_probability = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Probability { .. })
        ));

        let mut config = EffectsConfig::default();
        config.freeze.hold = MillisRange::new(5000, 3000);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedRange { name: "freeze.hold", .. })
        ));

        let mut config = EffectsConfig::default();
        config.kinematics.follow_smoothing = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Smoothing { .. })));

        let mut config = EffectsConfig::default();
        config.condensation.interval = Millis::ZERO;
        assert_eq!(
            config.validate(),
            Err(ConfigError::Zero {
                name: "condensation"
            })
        );
    }

    #[test]
    fn test_error_messages() {
        let err = ConfigError::Probability {
            name: "thunder.strike_probability",
            value: 2.0,
        };
        assert_eq!(
            err.to_string(),
            "thunder.strike_probability must be within [0, 1], got 2"
        );
    }

    #[test]
    fn test_ranges_sample_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let range = MillisRange::new(3000, 8000);
        let span = SpanRange::new(0.3, 0.5);
        for _ in 0..500 {
            let m = range.sample(&mut rng);
            assert!(m >= range.min && m <= range.max);
            let s = span.sample(&mut rng);
            assert!((0.3..0.5).contains(&s));
        }
        assert_eq!(MillisRange::new(50, 50).sample(&mut rng), Millis::new(50));
    }

    #[test]
    fn test_partial_config_deserializes() {
        let config: EffectsConfig =
            serde_json::from_str(r#"{ "seed": 9, "thunder": { "check_interval": 2000, "strike_probability": 1.0 } }"#)
                .expect("partial config should parse");
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.thunder.check_interval, Millis::new(2000));
        assert_eq!(config.precipitation, TrailConfig::precipitation());
    }
}
