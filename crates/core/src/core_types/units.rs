//! Semantic unit types for weather readings and engine time
//!
//! Newtype wrappers keep temperatures, wind speeds and timestamps from being
//! mixed up as they flow from the weather feed into the effect math.
//!
//! # Design Philosophy
//! - Temperature and wind use f32, the precision the effects need
//! - Engine time is whole milliseconds (`u64`) supplied by the host
//! - Total ordering via `Ord` (NaN handled as greater than all values)
//! - `Deref` to the raw value for arithmetic at the call site
//!
//! # Usage
//! ```
//! use weather_fx_core::core_types::units::{Celsius, Millis};
//!
//! let t = Celsius::new(-5.0);
//! assert!(t.is_below_freezing());
//!
//! let start = Millis::new(1_000);
//! let later = start + Millis::new(250);
//! assert_eq!(later.saturating_sub(start), Millis::new(250));
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Deref, Sub};

/// Compare f32 values with total ordering using Rust's built-in `total_cmp`
#[inline]
fn f32_total_cmp(a: f32, b: f32) -> Ordering {
    a.total_cmp(&b)
}

// ============================================================================
// TEMPERATURE
// ============================================================================

/// Air temperature in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Celsius(f32);

impl Eq for Celsius {}

impl PartialOrd for Celsius {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Celsius {
    fn cmp(&self, other: &Self) -> Ordering {
        f32_total_cmp(self.0, other.0)
    }
}

impl Deref for Celsius {
    type Target = f32;
    #[inline]
    fn deref(&self) -> &f32 {
        &self.0
    }
}

impl Celsius {
    /// Water freezing point
    pub const FREEZING: Celsius = Celsius(0.0);

    /// Temperature assumed when a reading carries none
    pub const ROOM: Celsius = Celsius(20.0);

    /// Create a new Celsius temperature
    #[inline]
    #[must_use]
    pub const fn new(value: f32) -> Self {
        Celsius(value)
    }

    /// Strictly below 0°C
    #[inline]
    pub fn is_below_freezing(self) -> bool {
        self.0 < Self::FREEZING.0
    }
}

impl fmt::Display for Celsius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°C", self.0)
    }
}

// ============================================================================
// WIND SPEED
// ============================================================================

/// Wind speed in kilometres per hour
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct KilometersPerHour(f32);

impl Eq for KilometersPerHour {}

impl PartialOrd for KilometersPerHour {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KilometersPerHour {
    fn cmp(&self, other: &Self) -> Ordering {
        f32_total_cmp(self.0, other.0)
    }
}

impl Deref for KilometersPerHour {
    type Target = f32;
    #[inline]
    fn deref(&self) -> &f32 {
        &self.0
    }
}

impl KilometersPerHour {
    /// No wind
    pub const CALM: KilometersPerHour = KilometersPerHour(0.0);

    /// Create a new wind speed
    #[inline]
    #[must_use]
    pub const fn new(value: f32) -> Self {
        KilometersPerHour(value)
    }
}

impl fmt::Display for KilometersPerHour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} km/h", self.0)
    }
}

// ============================================================================
// ENGINE TIME
// ============================================================================

/// Host-supplied time in whole milliseconds.
///
/// Used both as a timestamp and as a duration. Subtraction saturates at zero so
/// an out-of-order host clock can never underflow.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Millis(u64);

impl Deref for Millis {
    type Target = u64;
    #[inline]
    fn deref(&self) -> &u64 {
        &self.0
    }
}

impl Millis {
    /// Time origin, also used as "never" for event stamps
    pub const ZERO: Millis = Millis(0);

    /// Create from a raw millisecond count
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Millis(value)
    }

    /// Create from seconds, truncating to whole milliseconds
    #[inline]
    #[must_use]
    pub fn from_secs_f32(secs: f32) -> Self {
        Millis((secs.max(0.0) * 1000.0) as u64)
    }

    /// Convert to seconds
    #[inline]
    pub fn as_secs_f32(self) -> f32 {
        self.0 as f32 / 1000.0
    }

    /// `self - earlier`, clamped at zero
    #[inline]
    #[must_use]
    pub fn saturating_sub(self, earlier: Millis) -> Millis {
        Millis(self.0.saturating_sub(earlier.0))
    }
}

impl Add for Millis {
    type Output = Millis;
    fn add(self, rhs: Millis) -> Millis {
        Millis(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Millis {
    fn add_assign(&mut self, rhs: Millis) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Millis {
    type Output = Millis;
    fn sub(self, rhs: Millis) -> Millis {
        self.saturating_sub(rhs)
    }
}

impl fmt::Display for Millis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_celsius_ordering_and_freezing() {
        assert!(Celsius::new(-0.5).is_below_freezing());
        assert!(!Celsius::FREEZING.is_below_freezing());
        assert_eq!(Celsius::new(3.0).max(Celsius::new(-3.0)), Celsius::new(3.0));
        // NaN sorts above everything under total ordering
        assert!(Celsius::new(f32::NAN) > Celsius::new(1000.0));
    }

    #[test]
    fn test_millis_saturates() {
        let a = Millis::new(100);
        let b = Millis::new(250);
        assert_eq!(a - b, Millis::ZERO);
        assert_eq!(b - a, Millis::new(150));
        assert_eq!(Millis::new(u64::MAX) + a, Millis::new(u64::MAX));
    }

    #[test]
    fn test_millis_seconds_conversion() {
        assert_eq!(Millis::from_secs_f32(1.5), Millis::new(1500));
        assert_eq!(Millis::from_secs_f32(-2.0), Millis::ZERO);
        assert!((Millis::new(80).as_secs_f32() - 0.08).abs() < f32::EPSILON);
    }

    #[test]
    fn test_display() {
        assert_eq!(Celsius::new(21.04).to_string(), "21.0°C");
        assert_eq!(KilometersPerHour::new(35.0).to_string(), "35.0 km/h");
        assert_eq!(Millis::new(600).to_string(), "600ms");
    }
}
