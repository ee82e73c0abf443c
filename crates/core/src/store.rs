//! Shared weather state with synchronous change notification
//!
//! [`WeatherStore`] is the only shared mutable resource in the engine. Each
//! field has exactly one writer path:
//!
//! - the reading comes from the external feed (`update` / `clear`)
//! - the wind direction comes from the wind scheduler (`set_wind_direction`)
//! - the thunder stamp comes from the thunder scheduler (`trigger_thunder`)
//! - the drift accumulator is advanced by the kinematics simulator and reset by
//!   every wind direction change
//!
//! Readers see every field as an immutable snapshot. Subscribers are notified
//! synchronously, in subscription order, after each mutation. Nothing here can
//! fail: malformed input is defaulted.
//!
//! # Thunder stamps
//!
//! Consumers detect a new strike by comparing the stamp with the last one they
//! saw, never through a flag, so an irregular poller cannot miss a strike. The
//! stamp strictly increases on every strike, even for several strikes within
//! one millisecond.

use crate::core_types::units::Millis;
use crate::core_types::vec2::Vec2;
use crate::core_types::weather::{WeatherInput, WeatherReading, WindDirection};
use std::fmt;

/// Change notification delivered to subscribers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StoreEvent {
    /// A new reading replaced the old one
    Reading(WeatherReading),
    /// The wind turned; drift was reset in the same step
    WindDirection(WindDirection),
    /// A thunder strike was published
    Thunder(Millis),
    /// The session ended and every field is back to its inert default
    Cleared,
}

/// Handle returned by [`WeatherStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&StoreEvent) + Send>;

struct Subscriber {
    id: SubscriptionId,
    callback: Callback,
}

/// Copy of every store field at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoreSnapshot {
    pub reading: WeatherReading,
    pub wind_direction: WindDirection,
    pub drift: Vec2,
    pub last_thunder: Millis,
}

/// Current weather reading, wind direction and thunder stamp
pub struct WeatherStore {
    reading: WeatherReading,
    wind_direction: WindDirection,
    /// Distance drifted along the current wind direction
    drift: Vec2,
    /// Last published strike; zero when none this session
    last_thunder: Millis,
    /// Highest stamp ever published; survives `clear`
    thunder_floor: Millis,
    subscribers: Vec<Subscriber>,
    next_subscription: u64,
}

impl Default for WeatherStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WeatherStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherStore")
            .field("reading", &self.reading)
            .field("wind_direction", &self.wind_direction)
            .field("drift", &self.drift)
            .field("last_thunder", &self.last_thunder)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

impl WeatherStore {
    /// Store holding the inert defaults
    pub fn new() -> Self {
        Self {
            reading: WeatherReading::inert(),
            wind_direction: WindDirection::default(),
            drift: Vec2::zeros(),
            last_thunder: Millis::ZERO,
            thunder_floor: Millis::ZERO,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Replace the reading. Missing or malformed fields are silently defaulted.
    pub fn update(&mut self, input: WeatherInput) {
        self.reading = WeatherReading::from_input(input);
        self.notify(StoreEvent::Reading(self.reading));
    }

    /// Replace the wind direction and reset drift in the same step
    pub fn set_wind_direction(&mut self, direction: WindDirection) {
        self.wind_direction = direction;
        self.drift = Vec2::zeros();
        self.notify(StoreEvent::WindDirection(direction));
    }

    /// Advance the drift accumulator. Only the kinematics simulator writes here.
    pub(crate) fn accumulate_drift(&mut self, step: Vec2) {
        self.drift += step;
    }

    /// Publish a strike at `now`, or one past the previous strike if the clock
    /// has not moved on. Returns the published stamp.
    pub fn trigger_thunder(&mut self, now: Millis) -> Millis {
        let next_after_floor = Millis::new(self.thunder_floor.saturating_add(1));
        let stamp = now.max(next_after_floor);
        self.thunder_floor = stamp;
        self.last_thunder = stamp;
        self.notify(StoreEvent::Thunder(stamp));
        stamp
    }

    /// End the session: every field returns to its inert default
    pub fn clear(&mut self) {
        self.reading = WeatherReading::inert();
        self.wind_direction = WindDirection::default();
        self.drift = Vec2::zeros();
        self.last_thunder = Millis::ZERO;
        self.notify(StoreEvent::Cleared);
    }

    /// Register a change listener
    ///
    /// # Example
    /// ```
    /// use std::sync::{Arc, Mutex};
    /// use weather_fx_core::{Millis, StoreEvent, WeatherStore};
    ///
    /// let seen = Arc::new(Mutex::new(Vec::new()));
    /// let sink = Arc::clone(&seen);
    ///
    /// let mut store = WeatherStore::new();
    /// store.subscribe(move |event| {
    ///     if let StoreEvent::Thunder(stamp) = event {
    ///         sink.lock().unwrap().push(*stamp);
    ///     }
    /// });
    /// store.trigger_thunder(Millis::new(10));
    /// store.trigger_thunder(Millis::new(10));
    ///
    /// assert_eq!(*seen.lock().unwrap(), vec![Millis::new(10), Millis::new(11)]);
    /// ```
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&StoreEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push(Subscriber {
            id,
            callback: Box::new(callback),
        });
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Current reading
    pub fn reading(&self) -> &WeatherReading {
        &self.reading
    }

    /// Current wind direction
    pub fn wind_direction(&self) -> WindDirection {
        self.wind_direction
    }

    /// Drift accumulated since the last direction change
    pub fn drift(&self) -> Vec2 {
        self.drift
    }

    /// Last published thunder stamp (zero when none this session)
    pub fn last_thunder(&self) -> Millis {
        self.last_thunder
    }

    /// Copy of every field
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            reading: self.reading,
            wind_direction: self.wind_direction,
            drift: self.drift,
            last_thunder: self.last_thunder,
        }
    }

    fn notify(&mut self, event: StoreEvent) {
        for subscriber in &mut self.subscribers {
            (subscriber.callback)(&event);
        }
    }
}
