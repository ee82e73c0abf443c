//! Weather Effects Core Library
//!
//! Simulates the interactive layer of a live-weather page: a custom cursor
//! whose motion reacts to the current conditions, plus the particle fields
//! drawn around it.
//!
//! - Cursor follows the pointer with normal or heavy lag, drifts with the wind
//!   when the pointer rests, freezes periodically below zero and flashes after
//!   lightning strikes
//! - Timed events: wind direction changes and random thunder strikes
//! - Particle trails shed from the cursor (rain, condensation) and screen-wide
//!   ambient fields (rain, snow, wind streaks)
//!
//! The host supplies every timestamp and renders the output. All randomness
//! comes from one seedable generator, so a seeded run is reproducible.

// Core types and utilities
pub mod core_types;

pub mod config;
pub mod engine;
pub mod kinematics;
pub mod particles;
pub mod scheduler;
pub mod store;

// Re-export core types
pub use core_types::{Celsius, FeedReading, KilometersPerHour, Millis, Vec2};
pub use core_types::{EffectConditions, ViewMode, WeatherInput, WeatherReading, WeatherType, WindDirection};

// Re-export engine types
pub use config::{ConfigError, EffectsConfig, HostCapabilities};
pub use engine::{EffectsEngine, EngineCue};
pub use kinematics::{CursorAppearance, CursorFrame, CursorMode, FreezePhase};
pub use particles::{AmbientKind, AmbientParticle, AmbientSnapshot, ParticleId, TrailKind, TrailParticle};
pub use scheduler::TimerOwner;
pub use store::{StoreEvent, StoreSnapshot, SubscriptionId, WeatherStore};
