//! Core types and utilities

pub mod feed;
pub mod units;
pub mod vec2;
pub mod weather;

pub use feed::FeedReading;
pub use units::*;
pub use vec2::Vec2;
pub use weather::*;
