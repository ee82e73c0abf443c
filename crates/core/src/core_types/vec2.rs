//! Vector type alias for viewport positions and directions.

use nalgebra::Vector2;

/// 2D vector type for positions, offsets, and directions.
///
/// This is a simple alias for `nalgebra::Vector2<f32>`, used throughout
/// the engine for pointer targets, cursor positions, wind vectors and
/// particle spawn points, all in viewport pixels.
pub type Vec2 = Vector2<f32>;
