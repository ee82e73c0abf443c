//! Cursor kinematics
//!
//! Once per animation frame the simulator moves the cursor by exactly one of
//! three rules, checked in order:
//!
//! 1. **Frozen** - the freeze cycle holds a snapshot; render it, move nothing
//! 2. **Drift** - windy, pointer idle longer than the drift threshold; step
//!    along the wind direction at `base + wind / divisor` px per frame and
//!    record the step in the store's drift accumulator
//! 3. **Follow** - blend toward the pointer with a fixed coefficient, heavy in
//!    snow and sub-zero temperatures
//!
//! The freeze cycle, the lightning flash and the press pulse are timed
//! overlays; they only decide how the frame looks.

pub mod flash;
pub mod freeze;
pub mod simulator;

pub use flash::ThunderFlash;
pub use freeze::{FreezeCycle, FreezePhase};
pub use simulator::{CursorSimulator, StepInput};

use crate::core_types::vec2::Vec2;
use crate::core_types::weather::EffectConditions;
use serde::{Deserialize, Serialize};

/// Rule that produced a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CursorMode {
    Follow,
    Drift,
    Frozen,
}

impl CursorMode {
    /// Convert to u8 for FFI compatibility
    pub fn as_u8(self) -> u8 {
        match self {
            CursorMode::Follow => 0,
            CursorMode::Drift => 1,
            CursorMode::Frozen => 2,
        }
    }
}

/// Visual style of the cursor ring, one at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorAppearance {
    #[default]
    Default,
    /// Orange glow
    Hot,
    /// Blurred, translucent
    Foggy,
    /// Icy tint
    Snowy,
    /// Ice blue with a snowflake marker
    Frozen,
    /// Bright white, enlarged
    Flash,
}

impl CursorAppearance {
    /// Pick the style with the highest priority:
    /// flash, frozen, snowy, foggy, hot, default
    pub fn select(conditions: &EffectConditions, flash: bool, frozen: bool) -> Self {
        if flash {
            CursorAppearance::Flash
        } else if frozen {
            CursorAppearance::Frozen
        } else if conditions.snowy {
            CursorAppearance::Snowy
        } else if conditions.foggy {
            CursorAppearance::Foggy
        } else if conditions.hot {
            CursorAppearance::Hot
        } else {
            CursorAppearance::Default
        }
    }

    /// Convert to u8 for FFI compatibility
    pub fn as_u8(self) -> u8 {
        match self {
            CursorAppearance::Default => 0,
            CursorAppearance::Hot => 1,
            CursorAppearance::Foggy => 2,
            CursorAppearance::Snowy => 3,
            CursorAppearance::Frozen => 4,
            CursorAppearance::Flash => 5,
        }
    }
}

/// What the host renders for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorFrame {
    /// Rendered position (the snapshot while frozen)
    pub position: Vec2,
    pub mode: CursorMode,
    /// Follow coefficient in effect for the current conditions
    pub smoothing: f32,
    /// Lightning flash lit
    pub flash: bool,
    /// Press pulse active
    pub pressed: bool,
    pub appearance: CursorAppearance,
    /// Number of frames advanced so far
    pub frame: u64,
}
