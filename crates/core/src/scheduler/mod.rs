//! Timed effects and the virtual timer queue that drives them
//!
//! Every effect that needs to act "later" owns timers in a shared
//! [`TimerQueue`]. Activation always follows the same discipline: cancel every
//! timer the effect owns, then arm from a clean state. Teardown cancels every
//! owned timer. This keeps at most one live timer chain per effect however the
//! conditions flap.

pub mod thunder;
pub mod timer;
pub mod wind;

pub use thunder::ThunderScheduler;
pub use timer::{FiredTimer, TimerEvent, TimerId, TimerOwner, TimerQueue};
pub use wind::WindDirectionScheduler;

use crate::config::EffectsConfig;
use crate::core_types::units::Millis;
use rand::rngs::StdRng;

/// Everything a timed effect may touch while reacting to a state change or a
/// fired timer.
///
/// `now` is the logical time of the reaction: the caller's timestamp for state
/// changes, the due time for fired timers. Effects schedule relative to it so a
/// late tick never stretches a cadence.
pub struct EffectContext<'a> {
    pub now: Millis,
    pub timers: &'a mut TimerQueue,
    pub rng: &'a mut StdRng,
    pub config: &'a EffectsConfig,
}

impl EffectContext<'_> {
    /// Schedule `event` for `owner` at `now + delay`
    pub fn schedule_in(&mut self, owner: TimerOwner, delay: Millis, event: TimerEvent) -> Option<TimerId> {
        self.timers.schedule(owner, self.now + delay, event)
    }
}
