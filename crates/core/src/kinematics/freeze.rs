//! Periodic cursor freeze in sub-zero weather
//!
//! ```text
//! Idle ──cold──▶ Armed ──first delay──▶ Frozen ──hold──▶ Armed ──cooldown──▶ Frozen …
//!   ▲                                                                          │
//!   └──────────────────────────── not cold (from any phase) ───────────────────┘
//! ```
//!
//! Freezing snapshots the cursor position; the simulator renders the snapshot
//! until the hold expires. Leaving the cold condition cancels every pending
//! freeze timer and forces `Idle`, so a thaw never leaves a stale timer behind.

use crate::core_types::vec2::Vec2;
use crate::scheduler::{EffectContext, TimerEvent, TimerOwner};
use tracing::debug;

/// Freeze state machine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FreezePhase {
    /// Not cold; nothing scheduled
    #[default]
    Idle,
    /// Cold; waiting to freeze
    Armed,
    /// Cursor pinned to the snapshot
    Frozen,
}

#[derive(Debug, Default)]
pub struct FreezeCycle {
    phase: FreezePhase,
    snapshot: Option<Vec2>,
    completed: u64,
}

impl FreezeCycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Follow the freezing gate
    pub fn sync(&mut self, freezing: bool, ctx: &mut EffectContext<'_>) {
        match (self.phase, freezing) {
            (FreezePhase::Idle, true) => {
                ctx.timers.cancel_owner(TimerOwner::Freeze);
                let delay = ctx.config.freeze.first_delay.sample(ctx.rng);
                if ctx.schedule_in(TimerOwner::Freeze, delay, TimerEvent::FreezeEngage).is_some() {
                    self.phase = FreezePhase::Armed;
                    debug!(first_in = %delay, "Freeze armed");
                }
            }
            (FreezePhase::Armed | FreezePhase::Frozen, false) => self.reset(ctx),
            _ => {}
        }
    }

    /// Cancel everything and return to `Idle`
    pub fn reset(&mut self, ctx: &mut EffectContext<'_>) {
        ctx.timers.cancel_owner(TimerOwner::Freeze);
        if self.phase != FreezePhase::Idle {
            debug!(from = ?self.phase, "Freeze cycle stopped");
        }
        self.phase = FreezePhase::Idle;
        self.snapshot = None;
    }

    /// Armed timer fired: pin the cursor where it is
    pub fn on_engage(&mut self, ctx: &mut EffectContext<'_>, position: Vec2) {
        if self.phase != FreezePhase::Armed {
            return;
        }
        let hold = ctx.config.freeze.hold.sample(ctx.rng);
        self.phase = FreezePhase::Frozen;
        self.snapshot = Some(position);
        ctx.schedule_in(TimerOwner::Freeze, hold, TimerEvent::FreezeRelease);
        debug!(x = position.x, y = position.y, hold = %hold, "Cursor frozen");
    }

    /// Hold expired: thaw and wait for the next freeze
    pub fn on_release(&mut self, ctx: &mut EffectContext<'_>) {
        if self.phase != FreezePhase::Frozen {
            return;
        }
        let cooldown = ctx.config.freeze.cooldown.sample(ctx.rng);
        self.phase = FreezePhase::Armed;
        self.snapshot = None;
        self.completed += 1;
        ctx.schedule_in(TimerOwner::Freeze, cooldown, TimerEvent::FreezeEngage);
        debug!(next_in = %cooldown, "Cursor thawed");
    }

    pub fn phase(&self) -> FreezePhase {
        self.phase
    }

    /// Position the cursor is pinned to while frozen
    pub fn frozen_at(&self) -> Option<Vec2> {
        self.snapshot
    }

    /// Number of freezes that ran their full hold
    pub fn completed(&self) -> u64 {
        self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EffectsConfig;
    use crate::core_types::units::Millis;
    use crate::scheduler::TimerQueue;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Harness {
        timers: TimerQueue,
        rng: StdRng,
        config: EffectsConfig,
        freeze: FreezeCycle,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                timers: TimerQueue::default(),
                rng: StdRng::seed_from_u64(5),
                config: EffectsConfig::default(),
                freeze: FreezeCycle::new(),
            }
        }

        fn ctx(&mut self, now: Millis) -> EffectContext<'_> {
            EffectContext {
                now,
                timers: &mut self.timers,
                rng: &mut self.rng,
                config: &self.config,
            }
        }

        fn sync(&mut self, freezing: bool, now: u64) {
            let mut freeze = std::mem::take(&mut self.freeze);
            freeze.sync(freezing, &mut self.ctx(Millis::new(now)));
            self.freeze = freeze;
        }

        /// Fire the next freeze timer; returns its due time
        fn fire_next(&mut self, position: Vec2) -> Millis {
            let fired = self
                .timers
                .pop_due(Millis::new(u64::MAX))
                .expect("a freeze timer is pending");
            let mut freeze = std::mem::take(&mut self.freeze);
            let mut ctx = self.ctx(fired.due);
            match fired.event {
                TimerEvent::FreezeEngage => freeze.on_engage(&mut ctx, position),
                TimerEvent::FreezeRelease => freeze.on_release(&mut ctx),
                other => panic!("unexpected event {other:?}"),
            }
            self.freeze = freeze;
            fired.due
        }
    }

    #[test]
    fn test_full_cycle_timings() {
        let mut h = Harness::new();
        h.sync(true, 0);
        assert_eq!(h.freeze.phase(), FreezePhase::Armed);

        let engaged = h.fire_next(Vec2::new(10.0, 20.0));
        assert!((1000..=2000).contains(&*engaged));
        assert_eq!(h.freeze.phase(), FreezePhase::Frozen);
        assert_eq!(h.freeze.frozen_at(), Some(Vec2::new(10.0, 20.0)));

        let thawed = h.fire_next(Vec2::zeros());
        assert!((3000..=5000).contains(&*(thawed - engaged)));
        assert_eq!(h.freeze.phase(), FreezePhase::Armed);
        assert_eq!(h.freeze.frozen_at(), None);
        assert_eq!(h.freeze.completed(), 1);

        let again = h.fire_next(Vec2::new(1.0, 1.0));
        assert!((5000..=8000).contains(&*(again - thawed)));
        assert_eq!(h.freeze.phase(), FreezePhase::Frozen);
        assert_eq!(h.timers.live_count(TimerOwner::Freeze), 1);
    }

    #[test]
    fn test_leaving_cold_forces_idle() {
        let mut h = Harness::new();
        h.sync(true, 0);
        h.fire_next(Vec2::zeros());
        assert_eq!(h.freeze.phase(), FreezePhase::Frozen);

        h.sync(false, 2500);
        assert_eq!(h.freeze.phase(), FreezePhase::Idle);
        assert_eq!(h.freeze.frozen_at(), None);
        assert_eq!(h.timers.live_count(TimerOwner::Freeze), 0);
    }

    #[test]
    fn test_stale_events_are_ignored() {
        let mut h = Harness::new();
        let mut ctx = h.ctx(Millis::new(10));
        let mut freeze = FreezeCycle::new();
        freeze.on_engage(&mut ctx, Vec2::zeros());
        freeze.on_release(&mut ctx);
        assert_eq!(freeze.phase(), FreezePhase::Idle);
        assert!(h.timers.is_empty());
    }

    #[test]
    fn test_no_timers_stays_idle() {
        let mut h = Harness::new();
        h.timers = TimerQueue::new(false);
        h.sync(true, 0);
        assert_eq!(h.freeze.phase(), FreezePhase::Idle);
    }
}
