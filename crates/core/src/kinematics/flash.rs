//! Cursor lightning flash
//!
//! A strike lights the cursor twice, shortly after the screen-wide flash has
//! finished. New strikes are detected by comparing the store's thunder stamp
//! with the last stamp seen here. A newer strike replaces any sequence still
//! pending.

use crate::core_types::units::Millis;
use crate::scheduler::{EffectContext, TimerEvent, TimerOwner};
use tracing::debug;

#[derive(Debug, Default)]
pub struct ThunderFlash {
    last_seen: Millis,
    lit: bool,
    sequences: u64,
}

impl ThunderFlash {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare the published stamp with the last one seen and schedule a
    /// sequence for a new strike.
    ///
    /// Outside a thunderstorm nothing flashes; the stamp is still tracked so a
    /// strike published before the storm started can never flash later.
    pub fn observe(&mut self, thunder: bool, stamp: Millis, ctx: &mut EffectContext<'_>) {
        if !thunder {
            if self.lit || ctx.timers.live_count(TimerOwner::ThunderFlash) > 0 {
                ctx.timers.cancel_owner(TimerOwner::ThunderFlash);
                self.lit = false;
            }
            self.last_seen = stamp;
            return;
        }
        if stamp == self.last_seen {
            return;
        }
        self.last_seen = stamp;
        if stamp == Millis::ZERO {
            return;
        }

        ctx.timers.cancel_owner(TimerOwner::ThunderFlash);
        self.lit = false;

        let flash = ctx.config.flash;
        let first = stamp + flash.delay;
        let mut start = first;
        for _ in 0..flash.pulses {
            ctx.timers.schedule(TimerOwner::ThunderFlash, start, TimerEvent::FlashOn);
            ctx.timers.schedule(TimerOwner::ThunderFlash, start + flash.pulse, TimerEvent::FlashOff);
            start += flash.spacing;
        }
        self.sequences += 1;
        debug!(%stamp, first = %first, pulses = flash.pulses, "Flash sequence scheduled");
    }

    pub fn on_flash(&mut self, on: bool) {
        self.lit = on;
    }

    /// Drop any pending sequence
    pub fn reset(&mut self, ctx: &mut EffectContext<'_>) {
        ctx.timers.cancel_owner(TimerOwner::ThunderFlash);
        self.lit = false;
    }

    /// Whether the cursor is lit right now
    pub fn is_lit(&self) -> bool {
        self.lit
    }

    pub fn last_seen(&self) -> Millis {
        self.last_seen
    }

    /// Number of sequences scheduled
    pub fn sequences(&self) -> u64 {
        self.sequences
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EffectsConfig;
    use crate::scheduler::TimerQueue;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn observe(flash: &mut ThunderFlash, timers: &mut TimerQueue, thunder: bool, stamp: u64) {
        let config = EffectsConfig::default();
        let mut rng = StdRng::seed_from_u64(0);
        let mut ctx = EffectContext {
            now: Millis::new(stamp),
            timers,
            rng: &mut rng,
            config: &config,
        };
        flash.observe(thunder, Millis::new(stamp), &mut ctx);
    }

    fn drain(flash: &mut ThunderFlash, timers: &mut TimerQueue) -> Vec<(u64, bool)> {
        let mut edges = Vec::new();
        while let Some(fired) = timers.pop_due(Millis::new(u64::MAX)) {
            let on = fired.event == TimerEvent::FlashOn;
            flash.on_flash(on);
            edges.push((*fired.due, on));
        }
        edges
    }

    #[test]
    fn test_double_pulse_after_delay() {
        let mut flash = ThunderFlash::new();
        let mut timers = TimerQueue::default();
        observe(&mut flash, &mut timers, true, 10_000);

        assert_eq!(timers.live_count(TimerOwner::ThunderFlash), 4);
        let edges = drain(&mut flash, &mut timers);
        assert_eq!(
            edges,
            vec![(10_600, true), (10_650, false), (10_700, true), (10_750, false)]
        );
        assert!(!flash.is_lit());
        assert!(timers.is_empty());
    }

    #[test]
    fn test_same_stamp_flashes_once() {
        let mut flash = ThunderFlash::new();
        let mut timers = TimerQueue::default();
        observe(&mut flash, &mut timers, true, 500);
        observe(&mut flash, &mut timers, true, 500);
        assert_eq!(flash.sequences(), 1);
        assert_eq!(timers.live_count(TimerOwner::ThunderFlash), 4);
    }

    #[test]
    fn test_newer_strike_replaces_pending() {
        let mut flash = ThunderFlash::new();
        let mut timers = TimerQueue::default();
        observe(&mut flash, &mut timers, true, 1000);
        observe(&mut flash, &mut timers, true, 1200);
        assert_eq!(flash.sequences(), 2);
        assert_eq!(timers.live_count(TimerOwner::ThunderFlash), 4);
        assert_eq!(timers.next_due(), Some(Millis::new(1800)));
    }

    #[test]
    fn test_stale_strike_never_flashes() {
        let mut flash = ThunderFlash::new();
        let mut timers = TimerQueue::default();
        // strike published while the storm gate was off
        observe(&mut flash, &mut timers, false, 3000);
        observe(&mut flash, &mut timers, true, 3000);
        assert_eq!(flash.sequences(), 0);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_storm_ending_cancels_sequence() {
        let mut flash = ThunderFlash::new();
        let mut timers = TimerQueue::default();
        observe(&mut flash, &mut timers, true, 3000);
        flash.on_flash(true);
        observe(&mut flash, &mut timers, false, 3000);
        assert!(!flash.is_lit());
        assert_eq!(timers.live_count(TimerOwner::ThunderFlash), 0);
    }
}
