//! Thunder strike triggering
//!
//! During a thunderstorm a check runs at a fixed cadence; each check strikes
//! with a fixed probability and publishes the strike through
//! [`WeatherStore::trigger_thunder`]. Consumers see the strike as a new stamp.

use super::{EffectContext, TimerEvent, TimerOwner};
use crate::core_types::units::Millis;
use crate::store::WeatherStore;
use rand::Rng;
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct ThunderScheduler {
    active: bool,
    checks: u64,
    strikes: u64,
}

impl ThunderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Follow the thunder gate: arm on a rising edge, tear down on a falling edge
    pub fn sync(&mut self, thunder: bool, ctx: &mut EffectContext<'_>) {
        match (self.active, thunder) {
            (false, true) => {
                ctx.timers.cancel_owner(TimerOwner::Thunder);
                self.active = true;
                info!("Thunder checks started");
                self.arm(ctx);
            }
            (true, false) => self.deactivate(ctx),
            _ => {}
        }
    }

    /// Tear down: no timer survives
    pub fn deactivate(&mut self, ctx: &mut EffectContext<'_>) {
        ctx.timers.cancel_owner(TimerOwner::Thunder);
        self.active = false;
    }

    /// Handle a fired `ThunderCheck` timer. Returns the published stamp on a strike.
    pub fn on_check(&mut self, ctx: &mut EffectContext<'_>, store: &mut WeatherStore) -> Option<Millis> {
        if !self.active {
            return None;
        }
        self.arm(ctx);
        self.checks += 1;

        let p = f64::from(ctx.config.thunder.strike_probability);
        if !ctx.rng.random_bool(p) {
            return None;
        }
        let stamp = store.trigger_thunder(ctx.now);
        self.strikes += 1;
        debug!(%stamp, strikes = self.strikes, "Thunder strike");
        Some(stamp)
    }

    fn arm(&mut self, ctx: &mut EffectContext<'_>) {
        let interval = ctx.config.thunder.check_interval;
        ctx.schedule_in(TimerOwner::Thunder, interval, TimerEvent::ThunderCheck);
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Checks performed so far
    pub fn checks(&self) -> u64 {
        self.checks
    }

    /// Strikes published so far
    pub fn strikes(&self) -> u64 {
        self.strikes
    }
}
