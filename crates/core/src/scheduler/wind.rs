//! Wind direction rotation
//!
//! While it is windy the wind turns to one of the eight compass directions
//! straight away and then again after a random interval, re-drawn after every
//! change. Each change goes through [`WeatherStore::set_wind_direction`], which
//! resets the drift accumulator in the same step so drifting never jumps.

use super::{EffectContext, TimerEvent, TimerOwner};
use crate::core_types::weather::WindDirection;
use crate::store::WeatherStore;
use rand::Rng;
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct WindDirectionScheduler {
    active: bool,
    changes: u64,
}

impl WindDirectionScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Follow the windy gate: arm on a rising edge, tear down on a falling edge
    pub fn sync(&mut self, windy: bool, ctx: &mut EffectContext<'_>, store: &mut WeatherStore) {
        match (self.active, windy) {
            (false, true) => self.activate(ctx, store),
            (true, false) => self.deactivate(ctx),
            _ => {}
        }
    }

    fn activate(&mut self, ctx: &mut EffectContext<'_>, store: &mut WeatherStore) {
        ctx.timers.cancel_owner(TimerOwner::WindDirection);
        self.active = true;
        info!("Wind rotation started");
        self.shift(ctx, store);
    }

    /// Tear down: no timer survives
    pub fn deactivate(&mut self, ctx: &mut EffectContext<'_>) {
        let cancelled = ctx.timers.cancel_owner(TimerOwner::WindDirection);
        if self.active {
            debug!(cancelled, "Wind rotation stopped");
        }
        self.active = false;
    }

    /// Handle a fired `WindShift` timer
    pub fn on_shift(&mut self, ctx: &mut EffectContext<'_>, store: &mut WeatherStore) {
        if self.active {
            self.shift(ctx, store);
        }
    }

    fn shift(&mut self, ctx: &mut EffectContext<'_>, store: &mut WeatherStore) {
        let compass = WindDirection::COMPASS;
        let direction = compass[ctx.rng.random_range(0..compass.len())];
        store.set_wind_direction(direction);
        self.changes += 1;

        let delay = ctx.config.wind.interval.sample(ctx.rng);
        let next = ctx.schedule_in(TimerOwner::WindDirection, delay, TimerEvent::WindShift);
        debug!(
            x = direction.x(),
            y = direction.y(),
            next_in = %delay,
            rescheduled = next.is_some(),
            "Wind direction changed"
        );
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Number of direction changes published so far
    pub fn changes(&self) -> u64 {
        self.changes
    }
}
