//! Effects engine
//!
//! [`EffectsEngine`] owns the store, the timer queue, the random source and
//! every effect. The host drives it with timestamps; nothing here reads a
//! clock, so a run is fully determined by its inputs and the seed.
//!
//! Every entry point that can change a condition re-evaluates the gates before
//! it returns. An effect whose condition went false has cancelled all of its
//! timers by then; an effect whose condition went true has cancelled anything
//! it owned and armed from a clean state.

use crate::config::{ConfigError, EffectsConfig};
use crate::core_types::feed::FeedReading;
use crate::core_types::units::Millis;
use crate::core_types::weather::{EffectConditions, WeatherInput};
use crate::kinematics::{CursorFrame, CursorSimulator, FreezeCycle, FreezePhase, StepInput, ThunderFlash};
use crate::particles::{
    AmbientPools, AmbientSnapshot, BoundedQueue, ParticleIds, TrailEmitter, TrailKind, TrailParticle,
};
use crate::scheduler::{
    EffectContext, FiredTimer, ThunderScheduler, TimerEvent, TimerOwner, TimerQueue, WindDirectionScheduler,
};
use crate::store::{StoreEvent, SubscriptionId, WeatherStore};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

/// Side effect the host should perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCue {
    /// Play a thunder sound for the strike published at `at`
    ThunderAudio { at: Millis },
}

/// Timers, randomness and constants shared by every effect
struct Runtime {
    timers: TimerQueue,
    rng: StdRng,
    config: EffectsConfig,
}

impl Runtime {
    fn ctx(&mut self, now: Millis) -> EffectContext<'_> {
        EffectContext {
            now,
            timers: &mut self.timers,
            rng: &mut self.rng,
            config: &self.config,
        }
    }
}

/// Weather-driven cursor and particle effects
///
/// # Example
/// ```
/// use weather_fx_core::{EffectsConfig, EffectsEngine, Millis, WeatherInput, WeatherType};
///
/// let mut engine = EffectsEngine::new(EffectsConfig::seeded(1)).unwrap();
/// engine.update_weather(WeatherInput::active(24.0, 5.0, WeatherType::Rain), Millis::new(0));
/// engine.pointer_moved(200.0, 120.0, Millis::new(0));
///
/// for t in (16..=1600).step_by(16) {
///     engine.tick(Millis::new(t));
/// }
/// assert!(engine.conditions().raining);
/// assert_eq!(engine.trail(weather_fx_core::TrailKind::Precipitation).len(), 15);
/// ```
pub struct EffectsEngine {
    rt: Runtime,
    store: WeatherStore,
    ids: ParticleIds,
    conditions: EffectConditions,
    suppressed: bool,
    sound_enabled: bool,
    /// Latest timestamp seen; earlier ones are clamped to it
    now: Millis,
    cursor: CursorSimulator,
    freeze: FreezeCycle,
    flash: ThunderFlash,
    wind: WindDirectionScheduler,
    thunder: ThunderScheduler,
    precipitation: TrailEmitter,
    condensation: TrailEmitter,
    ambient: Option<AmbientPools>,
    cues: Vec<EngineCue>,
}

impl EffectsEngine {
    /// Create an engine with no weather session
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found by [`EffectsConfig::validate`].
    pub fn new(config: EffectsConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        info!(
            seed = ?config.seed,
            timers = config.host.timers,
            animation_frames = config.host.animation_frames,
            "Effects engine created"
        );

        Ok(Self {
            store: WeatherStore::new(),
            ids: ParticleIds::default(),
            conditions: EffectConditions::default(),
            suppressed: false,
            sound_enabled: false,
            now: Millis::ZERO,
            cursor: CursorSimulator::default(),
            freeze: FreezeCycle::new(),
            flash: ThunderFlash::new(),
            wind: WindDirectionScheduler::new(),
            thunder: ThunderScheduler::new(),
            precipitation: TrailEmitter::new(TrailKind::Precipitation, config.precipitation),
            condensation: TrailEmitter::new(TrailKind::Condensation, config.condensation),
            ambient: None,
            cues: Vec::new(),
            rt: Runtime {
                timers: TimerQueue::new(config.host.timers),
                rng,
                config,
            },
        })
    }

    // ------------------------------------------------------------------
    // Inputs
    // ------------------------------------------------------------------

    /// Replace the weather reading. Missing fields are defaulted.
    pub fn update_weather(&mut self, input: WeatherInput, now: Millis) {
        let now = self.advance_clock(now);
        let was_active = self.store.reading().is_active();
        self.store.update(input);

        let reading = self.store.reading();
        if reading.is_active() && !was_active {
            info!(
                temperature = %reading.temperature(),
                wind = %reading.wind_speed(),
                kind = %reading.weather_type(),
                "Weather session started"
            );
        }
        self.resync(now);
    }

    /// Replace the weather reading with a parsed service payload
    pub fn update_from_feed(&mut self, feed: FeedReading, now: Millis) {
        self.update_weather(feed.into_input(), now);
    }

    /// End the weather session: every effect stops and the ambient fields are dropped
    pub fn clear_weather(&mut self, now: Millis) {
        let now = self.advance_clock(now);
        self.store.clear();
        self.ambient = None;
        self.resync(now);
        info!("Weather session cleared");
    }

    /// Host-level switch that turns every effect off without ending the session
    pub fn set_suppressed(&mut self, suppressed: bool, now: Millis) {
        let now = self.advance_clock(now);
        if self.suppressed != suppressed {
            debug!(suppressed, "Suppression changed");
        }
        self.suppressed = suppressed;
        self.resync(now);
    }

    /// Emit [`EngineCue::ThunderAudio`] on strikes
    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.sound_enabled = enabled;
    }

    /// Pointer sample. Non-finite coordinates are ignored.
    pub fn pointer_moved(&mut self, x: f32, y: f32, now: Millis) {
        let now = self.advance_clock(now);
        self.cursor.pointer_moved(x, y, now);
    }

    /// Pointer press: the cursor shows its pressed state briefly
    pub fn pointer_pressed(&mut self, now: Millis) {
        let now = self.advance_clock(now);
        let mut ctx = self.rt.ctx(now);
        self.cursor.press(&mut ctx);
    }

    /// Advance to `now`: fire due timers, re-evaluate conditions and move the cursor
    pub fn tick(&mut self, now: Millis) -> CursorFrame {
        let now = self.advance_clock(now);
        while let Some(fired) = self.rt.timers.pop_due(now) {
            self.dispatch(fired);
        }
        self.resync(now);

        let input = StepInput {
            now,
            conditions: &self.conditions,
            config: &self.rt.config.kinematics,
            frozen_at: self.freeze.frozen_at(),
            flash: self.flash.is_lit(),
            animate: self.rt.config.host.animation_frames,
        };
        self.cursor.step(input, &mut self.store)
    }

    /// Cancel every timer and stop every effect
    pub fn shutdown(&mut self) {
        let now = self.now;
        let mut ctx = self.rt.ctx(now);
        self.wind.deactivate(&mut ctx);
        self.thunder.deactivate(&mut ctx);
        self.freeze.reset(&mut ctx);
        self.flash.reset(&mut ctx);
        self.precipitation.deactivate(&mut ctx);
        self.condensation.deactivate(&mut ctx);
        self.cursor.release();
        let leftover = self.rt.timers.len();
        self.rt.timers.clear();
        self.conditions = EffectConditions::default();
        info!(leftover, "Effects engine shut down");
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn advance_clock(&mut self, now: Millis) -> Millis {
        self.now = self.now.max(now);
        self.now
    }

    fn dispatch(&mut self, fired: FiredTimer) {
        let mut ctx = self.rt.ctx(fired.due);
        match fired.event {
            TimerEvent::WindShift => self.wind.on_shift(&mut ctx, &mut self.store),
            TimerEvent::ThunderCheck => {
                if let Some(stamp) = self.thunder.on_check(&mut ctx, &mut self.store) {
                    if self.sound_enabled {
                        self.cues.push(EngineCue::ThunderAudio { at: stamp });
                    }
                    self.flash.observe(self.conditions.thunder, stamp, &mut ctx);
                }
            }
            TimerEvent::FreezeEngage => self.freeze.on_engage(&mut ctx, self.cursor.position()),
            TimerEvent::FreezeRelease => self.freeze.on_release(&mut ctx),
            TimerEvent::FlashOn => self.flash.on_flash(true),
            TimerEvent::FlashOff => self.flash.on_flash(false),
            TimerEvent::TrailSpawn(kind) => {
                let emitter = match kind {
                    TrailKind::Precipitation => &mut self.precipitation,
                    TrailKind::Condensation => &mut self.condensation,
                };
                emitter.on_spawn(&mut ctx, self.cursor.position(), &mut self.ids);
            }
            TimerEvent::PressRelease => self.cursor.release(),
        }
    }

    fn resync(&mut self, now: Millis) {
        let conditions = EffectConditions::evaluate(self.store.reading(), self.suppressed);
        if conditions != self.conditions {
            debug!(?conditions, "Effect conditions changed");
        }
        self.conditions = conditions;

        if conditions.enabled && self.ambient.is_none() {
            let pools = AmbientPools::generate(&self.rt.config.ambient, &mut self.rt.rng, &mut self.ids, now);
            self.ambient = Some(pools);
            debug!("Ambient fields generated");
        }

        let mut ctx = self.rt.ctx(now);
        self.wind.sync(conditions.windy, &mut ctx, &mut self.store);
        self.thunder.sync(conditions.thunder, &mut ctx);
        self.freeze.sync(conditions.freezing, &mut ctx);
        self.precipitation.sync(conditions.raining, &mut ctx);
        self.condensation.sync(conditions.hot, &mut ctx);
        self.flash.observe(conditions.thunder, self.store.last_thunder(), &mut ctx);
    }

    // ------------------------------------------------------------------
    // Readers
    // ------------------------------------------------------------------

    pub fn store(&self) -> &WeatherStore {
        &self.store
    }

    /// Register a store listener
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&StoreEvent) + Send + 'static,
    {
        self.store.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Gates as of the last state change or tick
    pub fn conditions(&self) -> &EffectConditions {
        &self.conditions
    }

    pub fn last_frame(&self) -> Option<&CursorFrame> {
        self.cursor.last_frame()
    }

    /// Live trail particles, oldest first
    pub fn trail(&self, kind: TrailKind) -> &BoundedQueue<TrailParticle> {
        match kind {
            TrailKind::Precipitation => self.precipitation.particles(),
            TrailKind::Condensation => self.condensation.particles(),
        }
    }

    /// Ambient fields whose condition currently holds
    pub fn ambient(&self) -> AmbientSnapshot<'_> {
        self.ambient
            .as_ref()
            .map(|pools| pools.snapshot(&self.conditions))
            .unwrap_or_default()
    }

    /// The session's ambient fields, visible or not
    pub fn ambient_pools(&self) -> Option<&AmbientPools> {
        self.ambient.as_ref()
    }

    pub fn freeze_phase(&self) -> FreezePhase {
        self.freeze.phase()
    }

    /// Freezes that ran their full hold
    pub fn freezes_completed(&self) -> u64 {
        self.freeze.completed()
    }

    /// Strikes published by the thunder scheduler
    pub fn thunder_strikes(&self) -> u64 {
        self.thunder.strikes()
    }

    /// Pending timers owned by one effect
    pub fn live_timers(&self, owner: TimerOwner) -> usize {
        self.rt.timers.live_count(owner)
    }

    /// All pending timers
    pub fn pending_timers(&self) -> usize {
        self.rt.timers.len()
    }

    /// Due time of the next pending timer
    pub fn next_due(&self) -> Option<Millis> {
        self.rt.timers.next_due()
    }

    /// Take the cues emitted since the last call
    pub fn drain_cues(&mut self) -> Vec<EngineCue> {
        std::mem::take(&mut self.cues)
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Latest timestamp seen
    pub fn now(&self) -> Millis {
        self.now
    }

    pub fn config(&self) -> &EffectsConfig {
        &self.rt.config
    }
}
