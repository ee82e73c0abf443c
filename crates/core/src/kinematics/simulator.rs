use super::{CursorAppearance, CursorFrame, CursorMode};
use crate::config::KinematicsConfig;
use crate::core_types::units::Millis;
use crate::core_types::vec2::Vec2;
use crate::core_types::weather::EffectConditions;
use crate::scheduler::{EffectContext, TimerEvent, TimerOwner};
use crate::store::WeatherStore;

/// Per-tick inputs the simulator does not own
#[derive(Debug, Clone, Copy)]
pub struct StepInput<'a> {
    pub now: Millis,
    pub conditions: &'a EffectConditions,
    pub config: &'a KinematicsConfig,
    /// Snapshot to render while the freeze cycle holds the cursor
    pub frozen_at: Option<Vec2>,
    /// Lightning flash currently lit
    pub flash: bool,
    /// Host provides per-frame callbacks
    pub animate: bool,
}

/// Smoothed cursor that follows the pointer and drifts with the wind
#[derive(Debug, Clone)]
pub struct CursorSimulator {
    position: Vec2,
    target: Vec2,
    last_input: Option<Millis>,
    pressed: bool,
    frame: u64,
    last_frame: Option<CursorFrame>,
}

impl Default for CursorSimulator {
    fn default() -> Self {
        Self::new(Vec2::zeros())
    }
}

impl CursorSimulator {
    pub fn new(origin: Vec2) -> Self {
        Self {
            position: origin,
            target: origin,
            last_input: None,
            pressed: false,
            frame: 0,
            last_frame: None,
        }
    }

    /// Record a pointer sample. Non-finite coordinates are dropped.
    pub fn pointer_moved(&mut self, x: f32, y: f32, now: Millis) -> bool {
        if !x.is_finite() || !y.is_finite() {
            return false;
        }
        self.target = Vec2::new(x, y);
        self.last_input = Some(now);
        true
    }

    /// Start a press pulse. Without timers there is no way to end it, so the
    /// press is not shown at all.
    pub fn press(&mut self, ctx: &mut EffectContext<'_>) {
        ctx.timers.cancel_owner(TimerOwner::PressPulse);
        let pulse = ctx.config.kinematics.press_pulse;
        self.pressed = ctx
            .schedule_in(TimerOwner::PressPulse, pulse, TimerEvent::PressRelease)
            .is_some();
    }

    pub fn release(&mut self) {
        self.pressed = false;
    }

    /// Advance one animation frame
    pub fn step(&mut self, input: StepInput<'_>, store: &mut WeatherStore) -> CursorFrame {
        let k = input.config;
        let c = input.conditions;

        let idle = self.last_input.map(|t| input.now.saturating_sub(t));
        let moving = idle.is_some_and(|i| i < k.moving_window);
        let idle_long = idle.is_none_or(|i| i > k.drift_idle);

        let smoothing = if c.heavy_lag {
            k.heavy_smoothing
        } else {
            k.follow_smoothing
        };

        let (mode, rendered) = if let Some(frozen) = input.frozen_at {
            (CursorMode::Frozen, frozen)
        } else if c.windy && !moving && idle_long {
            if input.animate {
                let speed = k.drift_speed(*store.reading().wind_speed());
                let step = store.wind_direction().as_vec2() * speed;
                self.position += step;
                store.accumulate_drift(step);
            }
            (CursorMode::Drift, self.position)
        } else {
            if input.animate {
                self.position += (self.target - self.position) * smoothing;
            }
            (CursorMode::Follow, self.position)
        };

        if input.animate {
            self.frame += 1;
        }

        let frame = CursorFrame {
            position: rendered,
            mode,
            smoothing,
            flash: input.flash,
            pressed: self.pressed,
            appearance: CursorAppearance::select(c, input.flash, mode == CursorMode::Frozen),
            frame: self.frame,
        };
        self.last_frame = Some(frame);
        frame
    }

    /// Live position (not the frozen snapshot)
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Last pointer position
    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn last_input(&self) -> Option<Millis> {
        self.last_input
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn last_frame(&self) -> Option<&CursorFrame> {
        self.last_frame.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::weather::{WeatherInput, WeatherReading, WeatherType, WindDirection};
    use approx::assert_relative_eq;

    fn conditions(input: WeatherInput) -> EffectConditions {
        EffectConditions::evaluate(&WeatherReading::from_input(input), false)
    }

    fn step(sim: &mut CursorSimulator, store: &mut WeatherStore, now: u64) -> CursorFrame {
        let c = EffectConditions::evaluate(store.reading(), false);
        let k = KinematicsConfig::default();
        sim.step(
            StepInput {
                now: Millis::new(now),
                conditions: &c,
                config: &k,
                frozen_at: None,
                flash: false,
                animate: true,
            },
            store,
        )
    }

    #[test]
    fn test_follow_converges_geometrically() {
        let mut store = WeatherStore::new();
        let mut sim = CursorSimulator::default();
        sim.pointer_moved(100.0, 0.0, Millis::ZERO);

        let first = step(&mut sim, &mut store, 16);
        assert_eq!(first.mode, CursorMode::Follow);
        assert_relative_eq!(first.smoothing, 0.15);
        assert_relative_eq!(first.position.x, 15.0, epsilon = 1e-4);

        let second = step(&mut sim, &mut store, 32);
        assert_relative_eq!(second.position.x, 15.0 + 85.0 * 0.15, epsilon = 1e-4);
    }

    #[test]
    fn test_heavy_lag_in_snow() {
        let mut store = WeatherStore::new();
        store.update(WeatherInput::active(-5.0, 0.0, WeatherType::Snow));
        let mut sim = CursorSimulator::default();
        sim.pointer_moved(100.0, 0.0, Millis::ZERO);
        let frame = step(&mut sim, &mut store, 16);
        assert_relative_eq!(frame.smoothing, 0.02);
        assert_relative_eq!(frame.position.x, 2.0, epsilon = 1e-4);
        assert_eq!(frame.appearance, CursorAppearance::Snowy);
    }

    #[test]
    fn test_drift_after_idle() {
        let mut store = WeatherStore::new();
        store.update(WeatherInput::active(10.0, 50.0, WeatherType::Clear));
        store.set_wind_direction(WindDirection::WEST);

        let mut sim = CursorSimulator::new(Vec2::new(500.0, 500.0));
        sim.pointer_moved(500.0, 500.0, Millis::ZERO);

        // still inside the idle window
        assert_eq!(step(&mut sim, &mut store, 200).mode, CursorMode::Follow);

        let frame = step(&mut sim, &mut store, 400);
        assert_eq!(frame.mode, CursorMode::Drift);
        // 0.3 + 50 / 50
        assert_relative_eq!(frame.position.x, 500.0 - 1.3, epsilon = 1e-4);
        assert_relative_eq!(store.drift().x, -1.3, epsilon = 1e-4);
    }

    #[test]
    fn test_drift_without_any_input() {
        let mut store = WeatherStore::new();
        store.update(WeatherInput::active(10.0, 25.0, WeatherType::Clear));
        let mut sim = CursorSimulator::default();
        assert_eq!(step(&mut sim, &mut store, 0).mode, CursorMode::Drift);
    }

    #[test]
    fn test_non_finite_input_ignored() {
        let mut sim = CursorSimulator::default();
        assert!(!sim.pointer_moved(f32::NAN, 1.0, Millis::new(5)));
        assert!(!sim.pointer_moved(1.0, f32::INFINITY, Millis::new(5)));
        assert_eq!(sim.target(), Vec2::zeros());
        assert_eq!(sim.last_input(), None);
    }

    #[test]
    fn test_frozen_renders_snapshot() {
        let mut store = WeatherStore::new();
        let mut sim = CursorSimulator::default();
        sim.pointer_moved(100.0, 100.0, Millis::ZERO);
        let c = conditions(WeatherInput::active(-3.0, 0.0, WeatherType::Clear));
        let k = KinematicsConfig::default();
        let frame = sim.step(
            StepInput {
                now: Millis::new(16),
                conditions: &c,
                config: &k,
                frozen_at: Some(Vec2::new(7.0, 8.0)),
                flash: false,
                animate: true,
            },
            &mut store,
        );
        assert_eq!(frame.mode, CursorMode::Frozen);
        assert_eq!(frame.position, Vec2::new(7.0, 8.0));
        assert_eq!(frame.appearance, CursorAppearance::Frozen);
        // the live position does not advance while frozen
        assert_eq!(sim.position(), Vec2::zeros());
    }

    #[test]
    fn test_no_animation_frames_holds_position() {
        let mut store = WeatherStore::new();
        let mut sim = CursorSimulator::default();
        sim.pointer_moved(100.0, 0.0, Millis::ZERO);
        let c = EffectConditions::default();
        let k = KinematicsConfig::default();
        let frame = sim.step(
            StepInput {
                now: Millis::new(16),
                conditions: &c,
                config: &k,
                frozen_at: None,
                flash: false,
                animate: false,
            },
            &mut store,
        );
        assert_eq!(frame.position, Vec2::zeros());
        assert_eq!(frame.frame, 0);
    }
}
