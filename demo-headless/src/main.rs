use clap::Parser;
use std::f32::consts::TAU;
use tracing_subscriber::EnvFilter;
use weather_fx_core::{
    AmbientKind, CursorFrame, EffectsConfig, EffectsEngine, FreezePhase, Millis, TrailKind, ViewMode, WeatherInput,
    WeatherType,
};

/// Weather effects demo with configurable conditions
#[derive(Parser, Debug)]
#[command(name = "weather-fx-demo")]
#[command(about = "Headless run of the weather cursor effects", long_about = None)]
struct Args {
    /// Run duration in seconds
    #[arg(short, long, default_value_t = 60.0)]
    duration: f32,

    /// Frame interval in milliseconds
    #[arg(short, long, default_value_t = 16)]
    frame_ms: u64,

    /// Temperature in °C
    #[arg(short, long, default_value_t = 20.0)]
    temperature: f32,

    /// Wind speed in km/h
    #[arg(short, long, default_value_t = 10.0)]
    wind_speed: f32,

    /// Sky condition (clear, cloudy, fog, rain, snow, thunder)
    #[arg(long, default_value = "clear")]
    weather: String,

    /// View mode (normal, dev, god)
    #[arg(long, default_value = "normal")]
    view: String,

    /// RNG seed (0 = random)
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Seconds the pointer moves before resting for the same time
    #[arg(long, default_value_t = 4.0)]
    move_period: f32,

    /// Emit thunder audio cues
    #[arg(long)]
    sound: bool,

    /// Report interval in seconds
    #[arg(short, long, default_value_t = 2.0)]
    report_interval: f32,

    /// Run the built-in scenario checks
    #[arg(short, long)]
    validate: bool,
}

fn parse_weather(name: &str) -> WeatherType {
    match name.to_lowercase().as_str() {
        "cloudy" | "clouds" => WeatherType::Cloudy,
        "fog" | "foggy" => WeatherType::Fog,
        "rain" | "rainy" => WeatherType::Rain,
        "snow" | "snowy" => WeatherType::Snow,
        "thunder" | "storm" => WeatherType::Thunder,
        "clear" => WeatherType::Clear,
        _ => {
            println!("Unknown weather '{}', using clear", name);
            WeatherType::Clear
        }
    }
}

fn parse_view(name: &str) -> ViewMode {
    match name.to_lowercase().as_str() {
        "dev" | "diagnostic" => ViewMode::Diagnostic,
        "god" | "override" => ViewMode::Override,
        _ => ViewMode::Normal,
    }
}

/// Pointer path: an orbit around the viewport centre that stops every other period
struct PointerPath {
    period_ms: u64,
}

impl PointerPath {
    const CENTRE: (f32, f32) = (640.0, 360.0);
    const RADIUS: f32 = 200.0;

    fn position(&self, now: u64) -> Option<(f32, f32)> {
        let period = self.period_ms.max(1);
        if (now / period) % 2 == 1 {
            return None;
        }
        let angle = (now % (period * 2)) as f32 / period as f32 * TAU;
        Some((
            Self::CENTRE.0 + Self::RADIUS * angle.cos(),
            Self::CENTRE.1 + Self::RADIUS * angle.sin(),
        ))
    }
}

fn mode_name(frame: &CursorFrame) -> String {
    format!("{:?}", frame.mode).to_lowercase()
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .try_init();

    let args = Args::parse();

    println!("=== Weather Effects Demo ===\n");

    let config = if args.seed == 0 {
        EffectsConfig::default()
    } else {
        EffectsConfig::seeded(args.seed)
    };
    let mut engine = match EffectsEngine::new(config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };
    engine.set_sound_enabled(args.sound);

    let weather = parse_weather(&args.weather);
    let input = WeatherInput::active(args.temperature, args.wind_speed, weather).with_view_mode(parse_view(&args.view));
    engine.update_weather(input, Millis::ZERO);

    let c = engine.conditions();
    println!(
        "Weather: {}, {:.1}°C, {:.1} km/h, view {:?}",
        weather, args.temperature, args.wind_speed, engine.store().reading().view_mode()
    );
    println!(
        "Active effects: freezing={} windy={} raining={} thunder={} snowy={} foggy={} hot={}\n",
        c.freezing, c.windy, c.raining, c.thunder, c.snowy, c.foggy, c.hot
    );

    println!("Time(s) |    X    |    Y    | Mode   | Rain | Sweat | Thunder(ms) | Freezes | Timers");
    println!("--------|---------|---------|--------|------|-------|-------------|---------|-------");

    let path = PointerPath {
        period_ms: (args.move_period.max(0.001) * 1000.0) as u64,
    };
    let end = (args.duration.max(0.0) * 1000.0) as u64;
    let report_every = (args.report_interval.max(0.001) * 1000.0) as u64;
    let step = args.frame_ms.max(1);

    let mut next_report = 0;
    let mut audio_cues = 0;
    let mut now = 0;
    while now <= end {
        if let Some((x, y)) = path.position(now) {
            engine.pointer_moved(x, y, Millis::new(now));
        }
        let frame = engine.tick(Millis::new(now));
        audio_cues += engine.drain_cues().len();

        if now >= next_report {
            println!(
                "{:7.1} | {:7.1} | {:7.1} | {:6} | {:4} | {:5} | {:11} | {:7} | {:6}",
                now as f32 / 1000.0,
                frame.position.x,
                frame.position.y,
                mode_name(&frame),
                engine.trail(TrailKind::Precipitation).len(),
                engine.trail(TrailKind::Condensation).len(),
                *engine.store().last_thunder(),
                engine.freezes_completed(),
                engine.pending_timers(),
            );
            next_report += report_every;
        }
        now += step;
    }

    println!("\n=== Run Complete ===");
    let ambient = engine.ambient();
    for kind in [AmbientKind::Rain, AmbientKind::Snow, AmbientKind::Wind] {
        if let Some(field) = ambient.field(kind) {
            println!("Ambient {:?}: {} particles", kind, field.len());
        }
    }
    println!("Thunder strikes: {}", engine.thunder_strikes());
    if args.sound {
        println!("Thunder audio cues: {}", audio_cues);
    }
    println!("Completed freezes: {}", engine.freezes_completed());
    let drift = engine.store().drift();
    println!("Wind drift accumulated: ({:.1}, {:.1}) px", drift.x, drift.y);

    engine.shutdown();

    if args.validate {
        run_validation_tests();
    }
}

fn run_frames(engine: &mut EffectsEngine, from: u64, to: u64) -> Option<CursorFrame> {
    let mut last = None;
    for t in (from..=to).step_by(16) {
        last = Some(engine.tick(Millis::new(t)));
    }
    last
}

fn seeded_engine() -> Option<EffectsEngine> {
    EffectsEngine::new(EffectsConfig::seeded(42)).ok()
}

fn report(passed: bool, pass: &str, fail: &str) {
    if passed {
        println!("  ✓ PASS: {}", pass);
    } else {
        println!("  ✗ FAIL: {}", fail);
    }
}

fn run_validation_tests() {
    println!("\n=== Running Validation Tests ===\n");

    // Test 1: drift under strong wind
    println!("Test 1: Wind Drift");
    if let Some(mut engine) = seeded_engine() {
        engine.update_weather(WeatherInput::active(15.0, 40.0, WeatherType::Clear), Millis::ZERO);
        engine.pointer_moved(640.0, 360.0, Millis::ZERO);
        let frame = run_frames(&mut engine, 16, 5000);
        let drift = engine.store().drift();
        println!("  Drift: ({:.1}, {:.1}) px", drift.x, drift.y);
        report(
            frame.is_some_and(|f| f.mode == weather_fx_core::CursorMode::Drift) && drift.norm() > 0.0,
            "Resting cursor drifts with the wind",
            "Expected the cursor to drift",
        );
    }

    // Test 2: freeze cycle
    println!("\nTest 2: Freeze Cycle");
    if let Some(mut engine) = seeded_engine() {
        engine.update_weather(WeatherInput::active(-5.0, 5.0, WeatherType::Clear), Millis::ZERO);
        let mut frozen_frames = 0;
        for t in (16..=30_000).step_by(16) {
            engine.tick(Millis::new(t));
            if engine.freeze_phase() == FreezePhase::Frozen {
                frozen_frames += 1;
            }
        }
        println!("  Frozen frames: {}, completed freezes: {}", frozen_frames, engine.freezes_completed());
        report(
            frozen_frames > 0 && engine.freezes_completed() > 0,
            "Cursor freezes and thaws below zero",
            "Expected at least one complete freeze",
        );
    }

    // Test 3: rain trail bound
    println!("\nTest 3: Rain Trail Capacity");
    if let Some(mut engine) = seeded_engine() {
        engine.update_weather(WeatherInput::active(12.0, 5.0, WeatherType::Rain), Millis::ZERO);
        run_frames(&mut engine, 16, 10_000);
        let len = engine.trail(TrailKind::Precipitation).len();
        println!("  Raindrops alive: {}", len);
        report(len == 15, "Trail stays at its capacity", "Trail exceeded or missed its capacity");
    }

    // Test 4: clearing stops everything
    println!("\nTest 4: Clear Weather");
    if let Some(mut engine) = seeded_engine() {
        engine.update_weather(WeatherInput::active(-2.0, 35.0, WeatherType::Thunder), Millis::ZERO);
        run_frames(&mut engine, 16, 3000);
        engine.clear_weather(Millis::new(3000));
        run_frames(&mut engine, 3016, 6000);
        println!("  Pending timers after clear: {}", engine.pending_timers());
        report(
            engine.pending_timers() == 0 && engine.trail(TrailKind::Precipitation).is_empty(),
            "No timers or particles survive a clear",
            "Effects kept running after clear",
        );
    }

    println!("\n=== Validation Complete ===");
}
