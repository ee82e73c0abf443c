use std::ptr;
use std::sync::Mutex;
use weather_fx_core::{EffectsConfig, EffectsEngine, HostCapabilities};

use crate::error::{DefaultWeatherFxError, WeatherFxErrorCode};
use crate::helpers::{clear_last_error, track_error, track_result};
use crate::queries::{AmbientParticleFfi, TrailParticleFfi};

/// The weather effects context.
/// Holds the engine plus the buffers handed out by the snapshot queries.
///
/// # Thread Safety
/// `WeatherFxInstance` can be shared across threads. Every call takes the
/// engine `Mutex` for its duration, so host callbacks (pointer events, frame
/// ticks, weather updates) may arrive from different threads in any order.
///
/// # Usage
///
/// ## Browser host (wasm glue, conceptual)
/// ```js
/// const fx = WeatherFx.create(0);
/// WeatherFx.update_weather(fx, temp, wind, WeatherFx.RAIN, WeatherFx.NORMAL, performance.now());
/// addEventListener("pointermove", e => WeatherFx.pointer_move(fx, e.clientX, e.clientY, performance.now()));
/// function frame(now) {
///     const f = WeatherFx.tick(fx, now);
///     cursor.style.transform = `translate(${f.x}px, ${f.y}px)`;
///     requestAnimationFrame(frame);
/// }
/// ```
///
/// ## Native host (C)
/// ```c
/// WeatherFxInstance* fx = NULL;
/// if (weather_fx_new(0, &fx) != Ok) {
///     return;
/// }
/// weather_fx_update_weather(fx, -3.0f, 12.0f, 4, 255, now_ms());
///
/// // every frame
/// WeatherFxFrame frame;
/// weather_fx_tick(fx, now_ms(), &frame);
/// draw_cursor(frame.x, frame.y, frame.appearance);
///
/// weather_fx_destroy(fx);
/// ```
pub struct WeatherFxInstance {
    pub(crate) engine: Mutex<EffectsEngine>,
    /// Reused by `weather_fx_get_trail`; the pointer it hands out stays valid
    /// until the next trail query on this instance.
    pub(crate) trail_snapshot: Mutex<Vec<TrailParticleFfi>>,
    /// Reused by `weather_fx_get_ambient`, same lifetime rules as the trail buffer.
    pub(crate) ambient_snapshot: Mutex<Vec<AmbientParticleFfi>>,
}

impl WeatherFxInstance {
    /// Build an instance around a validated engine.
    ///
    /// # Errors
    ///
    /// Returns `WeatherFxErrorCode::InvalidConfig` if the configuration is rejected.
    pub(crate) fn new(config: EffectsConfig) -> Result<Box<Self>, DefaultWeatherFxError> {
        let trail_capacity = config.precipitation.capacity.max(config.condensation.capacity);
        let ambient_capacity = config
            .ambient
            .rain_count
            .max(config.ambient.snow_count)
            .max(config.ambient.wind_count);
        let engine = EffectsEngine::new(config)?;

        Ok(Box::new(Self {
            engine: Mutex::new(engine),
            trail_snapshot: Mutex::new(Vec::with_capacity(trail_capacity)),
            ambient_snapshot: Mutex::new(Vec::with_capacity(ambient_capacity)),
        }))
    }
}

fn config_for_seed(seed: u64) -> EffectsConfig {
    if seed == 0 {
        EffectsConfig::default()
    } else {
        EffectsConfig::seeded(seed)
    }
}

/// Write a freshly built instance (or null) to `out_instance`.
unsafe fn publish_instance(
    config: EffectsConfig,
    out_instance: *mut *mut WeatherFxInstance,
) -> WeatherFxErrorCode {
    match track_result(WeatherFxInstance::new(config)) {
        Ok(instance) => {
            unsafe {
                *out_instance = Box::into_raw(instance);
            }
            clear_last_error();
            WeatherFxErrorCode::Ok
        }
        Err(code) => {
            unsafe {
                *out_instance = ptr::null_mut();
            }
            code
        }
    }
}

/// Create a new engine and return it via out-parameter.
///
/// Parameters
/// - `seed`: RNG seed for reproducible runs. `0` seeds from the operating system.
/// - `out_instance`: Pointer to receive the created instance. Must be non-null.
///   - On success: set to a valid `WeatherFxInstance` pointer
///   - On failure: set to null
///
/// Returns
/// - `WeatherFxErrorCode::Ok` (0) on success
/// - `WeatherFxErrorCode::NullPointer` if `out_instance` is null
///
/// # Safety
///
/// - `out_instance` must be a valid pointer to writable memory.
/// - The caller owns the returned instance and MUST call `weather_fx_destroy` exactly once.
#[no_mangle]
pub unsafe extern "C" fn weather_fx_new(seed: u64, out_instance: *mut *mut WeatherFxInstance) -> WeatherFxErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultWeatherFxError::null_pointer("out_instance"));
    }

    unsafe { publish_instance(config_for_seed(seed), out_instance) }
}

/// Create an engine for a host that lacks some runtime primitives.
///
/// - `has_timers`: `false` leaves every timed effect (wind changes, thunder,
///   freezing, trails, flashes) dormant
/// - `has_animation_frames`: `false` holds the cursor where it is
///
/// Otherwise identical to `weather_fx_new`.
///
/// # Safety
///
/// Same contract as `weather_fx_new`.
#[no_mangle]
pub unsafe extern "C" fn weather_fx_new_with_host(
    seed: u64,
    has_timers: bool,
    has_animation_frames: bool,
    out_instance: *mut *mut WeatherFxInstance,
) -> WeatherFxErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultWeatherFxError::null_pointer("out_instance"));
    }

    let config = EffectsConfig {
        host: HostCapabilities {
            timers: has_timers,
            animation_frames: has_animation_frames,
        },
        ..config_for_seed(seed)
    };
    unsafe { publish_instance(config, out_instance) }
}

/// Destroy an instance previously created by `weather_fx_new`.
///
/// Pending timers are cancelled before the memory is released. A null `ptr` is a no-op.
///
/// # Safety
/// - The pointer MUST have been created by `weather_fx_new` or `weather_fx_new_with_host`.
/// - The pointer MUST NOT be used after this call.
#[no_mangle]
pub unsafe extern "C" fn weather_fx_destroy(ptr: *mut WeatherFxInstance) {
    if ptr.is_null() {
        return;
    }

    // SAFETY: `ptr` came from `Box::into_raw` in `publish_instance` and is still owned by the caller.
    let instance = unsafe { Box::from_raw(ptr) };
    if let Ok(mut engine) = instance.engine.lock() {
        engine.shutdown();
    };
}
