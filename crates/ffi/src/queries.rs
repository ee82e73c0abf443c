use std::ptr;
use weather_fx_core::{AmbientKind, AmbientParticle, EngineCue, StoreSnapshot, TrailKind, TrailParticle};

use crate::error::{DefaultWeatherFxError, WeatherFxErrorCode};
use crate::helpers::{handle_ffi_result_error, instance_from_ptr, track_error, with_engine};
use crate::instance::WeatherFxInstance;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
/// FFI-friendly snapshot of one trail particle.
/// Keep this layout stable for C consumers.
pub struct TrailParticleFfi {
    /// Creation time (ms); with `serial`, the particle's unique key.
    pub stamp_ms: u64,
    pub serial: u32,

    /// Spawn position in viewport pixels.
    pub x: f32,
    pub y: f32,

    /// Rotation in degrees (always 0 for condensation).
    pub rotation_deg: f32,
}

impl From<&TrailParticle> for TrailParticleFfi {
    fn from(particle: &TrailParticle) -> Self {
        Self {
            stamp_ms: *particle.id.stamp,
            serial: particle.id.serial,
            x: particle.spawn_position.x,
            y: particle.spawn_position.y,
            rotation_deg: particle.rotation_deg,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
/// FFI-friendly snapshot of one ambient particle.
pub struct AmbientParticleFfi {
    pub stamp_ms: u64,
    pub serial: u32,

    /// Horizontal (rain, snow) or vertical (wind) placement, 0-100 % of the viewport.
    pub offset_pct: f32,

    /// Length of one animation loop (s).
    pub duration_s: f32,

    /// Start offset into the loop (s).
    pub start_offset_s: f32,

    /// Flake size (px); `NaN` for rain and wind.
    pub size_px: f32,
}

impl From<&AmbientParticle> for AmbientParticleFfi {
    fn from(particle: &AmbientParticle) -> Self {
        Self {
            stamp_ms: *particle.id.stamp,
            serial: particle.id.serial,
            offset_pct: particle.offset_pct,
            duration_s: particle.duration_s,
            start_offset_s: particle.start_offset_s,
            size_px: particle.size_px.unwrap_or(f32::NAN),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
/// FFI-friendly copy of the shared weather store.
pub struct WeatherFxStoreState {
    /// Sanitised temperature (°C).
    pub temperature: f32,
    /// Sanitised wind speed (km/h).
    pub wind_speed: f32,
    /// Same codes as `weather_fx_update_weather`.
    pub weather_type: u8,
    pub view_mode: u8,
    pub is_active: bool,

    /// Current unit wind direction.
    pub wind_x: f32,
    pub wind_y: f32,

    /// Displacement drifted under the current wind direction (px).
    pub drift_x: f32,
    pub drift_y: f32,

    /// Most recent thunder strike (ms); 0 when none this session.
    pub last_thunder_ms: u64,
}

impl From<&StoreSnapshot> for WeatherFxStoreState {
    fn from(snapshot: &StoreSnapshot) -> Self {
        let reading = &snapshot.reading;
        Self {
            temperature: *reading.temperature(),
            wind_speed: *reading.wind_speed(),
            weather_type: reading.weather_type().as_u8(),
            view_mode: reading.view_mode().as_u8(),
            is_active: reading.is_active(),
            wind_x: snapshot.wind_direction.x(),
            wind_y: snapshot.wind_direction.y(),
            drift_x: snapshot.drift.x,
            drift_y: snapshot.drift.y,
            last_thunder_ms: *snapshot.last_thunder,
        }
    }
}

/// Null both outputs after a failed snapshot query.
unsafe fn reset_outputs<T>(out_array: *mut *const T, out_len: *mut usize) {
    unsafe {
        *out_array = ptr::null();
        *out_len = 0;
    }
}

#[no_mangle]
/// Return a borrowed pointer to a snapshot of one particle trail, oldest first.
///
/// - `kind`: 0 = precipitation (raindrops), 1 = condensation (sweat beads)
/// - The buffer is reused: the pointer is valid until the next call to this
///   function on the same instance. **DO NOT FREE THIS POINTER**.
///
/// Returns
/// - `WeatherFxErrorCode::Ok` (0) with `out_len` particles in `out_array`
/// - `WeatherFxErrorCode::NullPointer` if `ptr`, `out_array` or `out_len` is null
/// - `WeatherFxErrorCode::InvalidParameter` for an unknown `kind`
/// - `WeatherFxErrorCode::LockPoisoned` if an internal lock is poisoned
///
/// # Safety
///
/// - `ptr` must be a valid pointer returned by `weather_fx_new` or null.
/// - `out_array` and `out_len` must be valid, non-null pointers this function will write to.
///
/// # Example Usage (C)
/// ```c
/// const TrailParticleFfi* drops = NULL;
/// uintptr_t len = 0;
/// if (weather_fx_get_trail(fx, 0, &drops, &len) == Ok) {
///     for (uintptr_t i = 0; i < len; i++) {
///         draw_drop(drops[i].x, drops[i].y, drops[i].rotation_deg);
///     }
/// }
/// ```
pub unsafe extern "C" fn weather_fx_get_trail(
    ptr: *const WeatherFxInstance,
    kind: u8,
    out_array: *mut *const TrailParticleFfi,
    out_len: *mut usize,
) -> WeatherFxErrorCode {
    if out_len.is_null() {
        return track_error(&DefaultWeatherFxError::null_pointer("out_len"));
    }
    if out_array.is_null() {
        unsafe {
            *out_len = 0;
        }
        return track_error(&DefaultWeatherFxError::null_pointer("out_array"));
    }

    let result = handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let kind = TrailKind::from_u8(kind).ok_or_else(|| DefaultWeatherFxError::invalid_parameter("kind", kind))?;
        let mut snapshot = instance
            .trail_snapshot
            .lock()
            .map_err(|_| DefaultWeatherFxError::lock_poisoned("trail_snapshot"))?;
        snapshot.clear();

        with_engine(instance, |engine| {
            snapshot.extend(engine.trail(kind).iter().map(TrailParticleFfi::from));
        })?;

        unsafe {
            *out_array = snapshot.as_ptr();
            *out_len = snapshot.len();
        }
        Ok(())
    });

    if result != WeatherFxErrorCode::Ok {
        unsafe { reset_outputs(out_array, out_len) };
    }
    result
}

#[no_mangle]
/// Return a borrowed pointer to one ambient particle field.
///
/// - `kind`: 0 = rain, 1 = snow, 2 = wind streaks
/// - A field that is not currently showing yields `out_len == 0`.
/// - The pointer is valid until the next call to this function on the same instance.
///
/// Returns
/// - `WeatherFxErrorCode::Ok` (0) on success
/// - `WeatherFxErrorCode::NullPointer` if `ptr`, `out_array` or `out_len` is null
/// - `WeatherFxErrorCode::InvalidParameter` for an unknown `kind`
///
/// # Safety
///
/// Same pointer contract as `weather_fx_get_trail`.
pub unsafe extern "C" fn weather_fx_get_ambient(
    ptr: *const WeatherFxInstance,
    kind: u8,
    out_array: *mut *const AmbientParticleFfi,
    out_len: *mut usize,
) -> WeatherFxErrorCode {
    if out_len.is_null() {
        return track_error(&DefaultWeatherFxError::null_pointer("out_len"));
    }
    if out_array.is_null() {
        unsafe {
            *out_len = 0;
        }
        return track_error(&DefaultWeatherFxError::null_pointer("out_array"));
    }

    let result = handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let kind = AmbientKind::from_u8(kind).ok_or_else(|| DefaultWeatherFxError::invalid_parameter("kind", kind))?;
        let mut snapshot = instance
            .ambient_snapshot
            .lock()
            .map_err(|_| DefaultWeatherFxError::lock_poisoned("ambient_snapshot"))?;
        snapshot.clear();

        with_engine(instance, |engine| {
            if let Some(field) = engine.ambient().field(kind) {
                snapshot.extend(field.iter().map(AmbientParticleFfi::from));
            }
        })?;

        unsafe {
            *out_array = snapshot.as_ptr();
            *out_len = snapshot.len();
        }
        Ok(())
    });

    if result != WeatherFxErrorCode::Ok {
        unsafe { reset_outputs(out_array, out_len) };
    }
    result
}

#[no_mangle]
/// Release the memory held by the trail and ambient snapshot buffers.
///
/// Invalidates every pointer previously returned by the snapshot queries.
///
/// # Safety
///
/// `ptr` must be a valid pointer returned by `weather_fx_new` or null.
pub unsafe extern "C" fn weather_fx_clear_snapshots(ptr: *const WeatherFxInstance) -> WeatherFxErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let mut trail = instance
            .trail_snapshot
            .lock()
            .map_err(|_| DefaultWeatherFxError::lock_poisoned("trail_snapshot"))?;
        trail.clear();
        trail.shrink_to_fit();

        let mut ambient = instance
            .ambient_snapshot
            .lock()
            .map_err(|_| DefaultWeatherFxError::lock_poisoned("ambient_snapshot"))?;
        ambient.clear();
        ambient.shrink_to_fit();
        Ok(())
    })
}

#[no_mangle]
/// Copy the shared store (reading, wind direction, drift, last strike) into `out_state`.
///
/// # Safety
///
/// - `ptr` must be a valid pointer returned by `weather_fx_new` or null.
/// - `out_state` must be a valid, non-null pointer this function will write to.
pub unsafe extern "C" fn weather_fx_get_store_state(
    ptr: *const WeatherFxInstance,
    out_state: *mut WeatherFxStoreState,
) -> WeatherFxErrorCode {
    if out_state.is_null() {
        return track_error(&DefaultWeatherFxError::null_pointer("out_state"));
    }

    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let snapshot = with_engine(instance, |engine| engine.store().snapshot())?;
        unsafe {
            *out_state = WeatherFxStoreState::from(&snapshot);
        }
        Ok(())
    })
}

#[no_mangle]
/// Drain the thunder audio cues raised since the last call.
///
/// Cues are only raised while sound is enabled.
///
/// - `out_count` receives the number of strikes to play.
/// - `out_latest_ms` (optional) receives the newest strike stamp, or 0 when none.
///
/// # Safety
///
/// - `ptr` must be a valid pointer returned by `weather_fx_new` or null.
/// - `out_count` must be a valid, non-null pointer.
/// - `out_latest_ms` if non-null, must be a valid pointer to a `u64`.
pub unsafe extern "C" fn weather_fx_take_thunder_audio(
    ptr: *const WeatherFxInstance,
    out_count: *mut usize,
    out_latest_ms: *mut u64,
) -> WeatherFxErrorCode {
    if out_count.is_null() {
        return track_error(&DefaultWeatherFxError::null_pointer("out_count"));
    }

    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let cues = with_engine(instance, weather_fx_core::EffectsEngine::drain_cues)?;
        let latest = cues
            .iter()
            .map(|cue| match cue {
                EngineCue::ThunderAudio { at } => **at,
            })
            .max()
            .unwrap_or(0);

        unsafe {
            *out_count = cues.len();
            if !out_latest_ms.is_null() {
                *out_latest_ms = latest;
            }
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{weather_fx_destroy, weather_fx_new};
    use crate::session::{weather_fx_set_sound_enabled, weather_fx_tick, weather_fx_update_weather, WeatherFxFrame};

    fn create() -> *mut WeatherFxInstance {
        let mut fx: *mut WeatherFxInstance = ptr::null_mut();
        assert_eq!(unsafe { weather_fx_new(5, &mut fx) }, WeatherFxErrorCode::Ok);
        fx
    }

    fn run(fx: *mut WeatherFxInstance, from: u64, to: u64) {
        let mut frame = WeatherFxFrame::default();
        for t in (from..=to).step_by(16) {
            assert_eq!(unsafe { weather_fx_tick(fx, t, &mut frame) }, WeatherFxErrorCode::Ok);
        }
    }

    #[test]
    fn rain_trail_is_capped() {
        let fx = create();
        unsafe { weather_fx_update_weather(fx, 15.0, 5.0, 3, 0, 0) };
        run(fx, 16, 3000);

        let mut drops: *const TrailParticleFfi = ptr::null();
        let mut len = 0usize;
        let code = unsafe { weather_fx_get_trail(fx, 0, &mut drops, &mut len) };
        assert_eq!(code, WeatherFxErrorCode::Ok);
        assert_eq!(len, 15);

        let slice = unsafe { std::slice::from_raw_parts(drops, len) };
        assert!(slice.windows(2).all(|w| w[0].stamp_ms <= w[1].stamp_ms));
        unsafe { weather_fx_destroy(fx) };
    }

    #[test]
    fn unknown_trail_kind_nulls_outputs() {
        let fx = create();
        let mut drops: *const TrailParticleFfi = ptr::null();
        let mut len = 99usize;
        let code = unsafe { weather_fx_get_trail(fx, 9, &mut drops, &mut len) };
        assert_eq!(code, WeatherFxErrorCode::InvalidParameter);
        assert!(drops.is_null());
        assert_eq!(len, 0);
        unsafe { weather_fx_destroy(fx) };
    }

    #[test]
    fn ambient_fields_follow_conditions() {
        let fx = create();
        unsafe { weather_fx_update_weather(fx, -2.0, 5.0, 4, 0, 0) };
        run(fx, 16, 64);

        let mut flakes: *const AmbientParticleFfi = ptr::null();
        let mut len = 0usize;
        assert_eq!(unsafe { weather_fx_get_ambient(fx, 1, &mut flakes, &mut len) }, WeatherFxErrorCode::Ok);
        assert_eq!(len, 200);
        let first = unsafe { *flakes };
        assert!(!first.size_px.is_nan());

        let mut drops: *const AmbientParticleFfi = ptr::null();
        let mut rain_len = 7usize;
        assert_eq!(unsafe { weather_fx_get_ambient(fx, 0, &mut drops, &mut rain_len) }, WeatherFxErrorCode::Ok);
        assert_eq!(rain_len, 0);

        assert_eq!(unsafe { weather_fx_clear_snapshots(fx) }, WeatherFxErrorCode::Ok);
        unsafe { weather_fx_destroy(fx) };
    }

    #[test]
    fn store_state_mirrors_reading() {
        let fx = create();
        unsafe { weather_fx_update_weather(fx, 12.5, 35.0, 1, 2, 0) };

        let mut state = WeatherFxStoreState::default();
        assert_eq!(unsafe { weather_fx_get_store_state(fx, &mut state) }, WeatherFxErrorCode::Ok);
        assert_eq!(state.temperature, 12.5);
        assert_eq!(state.wind_speed, 35.0);
        assert_eq!(state.weather_type, 1);
        assert_eq!(state.view_mode, 2);
        assert!(state.is_active);
        assert!((state.wind_x.hypot(state.wind_y) - 1.0).abs() < 1e-5);
        assert_eq!(state.last_thunder_ms, 0);
        unsafe { weather_fx_destroy(fx) };
    }

    #[test]
    fn thunder_audio_needs_sound() {
        let fx = create();
        unsafe { weather_fx_update_weather(fx, 18.0, 5.0, 5, 0, 0) };
        run(fx, 16, 60_000);

        let mut count = 0usize;
        let mut latest = 0u64;
        assert_eq!(
            unsafe { weather_fx_take_thunder_audio(fx, &mut count, &mut latest) },
            WeatherFxErrorCode::Ok
        );
        assert_eq!(count, 0);

        unsafe { weather_fx_set_sound_enabled(fx, true) };
        run(fx, 60_016, 400_000);
        assert_eq!(
            unsafe { weather_fx_take_thunder_audio(fx, &mut count, &mut latest) },
            WeatherFxErrorCode::Ok
        );
        assert!(count > 0);
        assert!(latest > 60_000);

        let mut state = WeatherFxStoreState::default();
        unsafe { weather_fx_get_store_state(fx, &mut state) };
        assert_eq!(state.last_thunder_ms, latest);
        unsafe { weather_fx_destroy(fx) };
    }
}
