use std::ffi::CStr;
use std::os::raw::c_char;
use weather_fx_core::{CursorFrame, FeedReading, Millis, ViewMode, WeatherInput, WeatherType};

use crate::error::{DefaultWeatherFxError, WeatherFxErrorCode};
use crate::helpers::{handle_ffi_result_error, instance_from_ptr, with_engine};
use crate::instance::WeatherFxInstance;

/// Code meaning "not supplied" for `weather_type` and `view_mode`.
pub const WEATHER_FX_MISSING_CODE: u8 = 255;

/// C-compatible rendering state for one frame.
///
/// `mode`: 0 = follow, 1 = drift, 2 = frozen.
/// `appearance`: 0 = default, 1 = hot, 2 = foggy, 3 = snowy, 4 = frozen, 5 = flash.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeatherFxFrame {
    pub x: f32,
    pub y: f32,
    pub mode: u8,
    pub appearance: u8,
    pub smoothing: f32,
    pub flash: bool,
    pub pressed: bool,
    pub frame: u64,
}

impl From<&CursorFrame> for WeatherFxFrame {
    fn from(frame: &CursorFrame) -> Self {
        Self {
            x: frame.position.x,
            y: frame.position.y,
            mode: frame.mode.as_u8(),
            appearance: frame.appearance.as_u8(),
            smoothing: frame.smoothing,
            flash: frame.flash,
            pressed: frame.pressed,
            frame: frame.frame,
        }
    }
}

fn optional_code<T>(
    name: &str,
    value: u8,
    decode: impl FnOnce(u8) -> Option<T>,
) -> Result<Option<T>, DefaultWeatherFxError> {
    if value == WEATHER_FX_MISSING_CODE {
        return Ok(None);
    }
    decode(value)
        .map(Some)
        .ok_or_else(|| DefaultWeatherFxError::invalid_parameter(name, value))
}

fn optional_number(value: f32) -> Option<f32> {
    (!value.is_nan()).then_some(value)
}

/// Publish a weather reading and start (or update) the weather session.
///
/// Parameters
/// - `temperature`: °C, `NaN` when unknown (defaults to 20°C)
/// - `wind_speed`: km/h, `NaN` when unknown (defaults to calm)
/// - `weather_type`: 0 = clear, 1 = cloudy, 2 = fog, 3 = rain, 4 = snow, 5 = thunder;
///   `255` when unknown
/// - `view_mode`: 0 = normal, 1 = dev, 2 = god; `255` when unknown
/// - `now_ms`: host clock in milliseconds
///
/// Returns
/// - `WeatherFxErrorCode::InvalidParameter` for a code outside the tables above
///
/// # Safety
/// `ptr` must be null or a live instance from `weather_fx_new`.
#[no_mangle]
pub unsafe extern "C" fn weather_fx_update_weather(
    ptr: *const WeatherFxInstance,
    temperature: f32,
    wind_speed: f32,
    weather_type: u8,
    view_mode: u8,
    now_ms: u64,
) -> WeatherFxErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let input = WeatherInput {
            temperature: optional_number(temperature),
            wind_speed: optional_number(wind_speed),
            weather_type: optional_code("weather_type", weather_type, WeatherType::from_u8)?,
            view_mode: optional_code("view_mode", view_mode, ViewMode::from_u8)?,
            is_active: Some(true),
        };
        with_engine(instance, |engine| engine.update_weather(input, Millis::new(now_ms)))
    })
}

/// Publish a raw weather-service JSON payload.
///
/// Malformed payloads are not an error: they become an all-defaults reading.
///
/// # Safety
/// - `ptr` must be null or a live instance from `weather_fx_new`.
/// - `payload` must be null or a valid null-terminated string.
#[no_mangle]
pub unsafe extern "C" fn weather_fx_update_from_json(
    ptr: *const WeatherFxInstance,
    payload: *const c_char,
    now_ms: u64,
) -> WeatherFxErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        if payload.is_null() {
            return Err(DefaultWeatherFxError::null_pointer("payload"));
        }
        // SAFETY: checked non-null above; the caller guarantees termination.
        let text = unsafe { CStr::from_ptr(payload) }.to_string_lossy();
        let feed = FeedReading::from_json(&text);
        with_engine(instance, |engine| engine.update_from_feed(feed, Millis::new(now_ms)))
    })
}

/// End the weather session: every effect stops and the store resets.
///
/// # Safety
/// `ptr` must be null or a live instance from `weather_fx_new`.
#[no_mangle]
pub unsafe extern "C" fn weather_fx_clear_weather(ptr: *const WeatherFxInstance, now_ms: u64) -> WeatherFxErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        with_engine(instance, |engine| engine.clear_weather(Millis::new(now_ms)))
    })
}

/// Suppress all effects (e.g. while a modal is open) without dropping the reading.
///
/// # Safety
/// `ptr` must be null or a live instance from `weather_fx_new`.
#[no_mangle]
pub unsafe extern "C" fn weather_fx_set_suppressed(
    ptr: *const WeatherFxInstance,
    suppressed: bool,
    now_ms: u64,
) -> WeatherFxErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        with_engine(instance, |engine| engine.set_suppressed(suppressed, Millis::new(now_ms)))
    })
}

/// Toggle thunder audio cues.
///
/// # Safety
/// `ptr` must be null or a live instance from `weather_fx_new`.
#[no_mangle]
pub unsafe extern "C" fn weather_fx_set_sound_enabled(ptr: *const WeatherFxInstance, enabled: bool) -> WeatherFxErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        with_engine(instance, |engine| engine.set_sound_enabled(enabled))
    })
}

/// Report a pointer position in viewport pixels. Non-finite coordinates are ignored.
///
/// # Safety
/// `ptr` must be null or a live instance from `weather_fx_new`.
#[no_mangle]
pub unsafe extern "C" fn weather_fx_pointer_move(
    ptr: *const WeatherFxInstance,
    x: f32,
    y: f32,
    now_ms: u64,
) -> WeatherFxErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        with_engine(instance, |engine| engine.pointer_moved(x, y, Millis::new(now_ms)))
    })
}

/// Report a pointer press.
///
/// # Safety
/// `ptr` must be null or a live instance from `weather_fx_new`.
#[no_mangle]
pub unsafe extern "C" fn weather_fx_pointer_press(ptr: *const WeatherFxInstance, now_ms: u64) -> WeatherFxErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        with_engine(instance, |engine| engine.pointer_pressed(Millis::new(now_ms)))
    })
}

/// Advance the engine to `now_ms` and write the frame to render.
///
/// Call once per animation frame. Due timers fire first, in order.
///
/// # Safety
/// - `ptr` must be null or a live instance from `weather_fx_new`.
/// - `out_frame` must be a valid pointer to writable memory.
#[no_mangle]
pub unsafe extern "C" fn weather_fx_tick(
    ptr: *const WeatherFxInstance,
    now_ms: u64,
    out_frame: *mut WeatherFxFrame,
) -> WeatherFxErrorCode {
    handle_ffi_result_error(|| {
        if out_frame.is_null() {
            return Err(DefaultWeatherFxError::null_pointer("out_frame"));
        }
        let instance = instance_from_ptr(ptr)?;
        let frame = with_engine(instance, |engine| engine.tick(Millis::new(now_ms)))?;
        // SAFETY: checked non-null above.
        unsafe {
            *out_frame = WeatherFxFrame::from(&frame);
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{weather_fx_destroy, weather_fx_new};
    use std::ffi::CString;
    use std::ptr;

    fn create() -> *mut WeatherFxInstance {
        let mut fx: *mut WeatherFxInstance = ptr::null_mut();
        assert_eq!(unsafe { weather_fx_new(11, &mut fx) }, WeatherFxErrorCode::Ok);
        fx
    }

    #[test]
    fn null_instance_is_rejected() {
        let code = unsafe { weather_fx_update_weather(ptr::null(), 1.0, 2.0, 0, 0, 0) };
        assert_eq!(code, WeatherFxErrorCode::NullPointer);
    }

    #[test]
    fn unknown_weather_code_is_rejected() {
        let fx = create();
        let code = unsafe { weather_fx_update_weather(fx, 10.0, 5.0, 42, WEATHER_FX_MISSING_CODE, 0) };
        assert_eq!(code, WeatherFxErrorCode::InvalidParameter);
        unsafe { weather_fx_destroy(fx) };
    }

    #[test]
    fn missing_values_fall_back_to_defaults() {
        let fx = create();
        let code = unsafe {
            weather_fx_update_weather(fx, f32::NAN, f32::NAN, WEATHER_FX_MISSING_CODE, WEATHER_FX_MISSING_CODE, 0)
        };
        assert_eq!(code, WeatherFxErrorCode::Ok);

        let engine = unsafe { &*fx }.engine.lock().unwrap();
        let reading = engine.store().reading();
        assert_eq!(*reading.temperature(), 20.0);
        assert_eq!(*reading.wind_speed(), 0.0);
        assert_eq!(reading.weather_type(), WeatherType::Clear);
        assert!(reading.is_active());
        drop(engine);
        unsafe { weather_fx_destroy(fx) };
    }

    #[test]
    fn tick_writes_frame() {
        let fx = create();
        unsafe {
            weather_fx_update_weather(fx, 10.0, 3.0, 2, 0, 0);
            weather_fx_pointer_move(fx, 100.0, 50.0, 0);
        }

        let mut frame = WeatherFxFrame::default();
        for t in (16..=3200).step_by(16) {
            assert_eq!(unsafe { weather_fx_tick(fx, t, &mut frame) }, WeatherFxErrorCode::Ok);
        }
        assert!(frame.frame > 0);
        assert!((frame.x - 100.0).abs() < 1.0);
        assert!((frame.y - 50.0).abs() < 1.0);
        assert_eq!(frame.mode, 0);
        assert_eq!(frame.appearance, 2);
        unsafe { weather_fx_destroy(fx) };
    }

    #[test]
    fn tick_rejects_null_frame() {
        let fx = create();
        let code = unsafe { weather_fx_tick(fx, 16, ptr::null_mut()) };
        assert_eq!(code, WeatherFxErrorCode::NullPointer);
        unsafe { weather_fx_destroy(fx) };
    }

    #[test]
    fn json_payload_is_accepted() {
        let fx = create();
        let payload = CString::new(r#"{"temperature": 31.5, "windSpeed": 4, "weatherCode": 61}"#).unwrap();
        let code = unsafe { weather_fx_update_from_json(fx, payload.as_ptr(), 0) };
        assert_eq!(code, WeatherFxErrorCode::Ok);

        let engine = unsafe { &*fx }.engine.lock().unwrap();
        assert!(engine.conditions().raining);
        assert!(engine.conditions().hot);
        drop(engine);
        unsafe { weather_fx_destroy(fx) };
    }
}
