use crate::error::{with_last_error_mut, DefaultWeatherFxError, WeatherFxError, WeatherFxErrorCode};
use crate::instance::WeatherFxInstance;
use std::ffi::CString;
use weather_fx_core::EffectsEngine;

/// Record an error in thread-local storage.
pub(crate) fn set_last_error(error: &impl WeatherFxError) {
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Record an error and return its code.
#[inline]
pub(crate) fn track_error(error: &impl WeatherFxError) -> WeatherFxErrorCode {
    set_last_error(error);
    error.code()
}

/// Record the error of a failed result, passing success through.
pub(crate) fn track_result<T>(result: Result<T, DefaultWeatherFxError>) -> Result<T, WeatherFxErrorCode> {
    result.map_err(|e| track_error(&e))
}

/// Clear the thread-local error after a successful call.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = WeatherFxErrorCode::Ok;
    });
}

/// Run an FFI body and translate its result into an error code.
pub(crate) fn handle_ffi_result_error<F>(body: F) -> WeatherFxErrorCode
where
    F: FnOnce() -> Result<(), DefaultWeatherFxError>,
{
    match body() {
        Ok(()) => {
            clear_last_error();
            WeatherFxErrorCode::Ok
        }
        Err(e) => track_error(&e),
    }
}

/// Borrow an instance from a raw pointer.
pub(crate) fn instance_from_ptr<'a>(
    ptr: *const WeatherFxInstance,
) -> Result<&'a WeatherFxInstance, DefaultWeatherFxError> {
    // SAFETY: callers promise `ptr` is null or came from `weather_fx_new` and is still live.
    unsafe { ptr.as_ref() }.ok_or_else(|| DefaultWeatherFxError::null_pointer("ptr"))
}

/// Run `func` with exclusive access to the engine.
pub(crate) fn with_engine<F, T>(instance: &WeatherFxInstance, func: F) -> Result<T, DefaultWeatherFxError>
where
    F: FnOnce(&mut EffectsEngine) -> T,
{
    let mut engine = instance
        .engine
        .lock()
        .map_err(|_| DefaultWeatherFxError::lock_poisoned("engine"))?;
    Ok(func(&mut engine))
}
