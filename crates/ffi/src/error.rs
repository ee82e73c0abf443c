use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;
use weather_fx_core::ConfigError;

/// Common interface for FFI error types.
///
/// - `code()` - the error code passed across the FFI boundary
/// - `msg()` - the message kept for `weather_fx_get_last_error`
pub(crate) trait WeatherFxError {
    fn code(&self) -> WeatherFxErrorCode;

    fn msg(&self) -> &str;
}

/// Default implementation of `WeatherFxError` for the errors this crate raises.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultWeatherFxError {
    code: WeatherFxErrorCode,
    msg: String,
}

impl DefaultWeatherFxError {
    /// Null pointer passed where non-null required.
    ///
    /// # Arguments
    /// * `param_name` - The name of the parameter that was null (e.g., `"out_instance"`, `"ptr"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: WeatherFxErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// A panic on another thread poisoned the engine lock.
    pub fn lock_poisoned(lock_name: &str) -> Self {
        Self {
            code: WeatherFxErrorCode::LockPoisoned,
            msg: format!("Lock '{lock_name}' was poisoned by a panic in another thread"),
        }
    }

    /// Argument outside its accepted range.
    ///
    /// # Arguments
    /// * `param_name` - The name of the invalid parameter (e.g., `"weather_type"`, `"kind"`)
    /// * `value` - The rejected value
    pub fn invalid_parameter(param_name: &str, value: impl std::fmt::Display) -> Self {
        Self {
            code: WeatherFxErrorCode::InvalidParameter,
            msg: format!("Parameter '{param_name}' has invalid value {value}"),
        }
    }
}

impl From<ConfigError> for DefaultWeatherFxError {
    fn from(error: ConfigError) -> Self {
        Self {
            code: WeatherFxErrorCode::InvalidConfig,
            msg: format!("Invalid configuration: {error}"),
        }
    }
}

impl WeatherFxError for DefaultWeatherFxError {
    fn code(&self) -> WeatherFxErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

/// FFI error codes returned by weather effects functions.
/// Follows standard C convention: 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherFxErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Invalid pointer: null pointer passed where non-null required.
    NullPointer = 1,

    /// Lock poisoned: internal synchronization primitive was poisoned by a panic.
    LockPoisoned = 2,

    /// The engine configuration was rejected.
    InvalidConfig = 3,

    /// Invalid parameter passed to function.
    InvalidParameter = 4,
}

thread_local! {
    /// Most recent FFI error on this thread (C string, error code).
    /// The CString is kept here so the pointer handed out stays valid.
    static LAST_ERROR: RefCell<(Option<CString>, WeatherFxErrorCode)> = const { RefCell::new((None, WeatherFxErrorCode::Ok)) };
}

pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, WeatherFxErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, WeatherFxErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns:
/// - A borrowed pointer to the error message if an error occurred.
/// - `null` if the last call on this thread succeeded.
///
/// # Lifetime
/// The returned pointer is valid until the next FFI call on this thread.
///
/// **DO NOT FREE THIS POINTER** - it is managed internally.
///
/// Example:
/// ```c
/// WeatherFxInstance* fx = NULL;
/// if (weather_fx_new(0, &fx) != Ok) {
///     const char* error = weather_fx_get_last_error();
///     if (error) {
///         fprintf(stderr, "weather fx: %s\n", error);
///     }
/// }
/// ```
#[no_mangle]
pub extern "C" fn weather_fx_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code (`Ok` if the last call succeeded).
#[no_mangle]
pub extern "C" fn weather_fx_get_last_error_code() -> WeatherFxErrorCode {
    with_last_error(|(_cstring, code)| *code)
}
