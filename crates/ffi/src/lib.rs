//! C ABI for the weather effects engine.
//!
//! Every function returns a [`WeatherFxErrorCode`]; details of the last
//! failure on the calling thread are available through
//! [`weather_fx_get_last_error`]. Timestamps are host milliseconds.

mod error;
mod helpers;
mod instance;
mod queries;
mod session;

pub use error::{weather_fx_get_last_error, weather_fx_get_last_error_code, WeatherFxErrorCode};
pub use instance::{weather_fx_destroy, weather_fx_new, weather_fx_new_with_host, WeatherFxInstance};
pub use queries::{
    weather_fx_clear_snapshots, weather_fx_get_ambient, weather_fx_get_store_state, weather_fx_get_trail,
    weather_fx_take_thunder_audio, AmbientParticleFfi, TrailParticleFfi, WeatherFxStoreState,
};
pub use session::{
    weather_fx_clear_weather, weather_fx_pointer_move, weather_fx_pointer_press, weather_fx_set_sound_enabled,
    weather_fx_set_suppressed, weather_fx_tick, weather_fx_update_from_json, weather_fx_update_weather,
    WeatherFxFrame, WEATHER_FX_MISSING_CODE,
};
