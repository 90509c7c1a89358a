use std::time::Duration;

use humantime::parse_duration;

use crate::error::ConfigError;

pub(super) fn env_string(key: &'static str) -> std::result::Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(ConfigError::Other(err.to_string())),
    }
}

pub(super) fn env_parse<T>(key: &'static str) -> std::result::Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let Some(value) = env_string(key)? else {
        return Ok(None);
    };
    if value.trim().is_empty() {
        return Ok(None);
    }
    value
        .trim()
        .parse::<T>()
        .map(Some)
        .map_err(|err| ConfigError::InvalidField {
            field: key,
            message: err.to_string(),
        })
}

/// Durations accept humantime strings ("4s", "1500ms") or bare milliseconds.
pub(super) fn env_duration(
    key: &'static str,
) -> std::result::Result<Option<Duration>, ConfigError> {
    let Some(value) = env_string(key)? else {
        return Ok(None);
    };
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    if let Ok(millis) = value.parse::<u64>() {
        return Ok(Some(Duration::from_millis(millis)));
    }
    parse_duration(value)
        .map(Some)
        .map_err(|err| ConfigError::InvalidField {
            field: key,
            message: err.to_string(),
        })
}
