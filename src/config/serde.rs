use std::time::Duration;

use humantime::{format_duration, parse_duration};
use serde::Deserialize;
use serde_with::{DeserializeAs, SerializeAs};

/// Durations written as "4s" / "1500ms", or as a bare integer of milliseconds.
pub(crate) struct HumantimeDuration;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDuration {
    Millis(u64),
    Text(String),
}

impl<'de> DeserializeAs<'de, Duration> for HumantimeDuration {
    fn deserialize_as<D>(deserializer: D) -> std::result::Result<Duration, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match RawDuration::deserialize(deserializer)? {
            RawDuration::Millis(ms) => Ok(Duration::from_millis(ms)),
            RawDuration::Text(raw) => parse_duration(&raw).map_err(serde::de::Error::custom),
        }
    }
}

impl SerializeAs<Duration> for HumantimeDuration {
    fn serialize_as<S>(value: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&format_duration(*value).to_string())
    }
}
