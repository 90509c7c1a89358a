use std::num::NonZeroUsize;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use serde_with::serde_as;

use crate::Result;
use crate::error::ConfigError;
use crate::types::{DismissMode, Position, Variant};

use super::defaults::{
    default_duration, default_event_buffer, default_gap, default_max_visible, default_tombstones,
};
use super::env::{env_duration, env_parse, env_string};
use super::{Defaults, HumantimeDuration, MAX_VISIBLE_BOUNDS, QueueConfig, Settings};

pub(super) fn load(path: impl AsRef<Path>) -> std::result::Result<RawConfig, ConfigError> {
    let mut builder = ::config::Config::builder();
    let path = path.as_ref();
    builder = builder.add_source(::config::File::from(path).required(false));
    builder = builder.add_source(
        ::config::Environment::with_prefix("TOASTQ")
            .separator("__")
            .try_parsing(true),
    );

    builder
        .build()
        .map_err(|err| ConfigError::Other(err.to_string()))?
        .try_deserialize()
        .map_err(|err| ConfigError::Parse(err.to_string()))
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub(super) queue: RawQueue,
    #[serde(default)]
    pub(super) toast: RawToast,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawQueue {
    #[serde(default)]
    pub(super) position: Option<String>,
    #[serde(default = "default_max_visible")]
    pub(super) max_visible: usize,
    #[serde(default = "default_gap")]
    pub(super) gap: u16,
    #[serde(default = "default_event_buffer")]
    pub(super) event_buffer: usize,
    #[serde(default = "default_tombstones")]
    pub(super) tombstones: usize,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(super) struct RawToast {
    #[serde(default = "default_duration")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) duration: Duration,
    #[serde(default)]
    pub(super) dismiss_mode: Option<String>,
    #[serde(default)]
    pub(super) variant: Option<String>,
}

impl RawConfig {
    pub(super) fn apply_env_overrides(&mut self) -> std::result::Result<(), ConfigError> {
        if let Some(position) = env_string("TOAST_POSITION")? {
            self.queue.position = Some(position);
        }
        if let Some(max_visible) = env_parse::<usize>("TOAST_MAX_VISIBLE")? {
            self.queue.max_visible = max_visible;
        }
        if let Some(gap) = env_parse::<u16>("TOAST_GAP")? {
            self.queue.gap = gap;
        }
        if let Some(buffer) = env_parse::<usize>("TOAST_EVENT_BUFFER")? {
            self.queue.event_buffer = buffer;
        }
        if let Some(tombstones) = env_parse::<usize>("TOAST_TOMBSTONES")? {
            self.queue.tombstones = tombstones;
        }
        if let Some(duration) = env_duration("TOAST_DURATION")? {
            self.toast.duration = duration;
        }
        if let Some(mode) = env_string("TOAST_DISMISS_MODE")? {
            self.toast.dismiss_mode = Some(mode);
        }
        Ok(())
    }

    pub(super) fn validate_and_build(self) -> Result<Settings> {
        let position = parse_field::<Position>("queue.position", self.queue.position)?;
        let dismiss_mode =
            parse_field::<DismissMode>("toast.dismiss_mode", self.toast.dismiss_mode)?;
        let variant = parse_field::<Variant>("toast.variant", self.toast.variant)?;

        if !MAX_VISIBLE_BOUNDS.contains(&self.queue.max_visible) {
            return Err(ConfigError::InvalidField {
                field: "queue.max_visible",
                message: format!(
                    "expected between {} and {}, got {}",
                    MAX_VISIBLE_BOUNDS.start(),
                    MAX_VISIBLE_BOUNDS.end(),
                    self.queue.max_visible
                ),
            }
            .into());
        }
        let max_visible =
            NonZeroUsize::new(self.queue.max_visible).ok_or(ConfigError::InvalidField {
                field: "queue.max_visible",
                message: "max visible must be greater than zero".to_string(),
            })?;
        if self.queue.event_buffer == 0 {
            return Err(ConfigError::InvalidField {
                field: "queue.event_buffer",
                message: "event buffer must be greater than zero".to_string(),
            }
            .into());
        }
        let tombstones =
            NonZeroUsize::new(self.queue.tombstones).ok_or(ConfigError::InvalidField {
                field: "queue.tombstones",
                message: "tombstone cache must be greater than zero".to_string(),
            })?;

        Ok(Settings {
            queue: QueueConfig {
                position,
                max_visible,
                gap: self.queue.gap,
            },
            defaults: Defaults {
                duration: self.toast.duration,
                dismiss_mode,
                variant,
            },
            event_buffer: self.queue.event_buffer,
            tombstones,
        })
    }
}

fn parse_field<T>(
    field: &'static str,
    raw: Option<String>,
) -> std::result::Result<T, ConfigError>
where
    T: FromStr<Err = String> + Default,
{
    raw.map_or_else(
        || Ok(T::default()),
        |value| {
            T::from_str(value.trim())
                .map_err(|message| ConfigError::InvalidField { field, message })
        },
    )
}

impl Default for RawQueue {
    fn default() -> Self {
        Self {
            position: None,
            max_visible: default_max_visible(),
            gap: default_gap(),
            event_buffer: default_event_buffer(),
            tombstones: default_tombstones(),
        }
    }
}

impl Default for RawToast {
    fn default() -> Self {
        Self {
            duration: default_duration(),
            dismiss_mode: None,
            variant: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RawConfig, RawQueue, RawToast};
    use crate::error::{ConfigError, Error};
    use crate::types::{DismissMode, Position};
    use std::time::Duration;

    #[test]
    fn default_raw_config_builds_default_settings() {
        let settings = match RawConfig::default().validate_and_build() {
            Ok(settings) => settings,
            Err(err) => panic!("default config rejected: {err}"),
        };
        assert_eq!(settings, crate::config::Settings::default());
    }

    #[test]
    fn parses_named_fields() {
        let raw = RawConfig {
            queue: RawQueue {
                position: Some("top-left".into()),
                max_visible: 3,
                ..RawQueue::default()
            },
            toast: RawToast {
                duration: Duration::from_millis(2500),
                dismiss_mode: Some("action-only".into()),
                variant: None,
            },
        };
        let settings = match raw.validate_and_build() {
            Ok(settings) => settings,
            Err(err) => panic!("config rejected: {err}"),
        };
        assert_eq!(settings.queue.position, Position::TopLeft);
        assert_eq!(settings.queue.max_visible.get(), 3);
        assert_eq!(settings.defaults.dismiss_mode, DismissMode::ActionOnly);
        assert_eq!(settings.defaults.duration, Duration::from_millis(2500));
    }

    #[test]
    fn rejects_zero_max_visible() {
        let raw = RawConfig {
            queue: RawQueue {
                max_visible: 0,
                ..RawQueue::default()
            },
            ..RawConfig::default()
        };
        let err = raw.validate_and_build().err();
        assert!(matches!(
            err,
            Some(Error::Config(ConfigError::InvalidField {
                field: "queue.max_visible",
                ..
            }))
        ));
    }

    #[test]
    fn rejects_unknown_position() {
        let raw = RawConfig {
            queue: RawQueue {
                position: Some("middle".into()),
                ..RawQueue::default()
            },
            ..RawConfig::default()
        };
        assert!(matches!(
            raw.validate_and_build(),
            Err(Error::Config(ConfigError::InvalidField {
                field: "queue.position",
                ..
            }))
        ));
    }

    #[test]
    fn parses_toml_sections() {
        let raw: RawConfig = match ::config::Config::builder()
            .add_source(::config::File::from_str(
                "[queue]\nposition = \"top-right\"\ngap = 8\n\n[toast]\nduration = \"6s\"\n",
                ::config::FileFormat::Toml,
            ))
            .build()
            .and_then(|cfg| cfg.try_deserialize())
        {
            Ok(raw) => raw,
            Err(err) => panic!("toml rejected: {err}"),
        };
        assert_eq!(raw.queue.position.as_deref(), Some("top-right"));
        assert_eq!(raw.queue.gap, 8);
        assert_eq!(raw.queue.max_visible, 5);
        assert_eq!(raw.toast.duration, Duration::from_secs(6));
    }
}
