use std::num::NonZeroUsize;
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;

use ::serde::Serialize;

use crate::Result;
use crate::error::Error as ToastError;
use crate::types::{DismissMode, Position, Variant};

mod defaults;
mod env;
mod raw;
mod serde;

pub(crate) use self::serde::HumantimeDuration;

const MAX_VISIBLE_BOUNDS: RangeInclusive<usize> = 1..=100;

/// Everything the composition root needs to build a [`crate::ToastQueue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub queue: QueueConfig,
    pub defaults: Defaults,
    /// Capacity of the lifecycle event channel.
    pub event_buffer: usize,
    /// How many removed ids are remembered to refuse reuse.
    pub tombstones: NonZeroUsize,
}

/// Display configuration shared by every toast of a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueConfig {
    pub position: Position,
    pub max_visible: NonZeroUsize,
    /// Pixels between stacked toasts. The engine never reads it.
    pub gap: u16,
}

/// Values applied when a request leaves a field unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Defaults {
    pub duration: Duration,
    pub dismiss_mode: DismissMode,
    pub variant: Variant,
}

impl Settings {
    /// Load settings from an optional TOML file and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration file cannot be parsed, when an
    /// environment override is malformed, or when the resulting values fail
    /// validation.
    pub fn from_env_and_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut raw = raw::load(path).map_err(ToastError::from)?;
        raw.apply_env_overrides().map_err(ToastError::from)?;
        raw.validate_and_build()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            queue: QueueConfig::default(),
            defaults: Defaults::default(),
            event_buffer: defaults::default_event_buffer(),
            tombstones: non_zero(defaults::default_tombstones()),
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            position: Position::default(),
            max_visible: non_zero(defaults::default_max_visible()),
            gap: defaults::default_gap(),
        }
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            duration: defaults::default_duration(),
            dismiss_mode: DismissMode::default(),
            variant: Variant::default(),
        }
    }
}

fn non_zero(value: usize) -> NonZeroUsize {
    NonZeroUsize::new(value).unwrap_or(NonZeroUsize::MIN)
}
