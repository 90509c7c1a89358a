//! The notification record and the requests/patches that produce it.

use std::fmt::{self, Display};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_with::serde_as;
use tokio::time::Instant;
use uuid::Uuid;

use crate::config::HumantimeDuration;
use crate::types::{DismissMode, Variant};

/// Identifier of a toast. Generated ids are UUIDv7 strings; callers may
/// bring their own.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ToastId(String);

impl ToastId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ToastId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ToastId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// User hook invoked with a snapshot of the toast it belongs to.
#[derive(Clone)]
pub struct Callback(Arc<dyn Fn(&Toast) + Send + Sync>);

impl Callback {
    pub fn new(f: impl Fn(&Toast) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub(crate) fn call(&self, toast: &Toast) {
        (self.0)(toast);
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

/// Button rendered inside a toast.
#[derive(Clone, Debug, Serialize)]
pub struct Action {
    pub label: String,
    #[serde(skip)]
    pub on_click: Option<Callback>,
    /// Close the toast once the button is pressed.
    pub dismiss_on_click: bool,
}

impl Action {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            on_click: None,
            dismiss_on_click: true,
        }
    }

    #[must_use]
    pub fn on_click(mut self, f: impl Fn(&Toast) + Send + Sync + 'static) -> Self {
        self.on_click = Some(Callback::new(f));
        self
    }

    #[must_use]
    pub const fn keep_open(mut self) -> Self {
        self.dismiss_on_click = false;
        self
    }
}

/// A queued notification and its timing state.
#[serde_as]
#[derive(Clone, Debug, Serialize)]
pub struct Toast {
    pub id: ToastId,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub variant: Variant,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    /// Zero disables auto-dismiss.
    #[serde_as(as = "HumantimeDuration")]
    pub duration: Duration,
    pub dismiss_mode: DismissMode,
    pub show_handlebar: bool,
    pub swipe_enabled: bool,
    #[serde_as(as = "HumantimeDuration")]
    pub(crate) remaining: Duration,
    pub(crate) is_paused: bool,
    pub(crate) is_exiting: bool,
    #[serde(skip)]
    pub(crate) created_at: Instant,
    #[serde(skip)]
    pub(crate) generation: u64,
    #[serde(skip)]
    pub(crate) on_show: Option<Callback>,
    #[serde(skip)]
    pub(crate) on_dismiss: Option<Callback>,
}

impl Toast {
    /// Budget stored at the last pause (or the full duration before any).
    pub const fn remaining(&self) -> Duration {
        self.remaining
    }

    pub const fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub const fn is_exiting(&self) -> bool {
        self.is_exiting
    }

    pub const fn auto_dismisses(&self) -> bool {
        !self.duration.is_zero()
    }

    /// Time left before auto-dismiss as of `now`. Frozen while paused.
    pub fn time_left(&self, now: Instant) -> Duration {
        if self.is_paused {
            return self.remaining;
        }
        self.remaining
            .saturating_sub(now.saturating_duration_since(self.created_at))
    }

    pub(crate) fn pause(&mut self, now: Instant) {
        self.remaining = self.time_left(now);
        self.is_paused = true;
    }

    pub(crate) fn resume(&mut self, now: Instant) {
        self.is_paused = false;
        self.created_at = now;
    }

    /// Restart the countdown from the full duration.
    pub(crate) fn rearm(&mut self, now: Instant) {
        self.remaining = self.duration;
        self.created_at = now;
    }

    /// Shallow merge. Returns `true` when the duration changed.
    pub(crate) fn merge(&mut self, patch: ToastPatch) -> bool {
        let ToastPatch {
            message,
            title,
            variant,
            icon,
            action,
            duration,
            dismiss_mode,
            show_handlebar,
            swipe_enabled,
        } = patch;

        if let Some(message) = message {
            self.message = message;
        }
        if let Some(title) = title {
            self.title = Some(title);
        }
        if let Some(variant) = variant {
            self.variant = variant;
        }
        if let Some(icon) = icon {
            self.icon = Some(icon);
        }
        if let Some(action) = action {
            self.action = Some(action);
        }
        if let Some(mode) = dismiss_mode {
            self.dismiss_mode = mode;
        }
        if let Some(show) = show_handlebar {
            self.show_handlebar = show;
        }
        if let Some(swipe) = swipe_enabled {
            self.swipe_enabled = swipe;
        }
        match duration {
            Some(duration) if duration != self.duration => {
                self.duration = duration;
                self.remaining = self.remaining.min(duration);
                true
            }
            _ => false,
        }
    }
}

/// What a caller asks for. Unset fields are filled by the resolver.
#[derive(Clone, Debug, Default)]
pub struct ToastRequest {
    pub id: Option<ToastId>,
    pub message: String,
    pub title: Option<String>,
    pub variant: Option<Variant>,
    pub icon: Option<String>,
    pub action: Option<Action>,
    pub duration: Option<Duration>,
    pub dismiss_mode: Option<DismissMode>,
    pub show_handlebar: Option<bool>,
    pub swipe_enabled: Option<bool>,
    pub on_show: Option<Callback>,
    pub on_dismiss: Option<Callback>,
}

impl ToastRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<ToastId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub const fn variant(mut self, variant: Variant) -> Self {
        self.variant = Some(variant);
        self
    }

    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    #[must_use]
    pub fn action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    #[must_use]
    pub const fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Never auto-dismiss.
    #[must_use]
    pub const fn sticky(self) -> Self {
        self.duration(Duration::ZERO)
    }

    #[must_use]
    pub const fn dismiss_mode(mut self, mode: DismissMode) -> Self {
        self.dismiss_mode = Some(mode);
        self
    }

    #[must_use]
    pub const fn show_handlebar(mut self, show: bool) -> Self {
        self.show_handlebar = Some(show);
        self
    }

    #[must_use]
    pub const fn swipe_enabled(mut self, enabled: bool) -> Self {
        self.swipe_enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn on_show(mut self, f: impl Fn(&Toast) + Send + Sync + 'static) -> Self {
        self.on_show = Some(Callback::new(f));
        self
    }

    #[must_use]
    pub fn on_dismiss(mut self, f: impl Fn(&Toast) + Send + Sync + 'static) -> Self {
        self.on_dismiss = Some(Callback::new(f));
        self
    }
}

impl From<&str> for ToastRequest {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ToastRequest {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Fields to overwrite on a live toast. `None` keeps the current value.
#[derive(Clone, Debug, Default)]
pub struct ToastPatch {
    pub message: Option<String>,
    pub title: Option<String>,
    pub variant: Option<Variant>,
    pub icon: Option<String>,
    pub action: Option<Action>,
    /// Changing the duration restarts the countdown.
    pub duration: Option<Duration>,
    pub dismiss_mode: Option<DismissMode>,
    pub show_handlebar: Option<bool>,
    pub swipe_enabled: Option<bool>,
}
