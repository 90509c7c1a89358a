//! Turns a [`ToastRequest`] into a fully-populated [`Toast`].
//!
//! Resolution order for every field: explicit caller value, then the default
//! implied by the effective dismiss mode, then the queue [`Defaults`].

use tokio::time::Instant;
use tracing::warn;

use crate::config::Defaults;
use crate::toast::{Toast, ToastId, ToastRequest};
use crate::types::DismissMode;

/// Builds the record. Never fails: an `action-only` toast without an action
/// falls back to `gesture` and a warning is logged.
pub fn resolve(request: ToastRequest, defaults: &Defaults, now: Instant) -> Toast {
    let ToastRequest {
        id,
        message,
        title,
        variant,
        icon,
        action,
        duration,
        dismiss_mode,
        show_handlebar,
        swipe_enabled,
        on_show,
        on_dismiss,
    } = request;

    let id = id.unwrap_or_else(ToastId::generate);
    let requested = dismiss_mode.unwrap_or(defaults.dismiss_mode);
    let dismiss_mode = effective_mode(&id, requested, action.is_some());
    let gesture = dismiss_mode.is_gesture();
    let duration = duration.unwrap_or(defaults.duration);

    Toast {
        id,
        message,
        title,
        variant: variant.unwrap_or(defaults.variant),
        icon,
        action,
        duration,
        dismiss_mode,
        show_handlebar: show_handlebar.unwrap_or(gesture),
        swipe_enabled: swipe_enabled.unwrap_or(gesture),
        remaining: duration,
        is_paused: false,
        is_exiting: false,
        created_at: now,
        generation: 0,
        on_show,
        on_dismiss,
    }
}

/// `action-only` needs something to click; without it the toast could never
/// be closed by hand.
pub(crate) fn effective_mode(
    id: &ToastId,
    requested: DismissMode,
    has_action: bool,
) -> DismissMode {
    if requested == DismissMode::ActionOnly && !has_action {
        warn!(
            toast_id = %id,
            "dismiss mode `action-only` requires an action; falling back to `gesture`"
        );
        return DismissMode::Gesture;
    }
    requested
}
