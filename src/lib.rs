#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

//! Toast queue and dismissal lifecycle.
//!
//! A [`ToastQueue`] keeps the live toasts in insertion order, sheds the
//! oldest one when `max_visible` is exceeded, auto-dismisses toasts when
//! their time budget runs out (pauses excluded) and removes them after a
//! short exit grace period. Rendering is left to the caller, who reads
//! [`ToastQueue::render_order`] after every [`QueueEvent`].

pub mod config;
pub mod error;
pub mod queue;
pub mod render;
pub mod resolver;
pub mod telemetry;
pub mod toast;
pub mod types;

pub use config::{QueueConfig, Settings};
pub use queue::{EXIT_GRACE, QueueEvent, ToastQueue};
pub use toast::{Action, Toast, ToastId, ToastPatch, ToastRequest};
pub use types::{DismissMode, Position, Variant};

pub type Result<T> = std::result::Result<T, error::Error>;
