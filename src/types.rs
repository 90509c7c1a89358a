use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Visual flavour of a toast. Opaque to the queue, carried for the renderer.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Default,
    Success,
    Error,
    Warning,
    Info,
}

impl Variant {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warning),
            "info" => Ok(Self::Info),
            other => Err(format!("unknown variant: {other}")),
        }
    }
}

/// How a toast may be closed by the user.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DismissMode {
    /// Swipe or handlebar.
    #[default]
    Gesture,
    /// Only through the toast's action button.
    ActionOnly,
    /// Timer only.
    Auto,
}

impl DismissMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gesture => "gesture",
            Self::ActionOnly => "action-only",
            Self::Auto => "auto",
        }
    }

    pub const fn is_gesture(self) -> bool {
        matches!(self, Self::Gesture)
    }
}

impl Display for DismissMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DismissMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "gesture" => Ok(Self::Gesture),
            "action-only" | "action" => Ok(Self::ActionOnly),
            "auto" => Ok(Self::Auto),
            other => Err(format!("unknown dismiss mode: {other}")),
        }
    }
}

/// Screen anchor the toast stack grows from.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    TopLeft,
    TopCenter,
    TopRight,
    BottomLeft,
    BottomCenter,
    #[default]
    BottomRight,
}

impl Position {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopCenter => "top-center",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomCenter => "bottom-center",
            Self::BottomRight => "bottom-right",
        }
    }

    /// Anchored to the top edge of the screen.
    pub const fn is_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopCenter | Self::TopRight)
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "top-left" => Ok(Self::TopLeft),
            "top-center" | "top" => Ok(Self::TopCenter),
            "top-right" => Ok(Self::TopRight),
            "bottom-left" => Ok(Self::BottomLeft),
            "bottom-center" | "bottom" => Ok(Self::BottomCenter),
            "bottom-right" => Ok(Self::BottomRight),
            other => Err(format!("unknown position: {other}")),
        }
    }
}
