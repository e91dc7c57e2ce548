use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// Visual emphasis of the confirm button.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Neutral confirmation.
    #[default]
    Default,
    /// Irreversible or dangerous action (delete, purge).
    Destructive,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Default => write!(f, "default"),
            Variant::Destructive => write!(f, "destructive"),
        }
    }
}

/// Lifecycle status of the action attached to an open dialog.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogStatus {
    /// Waiting for the user.
    #[default]
    Idle,
    /// The confirm action is running.
    Loading,
    /// The confirm action completed; the dialog closes shortly.
    Success,
    /// The confirm action failed; the user may retry or cancel.
    Error,
}

impl fmt::Display for DialogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialogStatus::Idle => write!(f, "idle"),
            DialogStatus::Loading => write!(f, "loading"),
            DialogStatus::Success => write!(f, "success"),
            DialogStatus::Error => write!(f, "error"),
        }
    }
}

/// Policy applied when `confirm` is called while a dialog is already open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusyPolicy {
    /// Fail the new request immediately; the open dialog is untouched.
    #[default]
    Reject,
    /// Hold the new request and show it once the open dialog closes.
    Queue,
}

impl fmt::Display for BusyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusyPolicy::Reject => write!(f, "reject"),
            BusyPolicy::Queue => write!(f, "queue"),
        }
    }
}

// =============================================================================
// Newtype Wrappers
// =============================================================================

/// Opaque renderable icon.
///
/// The engine carries it untouched; presenters decide what the key means
/// (a glyph, an asset name, an emoji).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Icon(pub String);

impl Icon {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Unique identifier for a confirmation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unix timestamp in milliseconds since epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp_millis())
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.0).unwrap_or_default()
    }
}
