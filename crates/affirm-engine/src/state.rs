//! Dialog state machine.
//!
//! Enforces valid transitions for the confirmation lifecycle:
//! - Closed -> Idle (request opened)
//! - Idle -> Loading, Error -> Loading (confirm pressed)
//! - Loading -> Success / Error (action finished)
//! - Success -> Closed (close timer fired)
//! - Idle / Loading / Success / Error -> Closed (cancel or close)

use std::fmt;

use affirm_core::options::DialogOptions;
use affirm_core::types::{DialogStatus, RequestId};
use serde::{Deserialize, Serialize};

/// Where the dialog is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogPhase {
    /// No request is open.
    Closed,
    /// Open and waiting for the user.
    Idle,
    /// Open with the confirm action running.
    Loading,
    /// Open showing the success message until the close timer fires.
    Success,
    /// Open showing the action's failure message.
    Error,
}

impl fmt::Display for DialogPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialogPhase::Closed => write!(f, "Closed"),
            DialogPhase::Idle => write!(f, "Open/Idle"),
            DialogPhase::Loading => write!(f, "Open/Loading"),
            DialogPhase::Success => write!(f, "Open/Success"),
            DialogPhase::Error => write!(f, "Open/Error"),
        }
    }
}

impl DialogPhase {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &DialogPhase) -> bool {
        use DialogPhase::*;
        matches!(
            (self, target),
            (Closed, Idle)
                | (Idle, Loading)
                | (Error, Loading)
                | (Loading, Success)
                | (Loading, Error)
                // Dismissal
                | (Idle, Closed)
                | (Loading, Closed)
                | (Success, Closed)
                | (Error, Closed)
        )
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, DialogPhase::Closed)
    }

    /// Status reported to presenters. Closed reports `Idle`.
    pub fn status(&self) -> DialogStatus {
        match self {
            DialogPhase::Closed | DialogPhase::Idle => DialogStatus::Idle,
            DialogPhase::Loading => DialogStatus::Loading,
            DialogPhase::Success => DialogStatus::Success,
            DialogPhase::Error => DialogStatus::Error,
        }
    }
}

/// Snapshot of what a presenter needs to render.
///
/// `options` is only meaningful while `is_open` is true; when closed it holds
/// the configured defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogState {
    pub is_open: bool,
    pub request_id: Option<RequestId>,
    pub options: DialogOptions,
    pub status: DialogStatus,
    pub status_message: Option<String>,
    /// Requests waiting behind the open one.
    pub queued: usize,
}

impl DialogState {
    pub fn closed(defaults: DialogOptions, queued: usize) -> Self {
        Self {
            is_open: false,
            request_id: None,
            options: defaults,
            status: DialogStatus::Idle,
            status_message: None,
            queued,
        }
    }
}
