use serde::{Deserialize, Serialize};

use crate::types::{BusyPolicy, RequestId, Timestamp};

/// Lifecycle events emitted by the confirmation orchestrator.
///
/// Consumed by presenters that want transitions rather than snapshots, and
/// by audit/debug listeners.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum ConfirmEvent {
    /// A request became the active dialog.
    Requested {
        request_id: RequestId,
        title: String,
        timestamp: Timestamp,
    },

    /// A request is waiting behind the active dialog.
    Queued {
        request_id: RequestId,
        position: usize,
        timestamp: Timestamp,
    },

    /// A request was refused because a dialog is already open.
    Rejected {
        request_id: RequestId,
        policy: BusyPolicy,
        timestamp: Timestamp,
    },

    /// The confirm action started. `attempt` counts from 1.
    ActionStarted {
        request_id: RequestId,
        attempt: u32,
        timestamp: Timestamp,
    },

    /// The confirm action failed; the dialog stays open.
    ActionFailed {
        request_id: RequestId,
        attempt: u32,
        message: String,
        timestamp: Timestamp,
    },

    /// The request settled to `true`.
    Confirmed {
        request_id: RequestId,
        timestamp: Timestamp,
    },

    /// The request settled to `false`.
    Cancelled {
        request_id: RequestId,
        timestamp: Timestamp,
    },

    /// The dialog for a request is gone.
    Closed {
        request_id: RequestId,
        timestamp: Timestamp,
    },
}

impl ConfirmEvent {
    /// Returns the request the event belongs to.
    pub fn request_id(&self) -> RequestId {
        match self {
            ConfirmEvent::Requested { request_id, .. }
            | ConfirmEvent::Queued { request_id, .. }
            | ConfirmEvent::Rejected { request_id, .. }
            | ConfirmEvent::ActionStarted { request_id, .. }
            | ConfirmEvent::ActionFailed { request_id, .. }
            | ConfirmEvent::Confirmed { request_id, .. }
            | ConfirmEvent::Cancelled { request_id, .. }
            | ConfirmEvent::Closed { request_id, .. } => *request_id,
        }
    }

    /// Returns the timestamp of the event.
    pub fn timestamp(&self) -> Timestamp {
        match self {
            ConfirmEvent::Requested { timestamp, .. }
            | ConfirmEvent::Queued { timestamp, .. }
            | ConfirmEvent::Rejected { timestamp, .. }
            | ConfirmEvent::ActionStarted { timestamp, .. }
            | ConfirmEvent::ActionFailed { timestamp, .. }
            | ConfirmEvent::Confirmed { timestamp, .. }
            | ConfirmEvent::Cancelled { timestamp, .. }
            | ConfirmEvent::Closed { timestamp, .. } => *timestamp,
        }
    }

    /// Returns a short event name for logging.
    pub fn event_name(&self) -> &'static str {
        match self {
            ConfirmEvent::Requested { .. } => "requested",
            ConfirmEvent::Queued { .. } => "queued",
            ConfirmEvent::Rejected { .. } => "rejected",
            ConfirmEvent::ActionStarted { .. } => "action_started",
            ConfirmEvent::ActionFailed { .. } => "action_failed",
            ConfirmEvent::Confirmed { .. } => "confirmed",
            ConfirmEvent::Cancelled { .. } => "cancelled",
            ConfirmEvent::Closed { .. } => "closed",
        }
    }
}
