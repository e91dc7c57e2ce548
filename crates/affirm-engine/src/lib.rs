//! Confirmation orchestration engine for Affirm.
//!
//! Tracks at most one open confirmation dialog, hands the caller a future
//! that settles to the user's answer, and drives the loading/success/error
//! lifecycle of the optional confirm action.

pub mod action;
pub mod context;
pub mod error;
pub mod orchestrator;
pub mod presenter;
pub mod request;
pub mod state;

pub use action::{CancelFn, ConfirmAction};
pub use context::{ConfirmHandle, ContextGuard};
pub use error::{ActionError, ConfirmError};
pub use orchestrator::Orchestrator;
pub use presenter::{DialogView, Presenter, StatusIcon};
pub use request::{Confirmation, ConfirmRequest};
pub use state::{DialogPhase, DialogState};
