//! Presentation adapter contract.
//!
//! A presenter owns no dialog state. It renders a `DialogView` derived from
//! the orchestrator's snapshot and forwards user gestures back with
//! `dispatch`. `drive` re-renders on every state change.

use affirm_core::types::{DialogStatus, Icon, Variant};
use tokio::sync::watch;

use crate::orchestrator::Orchestrator;
use crate::state::DialogState;

pub const LOADING_LABEL: &str = "Loading...";

/// Glyph shown at the top of the dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusIcon {
    /// Default glyph for a pending question.
    Warning,
    /// Caller-supplied icon, shown while idle.
    Custom(Icon),
    /// The action is running.
    Spinner,
    /// The action failed.
    Failure,
    /// The action succeeded.
    Success,
}

/// Colour of the dialog body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Normal,
    Error,
    Success,
}

/// A user gesture a presenter can forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Confirm,
    Cancel,
}

/// Everything a renderer needs, with the interaction rules already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogView {
    pub visible: bool,
    pub title: String,
    /// Description, or the status message replacing it.
    pub body: Option<String>,
    pub tone: Tone,
    pub icon: StatusIcon,
    pub confirm_label: String,
    pub cancel_label: String,
    pub confirm_variant: Variant,
    pub confirm_enabled: bool,
    pub cancel_enabled: bool,
}

impl DialogView {
    /// Returns `true` if the control for `gesture` is enabled.
    pub fn accepts(&self, gesture: Gesture) -> bool {
        match gesture {
            Gesture::Confirm => self.confirm_enabled,
            Gesture::Cancel => self.cancel_enabled,
        }
    }
}

impl From<&DialogState> for DialogView {
    fn from(state: &DialogState) -> Self {
        let opts = &state.options;
        let loading = state.status == DialogStatus::Loading;

        let (body, tone) = match (state.status, &state.status_message) {
            (DialogStatus::Error, Some(msg)) => (Some(msg.clone()), Tone::Error),
            (DialogStatus::Success, Some(msg)) => (Some(msg.clone()), Tone::Success),
            _ if opts.description.is_empty() => (None, Tone::Normal),
            _ => (Some(opts.description.clone()), Tone::Normal),
        };

        let icon = match state.status {
            DialogStatus::Loading => StatusIcon::Spinner,
            DialogStatus::Error => StatusIcon::Failure,
            DialogStatus::Success => StatusIcon::Success,
            DialogStatus::Idle => match &opts.icon {
                Some(icon) => StatusIcon::Custom(icon.clone()),
                None => StatusIcon::Warning,
            },
        };

        let confirm_label = if loading {
            LOADING_LABEL.to_string()
        } else {
            opts.confirm_text.clone()
        };

        Self {
            visible: state.is_open,
            title: opts.title.clone(),
            body,
            tone,
            icon,
            confirm_label,
            cancel_label: opts.cancel_text.clone(),
            confirm_variant: opts.variant,
            confirm_enabled: state.is_open && !loading && state.status != DialogStatus::Success,
            cancel_enabled: state.is_open && !loading,
        }
    }
}

/// A renderer for the confirmation dialog.
pub trait Presenter {
    fn render(&mut self, view: &DialogView);
}

/// Render every state change until the orchestrator is dropped.
pub async fn drive<P: Presenter + ?Sized>(presenter: &mut P, mut rx: watch::Receiver<DialogState>) {
    loop {
        let view = DialogView::from(&*rx.borrow_and_update());
        presenter.render(&view);
        if rx.changed().await.is_err() {
            tracing::debug!("Orchestrator gone, presenter loop finished");
            return;
        }
    }
}

/// Forward a gesture, honouring the disabled state of its control.
///
/// Returns `false` if the gesture was dropped because the control is
/// disabled.
pub async fn dispatch(orchestrator: &Orchestrator, gesture: Gesture) -> bool {
    let view = DialogView::from(&orchestrator.state());
    if !view.accepts(gesture) {
        tracing::debug!(?gesture, "Gesture ignored: control disabled");
        return false;
    }
    match gesture {
        Gesture::Confirm => orchestrator.handle_confirm().await,
        Gesture::Cancel => orchestrator.handle_cancel(),
    }
    true
}
