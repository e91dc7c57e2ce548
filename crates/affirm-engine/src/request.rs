//! Confirmation requests and their settlement.
//!
//! `confirm` registers a request synchronously and returns a `Confirmation`
//! future. The matching `Settler` stays with the request inside the
//! orchestrator and is consumed when the outcome is known, so a request can
//! be settled at most once.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use affirm_core::options::DialogPatch;
use affirm_core::types::{Icon, RequestId, Variant};
use tokio::sync::oneshot;

use crate::action::{CancelFn, ConfirmAction};
use crate::error::{ActionError, ConfirmError};

/// What a call site asks for: dialog overrides plus optional handlers.
#[derive(Default)]
pub struct ConfirmRequest {
    pub(crate) patch: DialogPatch,
    pub(crate) on_confirm: Option<Arc<dyn ConfirmAction>>,
    pub(crate) on_cancel: Option<CancelFn>,
}

impl std::fmt::Debug for ConfirmRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfirmRequest")
            .field("patch", &self.patch)
            .field("has_on_confirm", &self.on_confirm.is_some())
            .field("has_on_cancel", &self.on_cancel.is_some())
            .finish()
    }
}

impl ConfirmRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing set of dialog overrides.
    pub fn with_patch(patch: DialogPatch) -> Self {
        Self {
            patch,
            ..Self::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.patch = self.patch.title(title);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.patch = self.patch.description(description);
        self
    }

    pub fn confirm_text(mut self, text: impl Into<String>) -> Self {
        self.patch = self.patch.confirm_text(text);
        self
    }

    pub fn cancel_text(mut self, text: impl Into<String>) -> Self {
        self.patch = self.patch.cancel_text(text);
        self
    }

    pub fn icon(mut self, icon: Icon) -> Self {
        self.patch = self.patch.icon(icon);
        self
    }

    pub fn variant(mut self, variant: Variant) -> Self {
        self.patch = self.patch.variant(variant);
        self
    }

    /// Run `action` when the user confirms. The request settles to `true`
    /// only after it succeeds.
    pub fn on_confirm<F, Fut>(mut self, action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
    {
        self.on_confirm = Some(Arc::new(action));
        self
    }

    /// Use an already shared action.
    pub fn on_confirm_action(mut self, action: Arc<dyn ConfirmAction>) -> Self {
        self.on_confirm = Some(action);
        self
    }

    /// Call `handler` when the user cancels.
    pub fn on_cancel<F>(mut self, handler: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_cancel = Some(Box::new(handler));
        self
    }

    pub fn patch(&self) -> &DialogPatch {
        &self.patch
    }
}

/// Resolver owned by an open request.
#[derive(Debug)]
pub(crate) struct Settler {
    tx: oneshot::Sender<bool>,
}

impl Settler {
    /// Settle the request. The caller may have stopped waiting; that is fine.
    pub(crate) fn settle(self, outcome: bool) {
        let _ = self.tx.send(outcome);
    }

    /// Returns `true` if the caller dropped its `Confirmation`.
    pub(crate) fn is_abandoned(&self) -> bool {
        self.tx.is_closed()
    }
}

#[derive(Debug)]
enum Inner {
    Pending(oneshot::Receiver<bool>),
    Rejected(Option<ConfirmError>),
}

/// Future returned by `confirm`.
///
/// Resolves to `Ok(true)` when the user confirms and the action succeeds,
/// `Ok(false)` when the dialog is cancelled or closed, and `Err` when the
/// request was refused or the orchestrator went away first.
#[derive(Debug)]
#[must_use = "a confirmation does nothing unless awaited"]
pub struct Confirmation {
    id: RequestId,
    inner: Inner,
}

impl Confirmation {
    pub(crate) fn pending(id: RequestId) -> (Self, Settler) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                id,
                inner: Inner::Pending(rx),
            },
            Settler { tx },
        )
    }

    pub(crate) fn rejected(id: RequestId, err: ConfirmError) -> Self {
        Self {
            id,
            inner: Inner::Rejected(Some(err)),
        }
    }

    /// Identifier of the underlying request.
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Returns `true` if the request was refused at `confirm` time.
    pub fn is_rejected(&self) -> bool {
        matches!(self.inner, Inner::Rejected(_))
    }
}

impl Future for Confirmation {
    type Output = Result<bool, ConfirmError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.inner {
            Inner::Pending(rx) => Pin::new(rx)
                .poll(cx)
                .map(|res| res.map_err(|_| ConfirmError::Dropped)),
            Inner::Rejected(err) => Poll::Ready(Err(err.take().unwrap_or(ConfirmError::Dropped))),
        }
    }
}
