//! Process-wide access to one orchestrator.
//!
//! Call sites that cannot have a `ConfirmHandle` passed to them look it up
//! with `current()`. The composition root must `install` one first; until
//! then, and after teardown, lookups fail with `ConfirmError::NoOrchestrator`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use affirm_core::options::DialogPatch;

use crate::error::ConfirmError;
use crate::orchestrator::Orchestrator;
use crate::request::{ConfirmRequest, Confirmation};

static CURRENT: RwLock<Option<Installed>> = RwLock::new(None);
static NEXT_INSTALL: AtomicU64 = AtomicU64::new(1);

struct Installed {
    id: u64,
    handle: ConfirmHandle,
}

/// The call-site surface of an orchestrator: request, update, dismiss.
///
/// Driving the dialog (`handle_confirm`/`handle_cancel`) is left to the
/// presenter, which holds the `Orchestrator` itself.
#[derive(Clone, Debug)]
pub struct ConfirmHandle {
    orchestrator: Orchestrator,
}

impl ConfirmHandle {
    pub(crate) fn new(orchestrator: Orchestrator) -> Self {
        Self { orchestrator }
    }

    /// See [`Orchestrator::confirm`].
    pub fn confirm(&self, request: ConfirmRequest) -> Confirmation {
        self.orchestrator.confirm(request)
    }

    /// See [`Orchestrator::update_dialog`].
    pub fn update_dialog(&self, patch: &DialogPatch) -> bool {
        self.orchestrator.update_dialog(patch)
    }

    /// See [`Orchestrator::close_dialog`].
    pub fn close_dialog(&self) {
        self.orchestrator.close_dialog()
    }
}

/// Uninstalls the context handle when dropped.
///
/// A guard only removes the handle it installed; if the context was torn
/// down and reinstalled in the meantime, dropping a stale guard does nothing.
#[derive(Debug)]
#[must_use = "the context is torn down when the guard is dropped"]
pub struct ContextGuard {
    install_id: u64,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let mut slot = CURRENT.write().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|i| i.id == self.install_id) {
            *slot = None;
            tracing::debug!("Confirmation context torn down");
        }
    }
}

/// Install `handle` as the process-wide orchestrator.
///
/// Fails with `AlreadyInstalled` if another one is installed.
pub fn install(handle: ConfirmHandle) -> Result<ContextGuard, ConfirmError> {
    let mut slot = CURRENT.write().unwrap_or_else(PoisonError::into_inner);
    if slot.is_some() {
        return Err(ConfirmError::AlreadyInstalled);
    }
    let install_id = NEXT_INSTALL.fetch_add(1, Ordering::Relaxed);
    *slot = Some(Installed {
        id: install_id,
        handle,
    });
    tracing::debug!("Confirmation context installed");
    Ok(ContextGuard { install_id })
}

/// The installed handle, or `NoOrchestrator`.
pub fn current() -> Result<ConfirmHandle, ConfirmError> {
    CURRENT
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .map(|i| i.handle.clone())
        .ok_or(ConfirmError::NoOrchestrator)
}

/// Returns `true` if a handle is installed.
pub fn is_installed() -> bool {
    CURRENT
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .is_some()
}

/// Remove the installed handle. Open dialogs are unaffected.
pub fn teardown() {
    let previous = CURRENT
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    if previous.is_some() {
        tracing::debug!("Confirmation context torn down");
    }
}
