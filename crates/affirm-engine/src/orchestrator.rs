//! Confirmation orchestrator.
//!
//! Holds at most one open request, settles the caller's `Confirmation`, runs
//! the optional confirm action and closes the dialog a fixed delay after the
//! action succeeds. Under `BusyPolicy::Queue` further requests wait in FIFO
//! order behind the open one.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use affirm_core::config::{AffirmConfig, EngineConfig};
use affirm_core::events::ConfirmEvent;
use affirm_core::options::{DialogOptions, DialogPatch};
use affirm_core::types::{BusyPolicy, RequestId, Timestamp};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::action::{CancelFn, ConfirmAction};
use crate::context::ConfirmHandle;
use crate::error::{ActionError, ConfirmError};
use crate::request::{ConfirmRequest, Confirmation, Settler};
use crate::state::{DialogPhase, DialogState};

/// A request the orchestrator owns, open or queued.
struct Entry {
    id: RequestId,
    options: DialogOptions,
    on_confirm: Option<Arc<dyn ConfirmAction>>,
    on_cancel: Option<CancelFn>,
    /// `None` once the request has been settled.
    settler: Option<Settler>,
    attempts: u32,
}

struct State {
    phase: DialogPhase,
    active: Option<Entry>,
    queue: VecDeque<Entry>,
    status_message: Option<String>,
    close_timer: Option<JoinHandle<()>>,
}

impl State {
    fn new() -> Self {
        Self {
            phase: DialogPhase::Closed,
            active: None,
            queue: VecDeque::new(),
            status_message: None,
            close_timer: None,
        }
    }

    /// Move to `target` if the lifecycle allows it.
    ///
    /// An invalid transition leaves the phase unchanged and returns `false`.
    fn transition(&mut self, target: DialogPhase) -> bool {
        if !self.phase.can_transition_to(&target) {
            tracing::warn!("Invalid dialog transition: {} -> {}", self.phase, target);
            return false;
        }
        tracing::debug!("Dialog state: {} -> {}", self.phase, target);
        self.phase = target;
        true
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.close_timer.take() {
            timer.abort();
        }
    }
}

struct Inner {
    config: EngineConfig,
    defaults: DialogOptions,
    state: Mutex<State>,
    state_tx: watch::Sender<DialogState>,
    event_tx: broadcast::Sender<ConfirmEvent>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self, state: &State) -> DialogState {
        match &state.active {
            Some(active) => DialogState {
                is_open: true,
                request_id: Some(active.id),
                options: active.options.clone(),
                status: state.phase.status(),
                status_message: state.status_message.clone(),
                queued: state.queue.len(),
            },
            None => DialogState::closed(self.defaults.clone(), state.queue.len()),
        }
    }

    fn publish(&self, state: &State) {
        self.state_tx.send_replace(self.snapshot(state));
    }

    fn emit(&self, event: ConfirmEvent) {
        // No subscribers is the normal case.
        let _ = self.event_tx.send(event);
    }

    /// Make `entry` the open request. The caller guarantees the dialog is closed.
    fn open(&self, state: &mut State, entry: Entry) {
        if !state.transition(DialogPhase::Idle) {
            return;
        }
        state.status_message = None;
        tracing::info!(
            request_id = %entry.id,
            title = %entry.options.title,
            "Confirmation requested"
        );
        self.emit(ConfirmEvent::Requested {
            request_id: entry.id,
            title: entry.options.title.clone(),
            timestamp: Timestamp::now(),
        });
        state.active = Some(entry);
        self.publish(state);
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        state.cancel_timer();
    }
}

/// Orchestrator that coordinates dialog visibility, action execution and
/// settlement. Cloning is cheap and every clone drives the same dialog.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(EngineConfig::default(), DialogOptions::default())
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.inner.config)
            .field("state", &self.state())
            .finish()
    }
}

impl Orchestrator {
    /// Create an orchestrator that merges call-site options onto `defaults`.
    pub fn new(config: EngineConfig, defaults: DialogOptions) -> Self {
        let state = State::new();
        let (state_tx, _) = watch::channel(DialogState::closed(defaults.clone(), 0));
        let (event_tx, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                config,
                defaults,
                state: Mutex::new(state),
                state_tx,
                event_tx,
            }),
        }
    }

    /// Create an orchestrator from the `[engine]` and `[dialog]` sections.
    pub fn from_config(config: &AffirmConfig) -> Self {
        Self::new(config.engine.clone(), config.dialog.to_options())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Current state snapshot.
    pub fn state(&self) -> DialogState {
        let state = self.inner.lock();
        self.inner.snapshot(&state)
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> DialogPhase {
        self.inner.lock().phase
    }

    /// Receive a fresh snapshot on every state change.
    pub fn subscribe(&self) -> watch::Receiver<DialogState> {
        self.inner.state_tx.subscribe()
    }

    /// Receive lifecycle events.
    pub fn events(&self) -> broadcast::Receiver<ConfirmEvent> {
        self.inner.event_tx.subscribe()
    }

    /// The `{confirm, update_dialog, close_dialog}` surface for call sites.
    pub fn handle(&self) -> ConfirmHandle {
        ConfirmHandle::new(self.clone())
    }

    /// Ask the user to confirm.
    ///
    /// The request is registered before this returns; the returned future
    /// only waits for the outcome. If a dialog is already open the configured
    /// `BusyPolicy` decides between an immediate `AlreadyPending` error and
    /// queueing.
    pub fn confirm(&self, request: ConfirmRequest) -> Confirmation {
        let id = RequestId::new();
        let mut guard = self.inner.lock();
        let state = &mut *guard;

        // A non-empty queue counts as busy so queued requests keep their order.
        let busy = state.phase.is_open() || !state.queue.is_empty();
        if busy {
            match self.inner.config.busy_policy {
                BusyPolicy::Reject => {
                    tracing::warn!(request_id = %id, "Confirmation rejected: another is pending");
                    self.inner.emit(ConfirmEvent::Rejected {
                        request_id: id,
                        policy: BusyPolicy::Reject,
                        timestamp: Timestamp::now(),
                    });
                    return Confirmation::rejected(id, ConfirmError::AlreadyPending);
                }
                BusyPolicy::Queue if state.queue.len() >= self.inner.config.max_queue => {
                    let waiting = state.queue.len();
                    tracing::warn!(request_id = %id, waiting, "Confirmation rejected: queue full");
                    self.inner.emit(ConfirmEvent::Rejected {
                        request_id: id,
                        policy: BusyPolicy::Queue,
                        timestamp: Timestamp::now(),
                    });
                    return Confirmation::rejected(id, ConfirmError::QueueFull(waiting));
                }
                BusyPolicy::Queue => {}
            }
        }

        let (confirmation, settler) = Confirmation::pending(id);
        let entry = Entry {
            id,
            options: self.inner.defaults.merged(&request.patch),
            on_confirm: request.on_confirm,
            on_cancel: request.on_cancel,
            settler: Some(settler),
            attempts: 0,
        };

        if busy {
            state.queue.push_back(entry);
            let position = state.queue.len();
            tracing::info!(request_id = %id, position, "Confirmation queued");
            self.inner.emit(ConfirmEvent::Queued {
                request_id: id,
                position,
                timestamp: Timestamp::now(),
            });
            self.inner.publish(state);
        } else {
            self.inner.open(state, entry);
        }
        confirmation
    }

    /// Merge `patch` into the open dialog's options.
    ///
    /// Returns `false` and changes nothing when no dialog is open. Handlers
    /// are never touched.
    pub fn update_dialog(&self, patch: &DialogPatch) -> bool {
        let mut guard = self.inner.lock();
        let state = &mut *guard;
        match state.active.as_mut() {
            Some(active) => {
                active.options.apply(patch);
                tracing::debug!(request_id = %active.id, "Dialog options updated");
                self.inner.publish(state);
                true
            }
            None => {
                tracing::debug!("update_dialog ignored: no open dialog");
                false
            }
        }
    }

    /// The user pressed confirm.
    ///
    /// Ignored while the action is already running, after it succeeded, or
    /// when no dialog is open. A failed action leaves the dialog open in the
    /// error state with the request unsettled.
    pub async fn handle_confirm(&self) {
        let Some((id, attempt, action)) = self.begin_action() else {
            return;
        };

        let result = match action {
            Some(action) => action.run().await,
            None => Ok(()),
        };

        self.finish_action(id, attempt, result);
    }

    fn begin_action(&self) -> Option<(RequestId, u32, Option<Arc<dyn ConfirmAction>>)> {
        let mut guard = self.inner.lock();
        let state = &mut *guard;

        if state.active.is_none() || !state.phase.can_transition_to(&DialogPhase::Loading) {
            tracing::debug!(phase = %state.phase, "handle_confirm ignored");
            return None;
        }

        state.transition(DialogPhase::Loading);
        state.status_message = None;

        let active = state.active.as_mut()?;
        active.attempts += 1;
        let started = (active.id, active.attempts, active.on_confirm.clone());

        self.inner.emit(ConfirmEvent::ActionStarted {
            request_id: started.0,
            attempt: started.1,
            timestamp: Timestamp::now(),
        });
        self.inner.publish(state);
        Some(started)
    }

    fn finish_action(&self, id: RequestId, attempt: u32, result: Result<(), ActionError>) {
        let mut guard = self.inner.lock();
        let state = &mut *guard;

        let still_current = state.active.as_ref().map(|a| a.id) == Some(id)
            && state.phase == DialogPhase::Loading;
        if !still_current {
            tracing::debug!(
                request_id = %id,
                ok = result.is_ok(),
                "Confirm action finished after the dialog was dismissed; result discarded"
            );
            return;
        }

        match result {
            Ok(()) => {
                state.transition(DialogPhase::Success);
                state.status_message = Some(self.inner.config.success_message.clone());
                let settler = state.active.as_mut().and_then(|a| a.settler.take());
                state.cancel_timer();
                state.close_timer = Some(self.schedule_close(id));

                tracing::info!(request_id = %id, attempt, "Confirmation confirmed");
                self.inner.emit(ConfirmEvent::Confirmed {
                    request_id: id,
                    timestamp: Timestamp::now(),
                });
                self.inner.publish(state);
                drop(guard);

                if let Some(settler) = settler {
                    settler.settle(true);
                }
            }
            Err(err) => {
                let message = err
                    .message()
                    .map(str::to_string)
                    .unwrap_or_else(|| self.inner.config.error_fallback_message.clone());
                state.transition(DialogPhase::Error);
                state.status_message = Some(message.clone());

                tracing::warn!(request_id = %id, attempt, error = %message, "Confirm action failed");
                self.inner.emit(ConfirmEvent::ActionFailed {
                    request_id: id,
                    attempt,
                    message,
                    timestamp: Timestamp::now(),
                });
                self.inner.publish(state);
            }
        }
    }

    /// Close the dialog once the success state has been visible long enough.
    fn schedule_close(&self, id: RequestId) -> JoinHandle<()> {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let delay = self.inner.config.success_close_delay();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                Orchestrator { inner }.close_after_success(id);
            }
        })
    }

    fn close_after_success(&self, id: RequestId) {
        {
            let mut guard = self.inner.lock();
            let state = &mut *guard;
            let is_target = state.active.as_ref().map(|a| a.id) == Some(id)
                && state.phase == DialogPhase::Success;
            if !is_target {
                tracing::debug!(request_id = %id, "Stale close timer ignored");
                return;
            }
            // This task is the timer; drop its handle instead of aborting it.
            state.close_timer = None;
            self.close_active(state);
        }
        self.promote_next();
    }

    /// The user pressed cancel or dismissed the dialog.
    ///
    /// Allowed in every open state, including while the action runs; the
    /// action itself keeps running and its result is discarded. Invokes
    /// `on_cancel` if the request had not been settled yet.
    pub fn handle_cancel(&self) {
        self.dismiss(true);
    }

    /// Programmatic dismissal. Same as `handle_cancel` without invoking
    /// `on_cancel`. No-op when nothing is open.
    pub fn close_dialog(&self) {
        self.dismiss(false);
    }

    fn dismiss(&self, invoke_on_cancel: bool) -> bool {
        let (settler, on_cancel) = {
            let mut guard = self.inner.lock();
            let state = &mut *guard;
            if state.active.is_none() {
                tracing::debug!("Dismiss ignored: no open dialog");
                return false;
            }
            state.cancel_timer();
            let Some(mut entry) = self.close_active(state) else {
                return false;
            };
            let settler = entry.settler.take();
            let on_cancel = if invoke_on_cancel && settler.is_some() {
                entry.on_cancel.take()
            } else {
                None
            };
            (settler, on_cancel)
        };

        // Outside the lock: the handler may call back into the orchestrator.
        if let Some(on_cancel) = on_cancel {
            on_cancel();
        }
        if let Some(settler) = settler {
            settler.settle(false);
        }

        self.promote_next();
        true
    }

    /// Move the open request out and mark the dialog closed.
    fn close_active(&self, state: &mut State) -> Option<Entry> {
        let entry = state.active.take()?;
        state.transition(DialogPhase::Closed);
        state.status_message = None;

        if entry.settler.is_some() {
            tracing::info!(request_id = %entry.id, "Confirmation cancelled");
            self.inner.emit(ConfirmEvent::Cancelled {
                request_id: entry.id,
                timestamp: Timestamp::now(),
            });
        }
        tracing::debug!(request_id = %entry.id, "Dialog closed");
        self.inner.emit(ConfirmEvent::Closed {
            request_id: entry.id,
            timestamp: Timestamp::now(),
        });
        self.inner.publish(state);
        Some(entry)
    }

    /// Open the next queued request whose caller is still waiting.
    fn promote_next(&self) {
        let mut guard = self.inner.lock();
        let state = &mut *guard;
        if state.phase.is_open() {
            return;
        }
        while let Some(entry) = state.queue.pop_front() {
            if entry.settler.as_ref().is_some_and(Settler::is_abandoned) {
                tracing::debug!(request_id = %entry.id, "Skipping abandoned queued confirmation");
                continue;
            }
            self.inner.open(state, entry);
            return;
        }
        self.inner.publish(state);
    }

    /// Close the open dialog and drop every queued request, settling each to
    /// `false`. Handlers are not invoked. Returns how many requests were
    /// settled.
    pub fn reset(&self) -> usize {
        let settlers: Vec<Settler> = {
            let mut guard = self.inner.lock();
            let state = &mut *guard;
            state.cancel_timer();
            let mut settlers = Vec::new();
            if let Some(mut entry) = self.close_active(state) {
                settlers.extend(entry.settler.take());
            }
            for mut entry in state.queue.drain(..) {
                if let Some(settler) = entry.settler.take() {
                    self.inner.emit(ConfirmEvent::Cancelled {
                        request_id: entry.id,
                        timestamp: Timestamp::now(),
                    });
                    settlers.push(settler);
                }
            }
            self.inner.publish(state);
            tracing::warn!(settled = settlers.len(), "Orchestrator reset");
            settlers
        };

        let settled = settlers.len();
        for settler in settlers {
            settler.settle(false);
        }
        settled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use affirm_core::types::{DialogStatus, Variant};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn counted(calls: &Arc<AtomicU32>) -> ConfirmRequest {
        let calls = Arc::clone(calls);
        ConfirmRequest::new().on_confirm(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })
    }

    fn queueing(max_queue: usize) -> Orchestrator {
        let config = EngineConfig {
            busy_policy: BusyPolicy::Queue,
            max_queue,
            ..EngineConfig::default()
        };
        Orchestrator::new(config, DialogOptions::default())
    }

    #[test]
    fn test_new_orchestrator_is_closed() {
        let orch = Orchestrator::default();
        let state = orch.state();
        assert!(!state.is_open);
        assert!(state.request_id.is_none());
        assert_eq!(state.status, DialogStatus::Idle);
        assert_eq!(orch.phase(), DialogPhase::Closed);
    }

    #[tokio::test]
    async fn test_confirm_opens_with_merged_options() {
        let orch = Orchestrator::default();
        let pending = orch.confirm(
            ConfirmRequest::new()
                .title("Delete Item")
                .variant(Variant::Destructive),
        );
        let state = orch.state();
        assert!(state.is_open);
        assert_eq!(state.request_id, Some(pending.id()));
        assert_eq!(state.options.title, "Delete Item");
        assert_eq!(state.options.confirm_text, "Confirm");
        assert_eq!(state.options.cancel_text, "Cancel");
        assert_eq!(state.options.variant, Variant::Destructive);
        assert_eq!(state.status, DialogStatus::Idle);
    }

    #[tokio::test]
    async fn test_confirm_merges_onto_configured_defaults() {
        let defaults = DialogOptions {
            title: "Are you sure?".to_string(),
            confirm_text: "Yes".to_string(),
            ..DialogOptions::default()
        };
        let orch = Orchestrator::new(EngineConfig::default(), defaults);
        let _pending = orch.confirm(ConfirmRequest::new().description("Really"));
        let state = orch.state();
        assert_eq!(state.options.title, "Are you sure?");
        assert_eq!(state.options.confirm_text, "Yes");
        assert_eq!(state.options.description, "Really");
    }

    #[tokio::test]
    async fn test_cancel_settles_false_and_closes() {
        let orch = Orchestrator::default();
        let pending = orch.confirm(ConfirmRequest::new().title("Delete Item"));
        orch.handle_cancel();
        assert_eq!(pending.await, Ok(false));
        let state = orch.state();
        assert!(!state.is_open);
        assert!(state.request_id.is_none());
        assert_eq!(state.status, DialogStatus::Idle);
    }

    #[tokio::test]
    async fn test_cancel_invokes_on_cancel_once() {
        let orch = Orchestrator::default();
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let pending = orch.confirm(ConfirmRequest::new().on_cancel(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }));
        orch.handle_cancel();
        orch.handle_cancel();
        assert_eq!(pending.await, Ok(false));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_close_dialog_skips_on_cancel() {
        let orch = Orchestrator::default();
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let pending = orch.confirm(ConfirmRequest::new().on_cancel(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }));
        orch.close_dialog();
        assert_eq!(pending.await, Ok(false));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!orch.state().is_open);
    }

    #[tokio::test]
    async fn test_on_cancel_may_call_back_into_orchestrator() {
        let orch = Orchestrator::default();
        let inner = orch.clone();
        let pending = orch.confirm(ConfirmRequest::new().on_cancel(move || inner.close_dialog()));
        orch.handle_cancel();
        assert_eq!(pending.await, Ok(false));
    }

    #[test]
    fn test_dismiss_when_closed_is_noop() {
        let orch = Orchestrator::default();
        orch.handle_cancel();
        orch.close_dialog();
        assert_eq!(orch.reset(), 0);
        assert!(!orch.state().is_open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirm_without_action_succeeds_and_auto_closes() {
        let orch = Orchestrator::default();
        let pending = orch.confirm(ConfirmRequest::new());
        orch.handle_confirm().await;

        let state = orch.state();
        assert!(state.is_open);
        assert_eq!(state.status, DialogStatus::Success);
        assert_eq!(
            state.status_message.as_deref(),
            Some("Operation completed successfully")
        );
        assert_eq!(pending.await, Ok(true));

        tokio::time::sleep(Duration::from_millis(1499)).await;
        assert!(orch.state().is_open);
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(!orch.state().is_open);
        assert_eq!(orch.phase(), DialogPhase::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_action_runs_once_per_confirm() {
        let orch = Orchestrator::default();
        let calls = Arc::new(AtomicU32::new(0));
        let pending = orch.confirm(counted(&calls));
        orch.handle_confirm().await;
        // Success is terminal for the request; further presses are ignored.
        orch.handle_confirm().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(pending.await, Ok(true));
    }

    #[tokio::test]
    async fn test_failure_keeps_dialog_open_with_message() {
        let orch = Orchestrator::default();
        let mut pending = orch.confirm(
            ConfirmRequest::new()
                .on_confirm(|| async { Err::<(), ActionError>(ActionError::from("boom")) }),
        );
        orch.handle_confirm().await;

        let state = orch.state();
        assert!(state.is_open);
        assert_eq!(state.status, DialogStatus::Error);
        assert_eq!(state.status_message.as_deref(), Some("boom"));

        let unsettled = tokio::time::timeout(Duration::from_millis(20), &mut pending).await;
        assert!(unsettled.is_err(), "failed action must not settle the request");

        orch.handle_cancel();
        assert_eq!(pending.await, Ok(false));
    }

    #[tokio::test]
    async fn test_failure_without_message_uses_fallback() {
        let orch = Orchestrator::default();
        let _pending = orch.confirm(
            ConfirmRequest::new()
                .on_confirm(|| async { Err::<(), ActionError>(ActionError::Unspecified) }),
        );
        orch.handle_confirm().await;
        assert_eq!(
            orch.state().status_message.as_deref(),
            Some("An error occurred")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_failure_succeeds() {
        let orch = Orchestrator::default();
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let pending = orch.confirm(ConfirmRequest::new().on_confirm(move || {
            let attempt = c.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    Err(ActionError::from("network down"))
                } else {
                    Ok(())
                }
            }
        }));

        orch.handle_confirm().await;
        assert_eq!(orch.state().status, DialogStatus::Error);

        orch.handle_confirm().await;
        assert_eq!(orch.state().status, DialogStatus::Success);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(pending.await, Ok(true));
    }

    #[tokio::test]
    async fn test_handle_confirm_when_closed_is_ignored() {
        let orch = Orchestrator::default();
        orch.handle_confirm().await;
        assert!(!orch.state().is_open);
    }

    #[tokio::test]
    async fn test_update_dialog_changes_only_given_fields() {
        let orch = Orchestrator::default();
        let _pending = orch.confirm(
            ConfirmRequest::new()
                .title("Old Title")
                .description("Keep me"),
        );
        assert!(orch.update_dialog(&DialogPatch::new().title("New Title")));
        let state = orch.state();
        assert_eq!(state.options.title, "New Title");
        assert_eq!(state.options.description, "Keep me");
        assert_eq!(state.options.confirm_text, "Confirm");
        assert_eq!(state.status, DialogStatus::Idle);
    }

    #[test]
    fn test_update_dialog_when_closed_is_noop() {
        let orch = Orchestrator::default();
        assert!(!orch.update_dialog(&DialogPatch::new().title("New Title")));
        let state = orch.state();
        assert!(!state.is_open);
        assert!(state.request_id.is_none());
        assert_eq!(state.options.title, "");
    }

    #[tokio::test]
    async fn test_update_dialog_keeps_handlers() {
        let orch = Orchestrator::default();
        let calls = Arc::new(AtomicU32::new(0));
        let pending = orch.confirm(counted(&calls));
        orch.update_dialog(&DialogPatch::new().confirm_text("Delete"));
        orch.handle_confirm().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(pending.await, Ok(true));
    }

    #[tokio::test]
    async fn test_reject_policy_leaves_first_request_intact() {
        let orch = Orchestrator::default();
        let first = orch.confirm(ConfirmRequest::new().title("First"));
        let second = orch.confirm(ConfirmRequest::new().title("Second"));

        assert!(second.is_rejected());
        assert_eq!(second.await, Err(ConfirmError::AlreadyPending));

        let state = orch.state();
        assert_eq!(state.options.title, "First");
        assert_eq!(state.request_id, Some(first.id()));

        orch.handle_cancel();
        assert_eq!(first.await, Ok(false));
    }

    #[tokio::test]
    async fn test_queue_policy_shows_requests_in_order() {
        let orch = queueing(4);
        let first = orch.confirm(ConfirmRequest::new().title("First"));
        let second = orch.confirm(ConfirmRequest::new().title("Second"));
        let third = orch.confirm(ConfirmRequest::new().title("Third"));
        assert!(!second.is_rejected());
        assert_eq!(orch.state().queued, 2);
        assert_eq!(orch.state().options.title, "First");

        orch.handle_cancel();
        assert_eq!(first.await, Ok(false));
        assert_eq!(orch.state().options.title, "Second");
        assert_eq!(orch.state().queued, 1);

        orch.close_dialog();
        assert_eq!(second.await, Ok(false));
        assert_eq!(orch.state().options.title, "Third");

        orch.handle_cancel();
        assert_eq!(third.await, Ok(false));
        assert!(!orch.state().is_open);
    }

    #[tokio::test]
    async fn test_queue_policy_rejects_when_full() {
        let orch = queueing(1);
        let _first = orch.confirm(ConfirmRequest::new());
        let _second = orch.confirm(ConfirmRequest::new());
        let third = orch.confirm(ConfirmRequest::new());
        assert_eq!(third.await, Err(ConfirmError::QueueFull(1)));
    }

    #[tokio::test]
    async fn test_queue_skips_abandoned_requests() {
        let orch = queueing(4);
        let first = orch.confirm(ConfirmRequest::new().title("First"));
        drop(orch.confirm(ConfirmRequest::new().title("Abandoned")));
        let third = orch.confirm(ConfirmRequest::new().title("Third"));

        orch.handle_cancel();
        assert_eq!(first.await, Ok(false));
        assert_eq!(orch.state().options.title, "Third");
        orch.handle_cancel();
        assert_eq!(third.await, Ok(false));
    }

    #[tokio::test(start_paused = true)]
    async fn test_queue_promotes_after_success_timer() {
        let orch = queueing(4);
        let first = orch.confirm(ConfirmRequest::new().title("First"));
        let second = orch.confirm(ConfirmRequest::new().title("Second"));

        orch.handle_confirm().await;
        assert_eq!(first.await, Ok(true));
        assert_eq!(orch.state().options.title, "First");

        tokio::time::sleep(Duration::from_millis(1600)).await;
        let state = orch.state();
        assert!(state.is_open);
        assert_eq!(state.options.title, "Second");
        assert_eq!(state.status, DialogStatus::Idle);

        orch.handle_cancel();
        assert_eq!(second.await, Ok(false));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_success_invalidates_timer() {
        let orch = queueing(4);
        let first = orch.confirm(ConfirmRequest::new().title("First"));
        orch.handle_confirm().await;
        assert_eq!(first.await, Ok(true));

        // Force-close the success state, then open a new request.
        orch.close_dialog();
        let second = orch.confirm(ConfirmRequest::new().title("Second"));

        // The first request's timer must not close the second dialog.
        tokio::time::sleep(Duration::from_millis(2000)).await;
        let state = orch.state();
        assert!(state.is_open);
        assert_eq!(state.request_id, Some(second.id()));

        orch.handle_cancel();
        assert_eq!(second.await, Ok(false));
    }

    #[tokio::test]
    async fn test_reset_settles_active_and_queued() {
        let orch = queueing(4);
        let first = orch.confirm(ConfirmRequest::new());
        let second = orch.confirm(ConfirmRequest::new());
        assert_eq!(orch.reset(), 2);
        assert_eq!(first.await, Ok(false));
        assert_eq!(second.await, Ok(false));
        let state = orch.state();
        assert!(!state.is_open);
        assert_eq!(state.queued, 0);
    }

    #[tokio::test]
    async fn test_reset_reports_queued_requests_cancelled() {
        let orch = queueing(4);
        let mut events = orch.events();
        let first = orch.confirm(ConfirmRequest::new().title("First"));
        let second = orch.confirm(ConfirmRequest::new().title("Second"));
        let (first_id, second_id) = (first.id(), second.id());

        assert_eq!(orch.reset(), 2);
        assert_eq!(first.await, Ok(false));
        assert_eq!(second.await, Ok(false));

        let seen: Vec<_> = std::iter::from_fn(|| events.try_recv().ok())
            .map(|e| (e.request_id(), e.event_name()))
            .collect();
        assert_eq!(
            seen,
            vec![
                (first_id, "requested"),
                (second_id, "queued"),
                (first_id, "cancelled"),
                (first_id, "closed"),
                (second_id, "cancelled"),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_during_success_invalidates_timer() {
        let orch = Orchestrator::default();
        let first = orch.confirm(ConfirmRequest::new().title("First"));
        orch.handle_confirm().await;
        assert_eq!(first.await, Ok(true));

        // Already settled, so nothing left to settle.
        assert_eq!(orch.reset(), 0);
        assert_eq!(orch.phase(), DialogPhase::Closed);

        let second = orch.confirm(ConfirmRequest::new().title("Second"));
        tokio::time::sleep(Duration::from_millis(2000)).await;
        let state = orch.state();
        assert!(state.is_open);
        assert_eq!(state.request_id, Some(second.id()));
        assert_eq!(state.status, DialogStatus::Idle);

        orch.handle_cancel();
        assert_eq!(second.await, Ok(false));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_during_success_stops_timer() {
        let orch = Orchestrator::default();
        let mut rx = orch.subscribe();
        let pending = orch.confirm(ConfirmRequest::new());
        orch.handle_confirm().await;
        assert_eq!(pending.await, Ok(true));
        assert_eq!(rx.borrow_and_update().status, DialogStatus::Success);

        drop(orch);
        tokio::time::sleep(Duration::from_millis(2000)).await;

        // No close was published after the drop, and the channel is gone.
        assert!(rx.has_changed().is_err());
        let last = rx.borrow().clone();
        assert!(last.is_open);
        assert_eq!(last.status, DialogStatus::Success);
    }

    #[test]
    fn test_invalid_transition_is_rejected() {
        let mut state = State::new();
        assert!(!state.transition(DialogPhase::Loading));
        assert_eq!(state.phase, DialogPhase::Closed);

        assert!(state.transition(DialogPhase::Idle));
        assert!(!state.transition(DialogPhase::Success));
        assert_eq!(state.phase, DialogPhase::Idle);
    }

    #[tokio::test]
    async fn test_dropping_orchestrator_reports_dropped() {
        let orch = Orchestrator::default();
        let pending = orch.confirm(ConfirmRequest::new());
        drop(orch);
        assert_eq!(pending.await, Err(ConfirmError::Dropped));
    }

    #[tokio::test]
    async fn test_subscribe_sees_latest_state() {
        let orch = Orchestrator::default();
        let mut rx = orch.subscribe();
        assert!(!rx.borrow_and_update().is_open);

        let _pending = orch.confirm(ConfirmRequest::new().title("Watch me"));
        rx.changed().await.unwrap();
        let state = rx.borrow_and_update().clone();
        assert!(state.is_open);
        assert_eq!(state.options.title, "Watch me");
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_trace_success_lifecycle() {
        let orch = Orchestrator::default();
        let mut events = orch.events();
        let pending = orch.confirm(ConfirmRequest::new());
        let id = pending.id();
        orch.handle_confirm().await;
        assert_eq!(pending.await, Ok(true));
        tokio::time::sleep(Duration::from_millis(1600)).await;

        let mut names = Vec::new();
        while let Ok(event) = events.try_recv() {
            assert_eq!(event.request_id(), id);
            names.push(event.event_name());
        }
        assert_eq!(
            names,
            vec!["requested", "action_started", "confirmed", "closed"]
        );
    }

    #[tokio::test]
    async fn test_events_trace_cancel() {
        let orch = Orchestrator::default();
        let mut events = orch.events();
        let pending = orch.confirm(ConfirmRequest::new());
        orch.handle_cancel();
        assert_eq!(pending.await, Ok(false));

        let names: Vec<_> = std::iter::from_fn(|| events.try_recv().ok())
            .map(|e| e.event_name())
            .collect();
        assert_eq!(names, vec!["requested", "cancelled", "closed"]);
    }
}
