//! Simulated confirm action for trying the dialog lifecycle by hand.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use affirm_engine::{ActionError, ConfirmRequest};

/// Attach an action that sleeps for `latency` and fails its first
/// `fail_times` attempts.
pub fn with_simulated_action(
    request: ConfirmRequest,
    fail_times: u32,
    latency: Duration,
) -> ConfirmRequest {
    let attempts = Arc::new(AtomicU32::new(0));
    request.on_confirm(move || {
        let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
        async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            if attempt <= fail_times {
                tracing::debug!(attempt, fail_times, "Simulated action failing");
                return Err(ActionError::Failed(format!(
                    "Simulated failure {attempt} of {fail_times}"
                )));
            }
            tracing::debug!(attempt, "Simulated action succeeded");
            Ok(())
        }
    })
}
