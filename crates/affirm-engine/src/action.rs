//! Confirm and cancel handlers attached to a request.
//!
//! The confirm action may run more than once (a failed attempt can be
//! retried from the dialog), so it is `Fn` behind an `Arc`. The cancel
//! handler runs at most once.

use std::future::Future;

use async_trait::async_trait;

use crate::error::ActionError;

/// Side effect executed when the user confirms.
///
/// Implemented for every `Fn() -> impl Future<Output = Result<(), ActionError>>`
/// closure, so most callers never name this trait.
#[async_trait]
pub trait ConfirmAction: Send + Sync {
    async fn run(&self) -> Result<(), ActionError>;
}

#[async_trait]
impl<F, Fut> ConfirmAction for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
{
    async fn run(&self) -> Result<(), ActionError> {
        (self)().await
    }
}

/// Synchronous handler invoked when the user cancels.
pub type CancelFn = Box<dyn FnOnce() + Send>;
