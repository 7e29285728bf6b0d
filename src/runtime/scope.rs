use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use super::TaskError;

/// Cancellable context shared by every supervised task.
///
/// Cancellation is monotonic. The first recorded error is kept and later
/// ones are dropped.
#[derive(Clone, Default)]
pub(crate) struct ExecutionScope {
    token: CancellationToken,
    cancel_requested: Arc<AtomicBool>,
    first_error: Arc<Mutex<Option<TaskError>>>,
}

impl ExecutionScope {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Returns `true` only for the call that actually
    /// cancelled the scope.
    pub(crate) fn cancel(&self) -> bool {
        let first = !self.cancel_requested.swap(true, Ordering::AcqRel);
        self.token.cancel();
        first
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub(crate) fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// Records `error` if no error was recorded yet, then cancels the scope.
    /// Returns whether `error` became the scope's error.
    pub(crate) fn fail(&self, error: TaskError) -> bool {
        let recorded = {
            let mut slot = self
                .first_error
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if slot.is_none() {
                *slot = Some(error);
                true
            } else {
                false
            }
        };
        self.cancel();
        recorded
    }

    pub(crate) fn take_error(&self) -> Option<TaskError> {
        self.first_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_error(message: &str) -> TaskError {
        TaskError::Service(std::io::Error::other(message.to_string()))
    }

    #[test]
    fn cancel_is_idempotent_and_monotonic() {
        let scope = ExecutionScope::new();
        assert!(!scope.is_cancelled());

        assert!(scope.cancel());
        assert!(!scope.cancel());
        assert!(scope.is_cancelled());
    }

    #[test]
    fn clones_share_cancellation() {
        let scope = ExecutionScope::new();
        let clone = scope.clone();
        clone.cancel();
        assert!(scope.is_cancelled());
    }

    #[test]
    fn first_error_wins() {
        let scope = ExecutionScope::new();
        assert!(scope.fail(service_error("first")));
        assert!(!scope.fail(service_error("second")));
        assert!(scope.is_cancelled());

        let error = scope.take_error().unwrap();
        assert!(error.to_string().contains("first"));
        assert!(scope.take_error().is_none());
    }

    #[tokio::test]
    async fn cancelled_resolves_after_cancel() {
        let scope = ExecutionScope::new();
        let waiter = {
            let scope = scope.clone();
            tokio::spawn(async move { scope.cancelled().await })
        };
        scope.cancel();
        waiter.await.unwrap();
    }
}
