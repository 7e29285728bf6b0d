use std::{fmt, future::Future};

use tokio::task::JoinHandle;

use super::ExecutionScope;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShutdownSignal {
    Interrupt,
    Terminate,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownSignal::Interrupt => f.write_str("SIGINT"),
            ShutdownSignal::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Turns an external termination request into cancellation of the scope.
#[derive(Clone)]
pub(crate) struct ShutdownTrigger {
    scope: ExecutionScope,
}

impl ShutdownTrigger {
    pub(crate) fn new(scope: ExecutionScope) -> Self {
        Self { scope }
    }

    /// Cancels the scope. Only the first request has an effect; the return
    /// value tells whether this call was that request.
    pub(crate) fn request(&self, signal: ShutdownSignal) -> bool {
        if self.scope.cancel() {
            tracing::info!(signal = %signal, "Received {signal}, initiating shutdown...");
            true
        } else {
            tracing::debug!(signal = %signal, "Shutdown already in progress");
            false
        }
    }

    /// Waits for `signal` or for the scope to be cancelled by something else,
    /// whichever comes first.
    pub(crate) fn arm<F>(self, signal: F) -> JoinHandle<()>
    where
        F: Future<Output = ShutdownSignal> + Send + 'static,
    {
        tokio::spawn(async move {
            tokio::select! {
                signal = signal => {
                    self.request(signal);
                }
                _ = self.scope.cancelled() => {}
            }
        })
    }

    /// Arms against process signals (SIGINT, and SIGTERM on unix).
    pub(crate) fn arm_for_process_signals(self) -> JoinHandle<()> {
        self.arm(termination_signal())
    }
}

async fn termination_signal() -> ShutdownSignal {
    let interrupt = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %error, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(error) => {
                tracing::warn!(error = %error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => ShutdownSignal::Interrupt,
        _ = terminate => ShutdownSignal::Terminate,
    }
}
