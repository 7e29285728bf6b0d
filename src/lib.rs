//! Multi-chain smart-contract event monitor.
//!
//! One watch task per configured chain pushes decoded contract events into a
//! shared [`sink`], which fans them out to the console and an optional
//! durable store. An HTTP service task runs alongside them. All tasks share
//! one cancellable scope owned by the supervisor in [`runtime`].

mod bootstrap;
mod config;
mod contracts;
mod controllers;
mod error;
mod logger;
mod runtime;
mod sink;
mod tasks;

pub use error::MonitorError;

use runtime::{ExecutionScope, ShutdownTrigger};

/// Loads configuration, acquires outputs and runs every task until shutdown.
///
/// Startup failures return before any task is started. A propagated task
/// failure returns only after every task has stopped and the outputs were
/// released.
pub async fn run() -> Result<(), MonitorError> {
    dotenvy::dotenv().ok();

    let config = config::initialize_configuration()?;
    if let Err(error) = logger::initialize(&config.logger, &config.telemetry) {
        if error.is_logged() {
            tracing::error!(error = %error, "Chain monitor failed to start");
        }
        return Err(error.into());
    }
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        chains = config.chains.len(),
        "Starting chain monitor"
    );
    config.log_summary();

    let scope = ExecutionScope::new();
    let shutdown = ShutdownTrigger::new(scope.clone()).arm_for_process_signals();

    let result = async {
        let app = bootstrap::build(config).await?;
        runtime::run(app, scope.clone()).await
    }
    .await;

    // Stops the signal listener when the run ended on its own.
    scope.cancel();
    if let Err(error) = shutdown.await {
        tracing::warn!(error = %error, "Shutdown listener ended abnormally");
    }

    match &result {
        Ok(()) => tracing::info!("Chain monitor stopped"),
        Err(error) if error.is_startup_failure() => {
            tracing::error!(error = %error, "Chain monitor failed to start")
        }
        Err(error) => tracing::error!(error = %error, "Chain monitor stopped after a task failure"),
    }

    result
}
