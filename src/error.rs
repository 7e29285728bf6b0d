use monitor_repository::error::RepositoryError;
use thiserror::Error;

use crate::{
    config::ConfigError, contracts::ContractLoadError, logger::LoggerError, runtime::TaskError,
};

/// Top-level application error that composes all subsystem errors
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logger setup failed: {0}")]
    Logger(#[from] LoggerError),

    /// Contract definitions could not be resolved
    #[error("Contract load error: {0}")]
    Contracts(#[from] ContractLoadError),

    #[error("Durable store connection failed: {0}")]
    StoreConnect(#[source] RepositoryError),

    #[error("Durable store schema preparation failed: {0}")]
    StorePrepare(#[source] RepositoryError),

    /// A propagating task failed after startup
    #[error("Task failure: {0}")]
    Task(#[from] TaskError),
}

impl MonitorError {
    /// Whether the failure happened before any task was started.
    pub fn is_startup_failure(&self) -> bool {
        !matches!(self, MonitorError::Task(_))
    }

    /// Whether logging was already initialized when the failure happened.
    pub fn is_logged(&self) -> bool {
        match self {
            MonitorError::Config(_) => false,
            MonitorError::Logger(error) => error.is_logged(),
            _ => true,
        }
    }
}
