use async_trait::async_trait;
use monitor_domain::Event;
use monitor_repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum OutputError {
    #[error("store write failed: {0}")]
    Store(#[from] RepositoryError),
}

/// A named receiver of broadcast events.
///
/// Implementations must tolerate concurrent `deliver` calls from every chain
/// task. `release` is invoked once, after all tasks have stopped.
#[async_trait]
pub(crate) trait OutputDestination: Send + Sync {
    fn name(&self) -> &str;

    async fn deliver(&self, event: &Event) -> Result<(), OutputError>;

    async fn release(&self) -> Result<(), OutputError> {
        Ok(())
    }
}
