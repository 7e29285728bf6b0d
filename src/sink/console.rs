use async_trait::async_trait;
use monitor_domain::Event;

use super::{OutputDestination, OutputError};
use crate::logger::CONSOLE_TARGET;

/// Writes one structured log record per event.
///
/// Records go to the `chain_monitor::console` target so they can be filtered
/// independently from the service's own logs.
pub(crate) struct ConsoleOutput;

#[async_trait]
impl OutputDestination for ConsoleOutput {
    fn name(&self) -> &str {
        "console"
    }

    async fn deliver(&self, event: &Event) -> Result<(), OutputError> {
        tracing::info!(
            target: CONSOLE_TARGET,
            chain_id = %event.chain_id,
            contract = %event.contract,
            address = %event.contract_address,
            event = %event.name,
            block_number = event.block_number,
            transaction_hash = event.transaction_hash.as_deref().unwrap_or("-"),
            log_index = event.log_index,
            payload = %event.payload,
            "Event observed"
        );
        Ok(())
    }
}
