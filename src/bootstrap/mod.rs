//! Startup sequence that runs before any task: contract loading and output
//! acquisition. Every failure here is fatal.

use std::sync::Arc;

use monitor_domain::Chain;

use crate::{
    config::Config,
    contracts,
    error::MonitorError,
    sink::{ConsoleOutput, DurableStore, EventSink, EventSinkBuilder, OutputsConfig},
};

/// Everything the runtime needs once startup succeeded.
pub(crate) struct Application {
    pub(crate) config: Config,
    pub(crate) chains: Arc<[Chain]>,
    pub(crate) sink: EventSink,
}

pub(crate) async fn build(config: Config) -> Result<Application, MonitorError> {
    let chains = contracts::load_chains(&config.config_dir, &config.chains, &config.contracts)?;
    let contracts: usize = chains.iter().map(|chain| chain.contracts().len()).sum();
    tracing::info!(chains = chains.len(), contracts, "Loaded contract definitions");

    let sink = build_event_sink(&config.outputs, &chains).await?;

    Ok(Application {
        config,
        chains: chains.into(),
        sink,
    })
}

/// Registers the console output, then the durable store once it is connected
/// and its schema is prepared.
pub(crate) async fn build_event_sink(
    outputs: &OutputsConfig,
    chains: &[Chain],
) -> Result<EventSink, MonitorError> {
    let mut builder = EventSinkBuilder::new();

    if outputs.console_enabled {
        builder.register(Arc::new(ConsoleOutput));
    } else {
        tracing::info!("Console output disabled");
    }

    if let Some(store_config) = &outputs.store {
        let store = DurableStore::connect(store_config)
            .await
            .map_err(MonitorError::StoreConnect)?
            .prepare_schema(chains)
            .await
            .map_err(MonitorError::StorePrepare)?;
        builder.register(Arc::new(store));
    } else {
        tracing::info!("Durable store not configured");
    }

    Ok(builder.build())
}
