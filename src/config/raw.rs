use std::{
    collections::{HashMap, HashSet},
    path::PathBuf,
};

use monitor_blockchain::{ChainConfig, ChainConfigRaw};
use monitor_domain::ChainId;
use serde::{Deserialize, Serialize};

use crate::{
    config::ConfigError,
    contracts::ContractConfigRaw,
    controllers::http_api_controller::router::HttpApiConfig,
    logger::{LoggerConfig, TelemetryConfig},
    runtime::SupervisorConfig,
    sink::{OutputsConfig, OutputsConfigRaw},
};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct ConfigRaw {
    pub http_api: HttpApiConfig,
    pub outputs: OutputsConfigRaw,
    #[serde(default)]
    pub chains: Vec<ChainConfigRaw>,
    #[serde(default)]
    pub contracts: Vec<ContractConfigRaw>,
    pub supervisor: SupervisorConfig,
    pub logger: LoggerConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone)]
pub(crate) struct Config {
    /// Directory that relative paths in the config (ABI files) are resolved against.
    pub config_dir: PathBuf,
    /// The TOML file that was merged, if any.
    pub config_file: Option<PathBuf>,
    /// Chains present in the file but switched off.
    pub disabled_chains: Vec<ChainId>,
    pub http_api: HttpApiConfig,
    pub outputs: OutputsConfig,
    pub chains: Vec<ChainConfig>,
    pub contracts: Vec<ContractConfigRaw>,
    pub supervisor: SupervisorConfig,
    pub logger: LoggerConfig,
    pub telemetry: TelemetryConfig,
}

impl ConfigRaw {
    /// Validates and resolves the raw config. Runs before the logger exists,
    /// so anything worth reporting is kept on [`Config`] for
    /// [`Config::log_summary`].
    pub(crate) fn resolve(
        self,
        config_dir: PathBuf,
        config_file: Option<PathBuf>,
    ) -> Result<Config, ConfigError> {
        let mut seen = HashSet::new();
        let mut storage_names: HashMap<String, ChainId> = HashMap::new();
        let mut chains = Vec::new();
        let mut disabled_chains = Vec::new();

        for chain in self.chains {
            if !seen.insert(chain.id.clone()) {
                return Err(ConfigError::InvalidConfig(format!(
                    "duplicate chain id '{}'",
                    chain.id
                )));
            }
            if !chain.is_enabled() {
                disabled_chains.push(chain.id.clone());
                continue;
            }
            // Store schemas are named after the normalized id.
            let identifier = chain.id.storage_identifier();
            if let Some(other) = storage_names.insert(identifier.clone(), chain.id.clone()) {
                return Err(ConfigError::InvalidConfig(format!(
                    "chain ids '{other}' and '{}' both store events as '{identifier}'",
                    chain.id
                )));
            }
            chains.push(chain.resolve()?);
        }

        Ok(Config {
            config_dir,
            config_file,
            disabled_chains,
            http_api: self.http_api,
            outputs: self.outputs.resolve()?,
            chains,
            contracts: self.contracts,
            supervisor: self.supervisor,
            logger: self.logger,
            telemetry: self.telemetry,
        })
    }
}

impl Config {
    pub(crate) fn log_summary(&self) {
        match &self.config_file {
            Some(path) => tracing::info!(path = %path.display(), "Loaded config file"),
            None => tracing::info!("No config file found, using defaults and environment"),
        }
        for chain_id in &self.disabled_chains {
            tracing::info!(chain_id = %chain_id, "Chain disabled in configuration, skipping");
        }
        if self.chains.is_empty() {
            tracing::warn!("No enabled chains configured; only the service endpoint will run");
        }
    }
}
