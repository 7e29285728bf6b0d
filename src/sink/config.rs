use monitor_repository::{StoreConfig, StoreConfigRaw};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct OutputsConfigRaw {
    pub console: ConsoleOutputConfig,
    pub store: StoreConfigRaw,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct ConsoleOutputConfig {
    /// The console output is on unless explicitly disabled.
    pub disabled: bool,
}

/// Resolved output selection.
#[derive(Debug, Clone)]
pub(crate) struct OutputsConfig {
    pub console_enabled: bool,
    /// `None` when no store URL was configured.
    pub store: Option<StoreConfig>,
}

impl OutputsConfigRaw {
    pub(crate) fn resolve(self) -> Result<OutputsConfig, ConfigError> {
        Ok(OutputsConfig {
            console_enabled: !self.console.disabled,
            store: self.store.resolve()?,
        })
    }
}
