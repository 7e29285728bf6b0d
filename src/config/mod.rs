mod defaults;
mod error;
mod loader;
mod raw;

pub(crate) use error::ConfigError;
pub(crate) use loader::{initialize_configuration, load_configuration_from};
pub(crate) use raw::{Config, ConfigRaw};
