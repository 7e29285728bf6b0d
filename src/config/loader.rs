use std::path::{Path, PathBuf};

use clap::{Arg, Command};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use super::{Config, ConfigRaw, defaults};
use crate::config::ConfigError;

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "MONITOR_";

/// Parse CLI arguments and load the configuration they point at.
pub(crate) fn initialize_configuration() -> Result<Config, ConfigError> {
    let matches = Command::new("chain-monitor")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Watches smart-contract events across chains and forwards them to outputs")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Sets a custom config file (.toml format)"),
        )
        .get_matches();

    let custom_config_path = matches.get_one::<String>("config").map(PathBuf::from);

    load_configuration_from(custom_config_path.as_deref())
}

/// Build configuration with layered sources (priority: lowest to highest):
/// typed defaults, `config.toml` or the custom file, `MONITOR_*` env vars.
pub(crate) fn load_configuration_from(custom_config_path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(defaults::config()));

    let config_path = match custom_config_path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::MissingConfig(path.display().to_string()));
            }
            Some(path.to_path_buf())
        }
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG_FILE);
            path.exists().then_some(path)
        }
    };

    if let Some(path) = &config_path {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: ConfigRaw = figment.extract().map_err(Box::new)?;

    let config_dir = config_path
        .as_deref()
        .and_then(Path::parent)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    config.resolve(config_dir, config_path)
}
