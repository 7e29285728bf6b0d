use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] Box<figment::Error>),

    #[error("Missing required config file: {0}")]
    MissingConfig(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<monitor_blockchain::ConfigError> for ConfigError {
    fn from(err: monitor_blockchain::ConfigError) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}

impl From<monitor_repository::ConfigError> for ConfigError {
    fn from(err: monitor_repository::ConfigError) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}
