use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),
}
