mod client;
mod config;
mod config_error;
mod decode;
mod error;
mod log_source;
mod provider;

pub use alloy::{
    json_abi::JsonAbi,
    primitives::{Address, B256, LogData},
    rpc::types::Log,
};
pub use client::ChainClient;
pub use config::{
    ChainConfig, ChainConfigRaw, DEFAULT_CONFIRMATIONS, DEFAULT_MAX_BLOCK_RANGE,
    DEFAULT_POLL_INTERVAL_MS,
};
pub use config_error::ConfigError;
pub use decode::{DecodedLog, decode_log, log_to_event};
pub use error::BlockchainError;
pub use log_source::{LogSource, fetch_logs_in_chunks};
pub use monitor_domain::ChainId;
