use std::net::AddrParseError;

use metrics_exporter_prometheus::BuildError;
use thiserror::Error;
use tracing_subscriber::{filter::ParseError, util::TryInitError};

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("invalid log filter '{spec}': {source}")]
    Filter {
        spec: String,
        #[source]
        source: ParseError,
    },

    #[error("tracing subscriber could not be installed: {0}")]
    Subscriber(#[from] TryInitError),

    #[error("invalid metrics bind address '{address}': {source}")]
    MetricsAddress {
        address: String,
        #[source]
        source: AddrParseError,
    },

    #[error("metrics exporter could not start: {0}")]
    MetricsExporter(#[source] BuildError),
}

impl LoggerError {
    /// Metrics are installed after the subscriber, so only their failures
    /// reach the log.
    pub fn is_logged(&self) -> bool {
        matches!(
            self,
            LoggerError::MetricsAddress { .. } | LoggerError::MetricsExporter(_)
        )
    }
}
