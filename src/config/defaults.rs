//! Typed default configuration.
//!
//! Every value here can be overridden by the TOML config file and then by
//! `MONITOR_*` environment variables.

use monitor_repository::StoreConfigRaw;

use super::ConfigRaw;
use crate::{
    controllers::http_api_controller::router::HttpApiConfig,
    logger::{LogFormat, LoggerConfig, TelemetryConfig, TelemetryMetricsConfig},
    runtime::{ChainFailurePolicy, SupervisorConfig},
    sink::{ConsoleOutputConfig, OutputsConfigRaw},
};

pub(crate) fn config() -> ConfigRaw {
    ConfigRaw {
        http_api: http_api(),
        outputs: outputs(),
        chains: Vec::new(),
        contracts: Vec::new(),
        supervisor: supervisor(),
        logger: logger(),
        telemetry: telemetry(),
    }
}

fn http_api() -> HttpApiConfig {
    HttpApiConfig {
        enabled: true,
        host: "127.0.0.1".to_string(),
        port: 8080,
    }
}

fn outputs() -> OutputsConfigRaw {
    OutputsConfigRaw {
        console: ConsoleOutputConfig { disabled: false },
        store: StoreConfigRaw::default(),
    }
}

fn supervisor() -> SupervisorConfig {
    SupervisorConfig {
        chain_failure_policy: ChainFailurePolicy::Isolate,
    }
}

fn logger() -> LoggerConfig {
    LoggerConfig {
        level: "chain_monitor=info,monitor_blockchain=info,monitor_repository=info,tower_http=info"
            .to_string(),
        format: LogFormat::Pretty,
    }
}

fn telemetry() -> TelemetryConfig {
    TelemetryConfig {
        metrics: TelemetryMetricsConfig {
            enabled: false,
            bind_address: "0.0.0.0:9464".to_string(),
        },
    }
}
