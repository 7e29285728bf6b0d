//! Tracing subscriber and metrics exporter setup.

mod config;
mod error;

use std::net::SocketAddr;

pub(crate) use config::{LogFormat, LoggerConfig, TelemetryConfig, TelemetryMetricsConfig};
pub use error::LoggerError;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{
    EnvFilter, filter::Directive, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Target of the records written by the console output.
pub(crate) const CONSOLE_TARGET: &str = "chain_monitor::console";

/// Installs the global subscriber, then the Prometheus exporter if enabled.
///
/// A non-empty `RUST_LOG` replaces the configured level.
pub(crate) fn initialize(
    logger_config: &LoggerConfig,
    telemetry_config: &TelemetryConfig,
) -> Result<(), LoggerError> {
    let spec = std::env::var(EnvFilter::DEFAULT_ENV)
        .ok()
        .filter(|spec| !spec.trim().is_empty())
        .unwrap_or_else(|| logger_config.level.clone());

    install_subscriber(&logger_config.format, build_filter(&spec)?)?;
    install_metrics_exporter(&telemetry_config.metrics)
}

/// Parses `spec` and keeps the console stream at `info`, so a quiet service
/// level does not swallow observed events. A spec that names the console
/// target itself is left as written.
fn build_filter(spec: &str) -> Result<EnvFilter, LoggerError> {
    let invalid = |source| LoggerError::Filter {
        spec: spec.to_string(),
        source,
    };

    let filter = EnvFilter::builder().parse(spec).map_err(invalid)?;
    if spec.contains(CONSOLE_TARGET) {
        return Ok(filter);
    }

    let console: Directive = format!("{CONSOLE_TARGET}=info").parse().map_err(invalid)?;
    Ok(filter.add_directive(console))
}

fn install_subscriber(format: &LogFormat, filter: EnvFilter) -> Result<(), LoggerError> {
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .try_init()?,
        LogFormat::Json => registry
            .with(fmt::layer().json().flatten_event(true))
            .try_init()?,
    }
    Ok(())
}

fn install_metrics_exporter(metrics_config: &TelemetryMetricsConfig) -> Result<(), LoggerError> {
    if !metrics_config.enabled {
        return Ok(());
    }

    let bind_address: SocketAddr =
        metrics_config
            .bind_address
            .parse()
            .map_err(|source| LoggerError::MetricsAddress {
                address: metrics_config.bind_address.clone(),
                source,
            })?;

    PrometheusBuilder::new()
        .with_http_listener(bind_address)
        .install()
        .map_err(LoggerError::MetricsExporter)?;

    tracing::info!(bind_address = %bind_address, "Prometheus metrics exporter listening");
    Ok(())
}
