//! Event fan-out to the configured output destinations.

mod config;
mod console;
mod destination;
mod event_sink;
mod store;
#[cfg(test)]
pub(crate) mod testing;

pub(crate) use config::{ConsoleOutputConfig, OutputsConfig, OutputsConfigRaw};
pub(crate) use console::ConsoleOutput;
pub(crate) use destination::{OutputDestination, OutputError};
pub(crate) use event_sink::{EventSink, EventSinkBuilder};
pub(crate) use store::DurableStore;
