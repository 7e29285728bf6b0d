//! Resolves contract definitions into the immutable chain set.

mod config;
mod error;
mod loader;

pub(crate) use config::ContractConfigRaw;
pub(crate) use error::ContractLoadError;
pub(crate) use loader::load_chains;
