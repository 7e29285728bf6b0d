mod config;
mod config_error;
pub mod error;
mod manager;
mod migrations;
mod models;
mod repositories;
mod schema;

pub use config::{StoreConfig, StoreConfigRaw};
pub use config_error::ConfigError;
pub use manager::RepositoryManager;
pub use repositories::{
    event_repository::EventRepository,
    monitored_contract_repository::{MonitoredContract, MonitoredContractRepository},
};
pub use schema::EventTable;
