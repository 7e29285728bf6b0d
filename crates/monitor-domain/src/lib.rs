mod chain;
mod chain_id;
mod contract;
mod event;
mod identifier;

pub use chain::Chain;
pub use chain_id::ChainId;
pub use contract::Contract;
pub use event::{Event, UNKNOWN_EVENT_NAME};
pub use identifier::storage_identifier;
