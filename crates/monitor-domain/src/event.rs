use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ChainId;

/// Event name used for logs whose topic matches no ABI event.
pub const UNKNOWN_EVENT_NAME: &str = "unknown";

/// One log observed by a chain task.
///
/// The payload is opaque to the sink and its destinations.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Event {
    pub chain_id: ChainId,
    pub contract: String,
    pub contract_address: String,
    pub name: String,
    pub block_number: u64,
    pub transaction_hash: Option<String>,
    pub log_index: Option<u64>,
    pub payload: serde_json::Value,
    pub observed_at: DateTime<Utc>,
}

impl Event {
    pub fn is_unknown(&self) -> bool {
        self.name == UNKNOWN_EVENT_NAME
    }
}
