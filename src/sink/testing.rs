use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use monitor_domain::{ChainId, Event};
use monitor_repository::error::RepositoryError;
use serde_json::json;

use super::{OutputDestination, OutputError};

/// Shared record of what test destinations saw, in call order.
#[derive(Clone, Default)]
pub(crate) struct DeliveryLog {
    deliveries: Arc<Mutex<Vec<(String, Event)>>>,
    releases: Arc<Mutex<Vec<String>>>,
}

impl DeliveryLog {
    pub(crate) fn deliveries(&self) -> Vec<(String, Event)> {
        self.deliveries.lock().unwrap().clone()
    }

    pub(crate) fn delivered_to(&self, destination: &str) -> Vec<Event> {
        self.deliveries()
            .into_iter()
            .filter(|(name, _)| name == destination)
            .map(|(_, event)| event)
            .collect()
    }

    pub(crate) fn releases(&self) -> Vec<String> {
        self.releases.lock().unwrap().clone()
    }
}

pub(crate) struct RecordingDestination {
    name: String,
    fail: bool,
    delay: Option<Duration>,
    log: DeliveryLog,
}

impl RecordingDestination {
    pub(crate) fn new(name: &str, log: &DeliveryLog) -> Self {
        Self {
            name: name.to_string(),
            fail: false,
            delay: None,
            log: log.clone(),
        }
    }

    /// Records each delivery only after `delay` has passed.
    pub(crate) fn slow(name: &str, log: &DeliveryLog, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(name, log)
        }
    }

    pub(crate) fn failing(name: &str, log: &DeliveryLog) -> Self {
        Self {
            fail: true,
            ..Self::new(name, log)
        }
    }
}

#[async_trait]
impl OutputDestination for RecordingDestination {
    fn name(&self) -> &str {
        &self.name
    }

    async fn deliver(&self, event: &Event) -> Result<(), OutputError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.log
            .deliveries
            .lock()
            .unwrap()
            .push((self.name.clone(), event.clone()));
        if self.fail {
            return Err(unavailable());
        }
        Ok(())
    }

    async fn release(&self) -> Result<(), OutputError> {
        self.log.releases.lock().unwrap().push(self.name.clone());
        if self.fail {
            return Err(unavailable());
        }
        Ok(())
    }
}

fn unavailable() -> OutputError {
    OutputError::Store(RepositoryError::Statement(
        "destination unavailable".to_string(),
    ))
}

pub(crate) fn sample_event(chain: &str, block_number: u64) -> Event {
    Event {
        chain_id: ChainId::from(chain),
        contract: "Token".to_string(),
        contract_address: "0x5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f".to_string(),
        name: "Transfer".to_string(),
        block_number,
        transaction_hash: Some(format!("0x{block_number:064x}")),
        log_index: Some(0),
        payload: json!({"value": "1"}),
        observed_at: Utc::now(),
    }
}
