use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, AtomicUsize, Ordering},
    },
    time::Duration,
};

use alloy::primitives::{U256, address};
use async_trait::async_trait;
use monitor_blockchain::{Address, B256, BlockchainError, JsonAbi, Log, LogData, LogSource};
use monitor_domain::ChainId;

/// Short enough to keep watcher tests fast.
pub(crate) const TEST_POLL_INTERVAL: Duration = Duration::from_millis(10);

pub(crate) const TOKEN: Address = address!("0x00000000000000000000000000000000000000aa");

const TRANSFER_ABI: &str = r#"[{
    "type": "event",
    "name": "Transfer",
    "anonymous": false,
    "inputs": [
        {"name": "from", "type": "address", "indexed": true},
        {"name": "to", "type": "address", "indexed": true},
        {"name": "value", "type": "uint256", "indexed": false}
    ]
}]"#;

pub(crate) fn token_abi() -> JsonAbi {
    serde_json::from_str(TRANSFER_ABI).unwrap()
}

fn rpc_log(block_number: u64, log_index: u64, topics: Vec<B256>, data: Vec<u8>) -> Log {
    Log {
        inner: alloy::primitives::Log {
            address: TOKEN,
            data: LogData::new_unchecked(topics, data.into()),
        },
        block_number: Some(block_number),
        log_index: Some(log_index),
        transaction_hash: Some(B256::with_last_byte(block_number as u8)),
        ..Default::default()
    }
}

pub(crate) fn transfer_log(block_number: u64, log_index: u64, value: u64) -> Log {
    let selector = token_abi().events().next().unwrap().selector();
    rpc_log(
        block_number,
        log_index,
        vec![
            selector,
            Address::repeat_byte(0x01).into_word(),
            Address::repeat_byte(0x02).into_word(),
        ],
        U256::from(value).to_be_bytes::<32>().to_vec(),
    )
}

pub(crate) fn unknown_log(block_number: u64, log_index: u64) -> Log {
    rpc_log(block_number, log_index, vec![B256::repeat_byte(0x11)], vec![0xde, 0xad])
}

/// In-memory chain serving a fixed set of logs.
pub(crate) struct ScriptedSource {
    chain_id: ChainId,
    tip: Arc<AtomicU64>,
    logs: Mutex<Vec<Log>>,
    failures_left: AtomicUsize,
    block_number_calls: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub(crate) fn new(chain_id: &str, tip: u64) -> Self {
        Self {
            chain_id: ChainId::from(chain_id),
            tip: Arc::new(AtomicU64::new(tip)),
            logs: Mutex::new(Vec::new()),
            failures_left: AtomicUsize::new(0),
            block_number_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn with_log(self, log: Log) -> Self {
        self.logs.lock().unwrap().push(log);
        self
    }

    /// The first `count` tip requests fail.
    pub(crate) fn failing_block_number(self, count: usize) -> Self {
        self.failures_left.store(count, Ordering::SeqCst);
        self
    }

    pub(crate) fn tip(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.tip)
    }

    pub(crate) fn block_number_calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.block_number_calls)
    }
}

#[async_trait]
impl LogSource for ScriptedSource {
    fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }

    async fn block_number(&self) -> Result<u64, BlockchainError> {
        self.block_number_calls.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(BlockchainError::GetBlockNumber {
                reason: "rpc unavailable".to_string(),
                source: None,
            });
        }
        Ok(self.tip.load(Ordering::SeqCst))
    }

    async fn logs(
        &self,
        addresses: &[Address],
        from: u64,
        to: u64,
    ) -> Result<Vec<Log>, BlockchainError> {
        Ok(self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|log| addresses.contains(&log.address()))
            .filter(|log| log.block_number.is_some_and(|block| (from..=to).contains(&block)))
            .cloned()
            .collect())
    }
}

/// Polls `condition` until it holds, panicking after two seconds.
pub(crate) async fn wait_until(condition: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
