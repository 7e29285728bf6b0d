use alloy::{
    dyn_abi::{DynSolValue, EventExt},
    hex,
    json_abi::{Event as AbiEvent, JsonAbi},
    rpc::types::Log,
};
use chrono::Utc;
use monitor_domain::{ChainId, Contract, Event, UNKNOWN_EVENT_NAME};
use serde_json::{Map, Value, json};

/// Result of matching a log against a contract ABI.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedLog {
    pub name: String,
    pub payload: Value,
}

/// Decode a log with the given ABI.
///
/// Logs whose first topic matches no ABI event, or that fail to decode, are
/// returned under [`UNKNOWN_EVENT_NAME`] with their raw topics and data.
pub fn decode_log(abi: &JsonAbi, log: &Log) -> DecodedLog {
    let matched = log
        .topic0()
        .and_then(|topic| abi.events().find(|event| !event.anonymous && event.selector() == *topic));

    if let Some(event) = matched {
        match event.decode_log(&log.inner.data) {
            Ok(decoded) => {
                return DecodedLog {
                    name: event.name.clone(),
                    payload: named_params(event, decoded.indexed, decoded.body),
                };
            }
            Err(error) => {
                tracing::debug!(
                    event = %event.name,
                    error = %error,
                    "Log matched event selector but failed to decode"
                );
            }
        }
    }

    DecodedLog {
        name: UNKNOWN_EVENT_NAME.to_string(),
        payload: raw_payload(log),
    }
}

/// Build the event forwarded to the sink from a raw log.
pub fn log_to_event(chain_id: &ChainId, contract: &Contract, log: &Log) -> Event {
    let decoded = decode_log(contract.abi(), log);

    Event {
        chain_id: chain_id.clone(),
        contract: contract.name().to_string(),
        contract_address: log.address().to_checksum(None),
        name: decoded.name,
        block_number: log.block_number.unwrap_or_default(),
        transaction_hash: log.transaction_hash.map(|hash| hash.to_string()),
        log_index: log.log_index,
        payload: decoded.payload,
        observed_at: Utc::now(),
    }
}

fn named_params(event: &AbiEvent, indexed: Vec<DynSolValue>, body: Vec<DynSolValue>) -> Value {
    let mut indexed = indexed.into_iter();
    let mut body = body.into_iter();
    let mut params = Map::new();

    for (position, input) in event.inputs.iter().enumerate() {
        let value = if input.indexed {
            indexed.next()
        } else {
            body.next()
        };
        let key = if input.name.is_empty() {
            format!("arg{position}")
        } else {
            input.name.clone()
        };
        params.insert(key, value.map_or(Value::Null, |value| sol_value_to_json(&value)));
    }

    Value::Object(params)
}

fn raw_payload(log: &Log) -> Value {
    json!({
        "topics": log.topics().iter().map(|topic| topic.to_string()).collect::<Vec<_>>(),
        "data": hex::encode_prefixed(log.data().data.as_ref()),
    })
}

/// Convert a decoded ABI value to JSON. Integers are rendered as decimal
/// strings to avoid precision loss.
fn sol_value_to_json(value: &DynSolValue) -> Value {
    match value {
        DynSolValue::Bool(b) => Value::Bool(*b),
        DynSolValue::Int(i, _) => Value::String(i.to_string()),
        DynSolValue::Uint(u, _) => Value::String(u.to_string()),
        DynSolValue::FixedBytes(word, size) => {
            Value::String(hex::encode_prefixed(&word[..(*size).min(32)]))
        }
        DynSolValue::Address(address) => Value::String(address.to_checksum(None)),
        DynSolValue::Bytes(bytes) => Value::String(hex::encode_prefixed(bytes)),
        DynSolValue::String(s) => Value::String(s.clone()),
        DynSolValue::Array(values)
        | DynSolValue::FixedArray(values)
        | DynSolValue::Tuple(values) => Value::Array(values.iter().map(sol_value_to_json).collect()),
        other => Value::String(format!("{other:?}")),
    }
}
