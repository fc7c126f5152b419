mod cache;

use std::time::Duration;

use alloy::{
    dyn_abi::{DynSolType, DynSolValue},
    primitives::{Address, B256, Bytes, U256, hex},
};
pub use cache::{CacheKey, CacheStats, DecodeCache};
use indexer_domain::{LeafRecord, RawEventLog, UnspentPayload, UnspentRecord};
use indexer_observability::{record_decode_failure, record_decoded_event};
use serde::{Deserialize, Serialize};

use crate::contract_events::PoolEventKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecoderConfig {
    /// Maximum cached decode results. 0 disables the cache.
    pub cache_capacity: usize,
    pub cache_ttl_secs: u64,
    /// Reject non-canonical ABI data and malformed address topics.
    #[serde(default)]
    pub validate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DecoderOptions {
    pub validate: bool,
}

/// Records produced by one recognized pool event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEvent {
    pub leaf: LeafRecord,
    pub unspent: UnspentRecord,
}

#[derive(Debug, thiserror::Error)]
#[error("failed to decode {event} log at block {block_number} (tx {tx_id}, index {log_index}): {reason}")]
pub struct DecodeError {
    pub event: &'static str,
    pub block_number: u64,
    pub tx_id: B256,
    pub log_index: u32,
    pub reason: String,
}

/// Turns raw pool logs into leaf and unspent records.
pub struct EventDecoder {
    cache: DecodeCache,
    options: DecoderOptions,
}

impl EventDecoder {
    pub fn new(cache: DecodeCache, options: DecoderOptions) -> Self {
        Self { cache, options }
    }

    pub fn from_config(config: &DecoderConfig) -> Self {
        Self::new(
            DecodeCache::new(
                config.cache_capacity,
                Duration::from_secs(config.cache_ttl_secs),
            ),
            DecoderOptions {
                validate: config.validate,
            },
        )
    }

    pub fn cache(&self) -> &DecodeCache {
        &self.cache
    }

    /// Decode one log.
    ///
    /// Returns `Ok(None)` when topic0 is not a pool event this decoder knows.
    pub fn decode(&self, log: &RawEventLog) -> Result<Option<DecodedEvent>, DecodeError> {
        let Some(kind) = log.signature().and_then(PoolEventKind::from_signature) else {
            return Ok(None);
        };

        let decoded = match kind {
            PoolEventKind::Shield => self.decode_shield(log),
            PoolEventKind::Transfer => self.decode_transfer(log),
        }
        .map_err(|reason| DecodeError {
            event: kind.as_str(),
            block_number: log.block_number,
            tx_id: log.tx_id,
            log_index: log.log_index,
            reason,
        });

        match &decoded {
            Ok(_) => record_decoded_event(kind.as_str()),
            Err(_) => record_decode_failure(kind.as_str()),
        }
        decoded.map(Some)
    }

    fn decode_shield(&self, log: &RawEventLog) -> Result<DecodedEvent, String> {
        let [_, shield_address, commitment, token] = log.topics.as_slice() else {
            return Err(topic_count_error(PoolEventKind::Shield, log));
        };
        let token = self.address_from_topic(token)?;

        let values = self.decode_data(PoolEventKind::Shield, &log.data)?;
        let [nonce, amount, tree_index] = values.as_slice() else {
            return Err(format!("expected 3 data fields, got {}", values.len()));
        };

        Ok(DecodedEvent {
            leaf: LeafRecord {
                block_number: log.block_number,
                log_index: log.log_index,
                tx_id: log.tx_id,
                commitment: *commitment,
                tree_index: uint_field(tree_index, "treeIndex")?,
            },
            unspent: UnspentRecord {
                block_number: log.block_number,
                tx_id: log.tx_id,
                payload: UnspentPayload::Public {
                    shield_address: *shield_address,
                    amount: uint_field(amount, "amount")?,
                    nonce: uint_field(nonce, "nonce")?,
                    token,
                },
            },
        })
    }

    fn decode_transfer(&self, log: &RawEventLog) -> Result<DecodedEvent, String> {
        let [_, commitment] = log.topics.as_slice() else {
            return Err(topic_count_error(PoolEventKind::Transfer, log));
        };

        let values = self.decode_data(PoolEventKind::Transfer, &log.data)?;
        let [payload, tree_index] = values.as_slice() else {
            return Err(format!("expected 2 data fields, got {}", values.len()));
        };
        let payload = payload
            .as_bytes()
            .map(Bytes::copy_from_slice)
            .ok_or_else(|| "encryptedPayload is not bytes".to_string())?;

        Ok(DecodedEvent {
            leaf: LeafRecord {
                block_number: log.block_number,
                log_index: log.log_index,
                tx_id: log.tx_id,
                commitment: *commitment,
                tree_index: uint_field(tree_index, "treeIndex")?,
            },
            unspent: UnspentRecord {
                block_number: log.block_number,
                tx_id: log.tx_id,
                payload: UnspentPayload::Encrypted { payload },
            },
        })
    }

    fn decode_data(&self, kind: PoolEventKind, data: &Bytes) -> Result<Vec<DynSolValue>, String> {
        let key = CacheKey {
            payload_hex: hex::encode(data),
            target: kind.data_type(),
            options: self.options,
        };
        if let Some(values) = self.cache.get(&key) {
            return Ok(values);
        }

        let ty = DynSolType::parse(kind.data_type()).map_err(|e| e.to_string())?;
        let decoded = ty
            .abi_decode_params(data)
            .map_err(|e| format!("invalid event data: {e}"))?;
        if self.options.validate && decoded.abi_encode_params() != data.as_ref() {
            return Err("event data is not canonically encoded".to_string());
        }

        let DynSolValue::Tuple(values) = decoded else {
            return Err(format!("expected tuple for {}", kind.data_type()));
        };

        self.cache.insert(key, values.clone());
        Ok(values)
    }

    fn address_from_topic(&self, topic: &B256) -> Result<Address, String> {
        if self.options.validate && topic[..12].iter().any(|byte| *byte != 0) {
            return Err(format!("token topic {topic} is not a left-padded address"));
        }
        Ok(Address::from_word(*topic))
    }
}

fn uint_field(value: &DynSolValue, field: &str) -> Result<U256, String> {
    value
        .as_uint()
        .map(|(value, _)| value)
        .ok_or_else(|| format!("{field} is not a uint256"))
}

fn topic_count_error(kind: PoolEventKind, log: &RawEventLog) -> String {
    format!(
        "expected {} topics, got {}",
        kind.topic_count(),
        log.topics.len()
    )
}

#[cfg(test)]
mod tests;
