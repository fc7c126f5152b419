#![allow(clippy::unwrap_used)]

use alloy::{
    primitives::{Address, B256, Bytes, U256},
    sol_types::SolEvent,
};
use indexer_domain::{RawEventLog, UnspentPayload};

use super::*;
use crate::contract_events::{Shield, Transfer};

fn decoder() -> EventDecoder {
    EventDecoder::new(
        DecodeCache::new(16, Duration::from_secs(60)),
        DecoderOptions::default(),
    )
}

fn raw_log(topics: Vec<B256>, data: Bytes) -> RawEventLog {
    RawEventLog {
        address: Address::repeat_byte(0x99),
        topics,
        data,
        block_number: 120,
        tx_id: B256::repeat_byte(0x77),
        log_index: 4,
    }
}

fn shield_event() -> Shield {
    Shield {
        shieldAddress: B256::repeat_byte(0x01),
        commitment: B256::repeat_byte(0x02),
        token: Address::repeat_byte(0xaa),
        nonce: U256::from(7),
        amount: U256::from(1_000_000u64),
        treeIndex: U256::from(42),
    }
}

fn transfer_event() -> Transfer {
    Transfer {
        commitment: B256::repeat_byte(0x03),
        encryptedPayload: Bytes::from_static(b"ciphertext-bytes"),
        treeIndex: U256::from(43),
    }
}

fn shield_log() -> RawEventLog {
    let encoded = shield_event().encode_log_data();
    raw_log(encoded.topics().to_vec(), encoded.data.clone())
}

fn transfer_log() -> RawEventLog {
    let encoded = transfer_event().encode_log_data();
    raw_log(encoded.topics().to_vec(), encoded.data.clone())
}

#[test]
fn decode_shield_yields_leaf_and_public_unspent() {
    let decoded = decoder().decode(&shield_log()).unwrap().unwrap();

    assert_eq!(decoded.leaf.block_number, 120);
    assert_eq!(decoded.leaf.log_index, 4);
    assert_eq!(decoded.leaf.tx_id, B256::repeat_byte(0x77));
    assert_eq!(decoded.leaf.commitment, B256::repeat_byte(0x02));
    assert_eq!(decoded.leaf.tree_index, U256::from(42));

    assert_eq!(decoded.unspent.block_number, 120);
    assert!(!decoded.unspent.is_encrypted());
    assert_eq!(
        decoded.unspent.payload,
        UnspentPayload::Public {
            shield_address: B256::repeat_byte(0x01),
            amount: U256::from(1_000_000u64),
            nonce: U256::from(7),
            token: Address::repeat_byte(0xaa),
        }
    );
}

#[test]
fn decode_transfer_yields_leaf_and_encrypted_unspent() {
    let decoded = decoder().decode(&transfer_log()).unwrap().unwrap();

    assert_eq!(decoded.leaf.commitment, B256::repeat_byte(0x03));
    assert_eq!(decoded.leaf.tree_index, U256::from(43));
    assert!(decoded.unspent.is_encrypted());
    assert_eq!(
        decoded.unspent.payload,
        UnspentPayload::Encrypted {
            payload: Bytes::from_static(b"ciphertext-bytes"),
        }
    );
}

#[test]
fn unknown_signature_is_ignored() {
    let decoder = decoder();

    let unknown = raw_log(vec![B256::repeat_byte(0xee)], Bytes::new());
    assert!(decoder.decode(&unknown).unwrap().is_none());

    let anonymous = raw_log(Vec::new(), Bytes::new());
    assert!(decoder.decode(&anonymous).unwrap().is_none());
}

#[test]
fn missing_topic_is_a_decode_error() {
    let mut log = shield_log();
    log.topics.pop();

    let err = decoder().decode(&log).unwrap_err();
    assert_eq!(err.event, "Shield");
    assert_eq!(err.log_index, 4);
    assert!(err.reason.contains("expected 4 topics, got 3"));
}

#[test]
fn truncated_data_is_a_decode_error() {
    let mut log = transfer_log();
    log.data = Bytes::copy_from_slice(&log.data[..40]);

    let err = decoder().decode(&log).unwrap_err();
    assert_eq!(err.event, "Transfer");
    assert!(err.reason.contains("invalid event data"));
}

#[test]
fn validation_rejects_dirty_address_topic() {
    let mut log = shield_log();
    log.topics[3].0[0] = 0xff;

    let lenient = decoder();
    assert!(lenient.decode(&log).unwrap().is_some());

    let strict = EventDecoder::new(DecodeCache::disabled(), DecoderOptions { validate: true });
    let err = strict.decode(&log).unwrap_err();
    assert!(err.reason.contains("left-padded address"));
    assert!(strict.decode(&shield_log()).unwrap().is_some());
}

#[test]
fn validation_rejects_trailing_data() {
    let mut log = shield_log();
    let mut data = log.data.to_vec();
    data.extend_from_slice(&[0u8; 32]);
    log.data = data.into();

    assert!(decoder().decode(&log).unwrap().is_some());

    let strict = EventDecoder::new(DecodeCache::disabled(), DecoderOptions { validate: true });
    assert!(strict.decode(&log).is_err());
}

#[test]
fn repeated_payload_is_served_from_cache() {
    let decoder = decoder();

    let first = decoder.decode(&shield_log()).unwrap();
    let second = decoder.decode(&shield_log()).unwrap();

    assert_eq!(first, second);
    let stats = decoder.cache().stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.entries, 1);
}

#[test]
fn decoding_does_not_depend_on_cache() {
    let cached = decoder();
    let uncached = EventDecoder::from_config(&DecoderConfig {
        cache_capacity: 0,
        cache_ttl_secs: 0,
        validate: false,
    });

    for log in [shield_log(), transfer_log(), shield_log()] {
        assert_eq!(
            cached.decode(&log).unwrap(),
            uncached.decode(&log).unwrap()
        );
    }
    assert!(uncached.cache().is_empty());
}
