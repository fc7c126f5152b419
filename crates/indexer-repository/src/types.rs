use std::str::FromStr;

use indexer_domain::{Address, B256, Bytes, LeafRecord, U256, UnspentPayload, UnspentRecord};
use sea_orm::ActiveValue;

use crate::{
    error::{RepositoryError, Result},
    models::{leaf, unspent},
};

pub(crate) fn block_to_db(block: u64) -> Result<i64> {
    i64::try_from(block)
        .map_err(|_| RepositoryError::InvalidRecord(format!("block {block} exceeds i64::MAX")))
}

pub(crate) fn block_from_db(value: i64) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| RepositoryError::InvalidRecord(format!("negative block number {value}")))
}

/// 0x-prefixed lower-case hex, the form hashes are stored and compared in.
pub(crate) fn hash_to_db(hash: &B256) -> String {
    format!("{hash:#x}")
}

fn parse_hash(value: &str, field: &str) -> Result<B256> {
    B256::from_str(value)
        .map_err(|e| RepositoryError::InvalidRecord(format!("{field} '{value}': {e}")))
}

fn parse_uint(value: &str, field: &str) -> Result<U256> {
    U256::from_str_radix(value, 10)
        .map_err(|e| RepositoryError::InvalidRecord(format!("{field} '{value}': {e}")))
}

fn parse_address(value: &str, field: &str) -> Result<Address> {
    Address::from_str(value)
        .map_err(|e| RepositoryError::InvalidRecord(format!("{field} '{value}': {e}")))
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| RepositoryError::InvalidRecord(format!("public unspent without {field}")))
}

pub(crate) fn leaf_to_active_model(record: &LeafRecord) -> Result<leaf::ActiveModel> {
    let log_index = i32::try_from(record.log_index).map_err(|_| {
        RepositoryError::InvalidRecord(format!("log index {} exceeds i32::MAX", record.log_index))
    })?;

    Ok(leaf::ActiveModel {
        tx_id: ActiveValue::Set(hash_to_db(&record.tx_id)),
        log_index: ActiveValue::Set(log_index),
        block_number: ActiveValue::Set(block_to_db(record.block_number)?),
        commitment: ActiveValue::Set(hash_to_db(&record.commitment)),
        tree_index: ActiveValue::Set(record.tree_index.to_string()),
    })
}

pub(crate) fn leaf_from_model(model: leaf::Model) -> Result<LeafRecord> {
    let log_index = u32::try_from(model.log_index).map_err(|_| {
        RepositoryError::InvalidRecord(format!("negative log index {}", model.log_index))
    })?;

    Ok(LeafRecord {
        block_number: block_from_db(model.block_number)?,
        log_index,
        tx_id: parse_hash(&model.tx_id, "tx_id")?,
        commitment: parse_hash(&model.commitment, "commitment")?,
        tree_index: parse_uint(&model.tree_index, "tree_index")?,
    })
}

pub(crate) fn unspent_to_active_model(record: &UnspentRecord) -> Result<unspent::ActiveModel> {
    let mut model = unspent::ActiveModel {
        tx_id: ActiveValue::Set(hash_to_db(&record.tx_id)),
        block_number: ActiveValue::Set(block_to_db(record.block_number)?),
        is_encrypted: ActiveValue::Set(record.is_encrypted()),
        encrypted_payload: ActiveValue::Set(None),
        shield_address: ActiveValue::Set(None),
        amount: ActiveValue::Set(None),
        nonce: ActiveValue::Set(None),
        token: ActiveValue::Set(None),
    };

    match &record.payload {
        UnspentPayload::Encrypted { payload } => {
            model.encrypted_payload = ActiveValue::Set(Some(payload.to_vec()));
        }
        UnspentPayload::Public {
            shield_address,
            amount,
            nonce,
            token,
        } => {
            model.shield_address = ActiveValue::Set(Some(hash_to_db(shield_address)));
            model.amount = ActiveValue::Set(Some(amount.to_string()));
            model.nonce = ActiveValue::Set(Some(nonce.to_string()));
            model.token = ActiveValue::Set(Some(format!("{token:#x}")));
        }
    }

    Ok(model)
}

pub(crate) fn unspent_from_model(model: unspent::Model) -> Result<UnspentRecord> {
    let payload = if model.is_encrypted {
        UnspentPayload::Encrypted {
            payload: Bytes::from(model.encrypted_payload.unwrap_or_default()),
        }
    } else {
        UnspentPayload::Public {
            shield_address: parse_hash(
                required(&model.shield_address, "shield_address")?,
                "shield_address",
            )?,
            amount: parse_uint(required(&model.amount, "amount")?, "amount")?,
            nonce: parse_uint(required(&model.nonce, "nonce")?, "nonce")?,
            token: parse_address(required(&model.token, "token")?, "token")?,
        }
    };

    Ok(UnspentRecord {
        block_number: block_from_db(model.block_number)?,
        tx_id: parse_hash(&model.tx_id, "tx_id")?,
        payload,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn hashes_are_stored_lower_case_prefixed() {
        let hash = B256::repeat_byte(0xab);
        assert_eq!(hash_to_db(&hash), format!("0x{}", "ab".repeat(32)));
    }

    #[test]
    fn block_conversion_is_checked() {
        assert_eq!(block_to_db(42).unwrap(), 42);
        assert!(block_to_db(u64::MAX).is_err());
        assert!(block_from_db(-1).is_err());
    }

    #[test]
    fn public_row_without_amount_is_invalid() {
        let model = unspent::Model {
            tx_id: hash_to_db(&B256::repeat_byte(1)),
            block_number: 5,
            is_encrypted: false,
            encrypted_payload: None,
            shield_address: Some(hash_to_db(&B256::repeat_byte(2))),
            amount: None,
            nonce: Some("1".to_string()),
            token: Some(format!("{:#x}", Address::repeat_byte(3))),
        };

        let err = unspent_from_model(model).unwrap_err();
        assert!(err.to_string().contains("amount"));
    }
}
