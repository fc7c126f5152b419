use alloy::primitives::{Address, B256, Bytes, U256};

/// One commitment emitted by the pool contract, together with the tree position
/// the contract assigned to it.
///
/// Unique on `(tx_id, log_index, block_number)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafRecord {
    pub block_number: u64,
    pub log_index: u32,
    pub tx_id: B256,
    pub commitment: B256,
    pub tree_index: U256,
}

/// Output payload carried by an [`UnspentRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnspentPayload {
    /// Opaque ciphertext emitted by a private transfer.
    Encrypted { payload: Bytes },
    /// Plain output created by a public deposit.
    Public {
        shield_address: B256,
        amount: U256,
        nonce: U256,
        token: Address,
    },
}

/// An output made available by a shield or transfer event.
///
/// Unique on `(tx_id, block_number)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnspentRecord {
    pub block_number: u64,
    pub tx_id: B256,
    pub payload: UnspentPayload,
}

impl UnspentRecord {
    pub fn is_encrypted(&self) -> bool {
        matches!(self.payload, UnspentPayload::Encrypted { .. })
    }
}
