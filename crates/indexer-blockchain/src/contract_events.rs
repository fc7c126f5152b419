use alloy::{primitives::B256, sol, sol_types::SolEvent};

sol! {
    /// Public deposit into the pool: one plain output plus its commitment.
    event Shield(
        bytes32 indexed shieldAddress,
        bytes32 indexed commitment,
        address indexed token,
        uint256 nonce,
        uint256 amount,
        uint256 treeIndex
    );

    /// Private transfer: one encrypted output plus its commitment.
    event Transfer(bytes32 indexed commitment, bytes encryptedPayload, uint256 treeIndex);
}

/// Pool events the indexer understands, keyed by topic0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolEventKind {
    Shield,
    Transfer,
}

impl PoolEventKind {
    pub const ALL: [PoolEventKind; 2] = [PoolEventKind::Shield, PoolEventKind::Transfer];

    pub fn from_signature(signature: &B256) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.signature() == *signature)
    }

    pub fn signature(&self) -> B256 {
        match self {
            PoolEventKind::Shield => Shield::SIGNATURE_HASH,
            PoolEventKind::Transfer => Transfer::SIGNATURE_HASH,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PoolEventKind::Shield => "Shield",
            PoolEventKind::Transfer => "Transfer",
        }
    }

    /// Number of topics including topic0.
    pub fn topic_count(&self) -> usize {
        match self {
            PoolEventKind::Shield => 4,
            PoolEventKind::Transfer => 2,
        }
    }

    /// ABI type of the non-indexed data section.
    pub fn data_type(&self) -> &'static str {
        match self {
            PoolEventKind::Shield => "(uint256,uint256,uint256)",
            PoolEventKind::Transfer => "(bytes,uint256)",
        }
    }
}

/// Topic0 filter for every event the indexer consumes.
pub fn monitored_event_signatures() -> Vec<B256> {
    PoolEventKind::ALL
        .iter()
        .map(PoolEventKind::signature)
        .collect()
}
