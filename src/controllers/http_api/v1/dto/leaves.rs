use indexer_domain::{B256, LeafRecord, U256};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LeavesResponse {
    pub tree_index: String,
    pub commitments: Vec<String>,
}

impl LeavesResponse {
    pub(crate) fn new(tree_index: &U256, leaves: &[LeafRecord]) -> Self {
        Self {
            tree_index: tree_index.to_string(),
            commitments: leaves
                .iter()
                .map(|leaf| format!("{:#x}", leaf.commitment))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommitmentResponse {
    pub commitment: String,
    pub tree_index: String,
}

impl CommitmentResponse {
    pub(crate) fn new(commitment: &B256, leaf: &LeafRecord) -> Self {
        Self {
            commitment: format!("{commitment:#x}"),
            tree_index: leaf.tree_index.to_string(),
        }
    }
}
