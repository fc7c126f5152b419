use alloy::hex;
use indexer_domain::{UnspentPayload, UnspentRecord};
use serde::{Deserialize, Serialize};

/// Page size used when the request does not name one.
pub(crate) const DEFAULT_PAGE_LIMIT: u64 = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UnspentsQuery {
    #[serde(default)]
    pub encrypted: bool,
    #[serde(default)]
    pub offset: u64,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UnspentsResponse {
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
    pub items: Vec<UnspentItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UnspentItem {
    pub block_number: u64,
    pub tx_id: String,
    pub is_encrypted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypted_payload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shield_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl From<&UnspentRecord> for UnspentItem {
    fn from(record: &UnspentRecord) -> Self {
        let mut item = Self {
            block_number: record.block_number,
            tx_id: format!("{:#x}", record.tx_id),
            is_encrypted: record.is_encrypted(),
            encrypted_payload: None,
            shield_address: None,
            amount: None,
            nonce: None,
            token: None,
        };
        match &record.payload {
            UnspentPayload::Encrypted { payload } => {
                item.encrypted_payload = Some(hex::encode_prefixed(payload));
            }
            UnspentPayload::Public {
                shield_address,
                amount,
                nonce,
                token,
            } => {
                item.shield_address = Some(format!("{shield_address:#x}"));
                item.amount = Some(amount.to_string());
                item.nonce = Some(nonce.to_string());
                item.token = Some(format!("{token:#x}"));
            }
        }
        item
    }
}
