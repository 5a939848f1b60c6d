//! Request and response bodies specific to the HTTP surface

use serde::{Deserialize, Serialize};

/// Error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// One connected peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerResponse {
    pub net_address: String,
}

/// Paging for `/explorer/address/:address/transactions`. Missing values are
/// zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionsQuery {
    pub amount: usize,
    pub offset: usize,
}
