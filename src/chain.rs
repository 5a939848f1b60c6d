//! Chain positions, per-block statistics and consensus state snapshots

use crate::error::ExplorerError;
use crate::types::{prefixed_id, Currency, Hash256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

prefixed_id!(
    /// Identifies a block by its header hash.
    BlockId,
    "bid"
);

/// Path segment that selects the latest indexed block instead of a
/// specific chain index.
pub const TIP: &str = "tip";

/// A position in the chain: a height and the id of the block at that height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChainIndex {
    pub height: u64,
    pub id: BlockId,
}

impl ChainIndex {
    pub fn new(height: u64, id: BlockId) -> Self {
        Self { height, id }
    }
}

impl fmt::Display for ChainIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}::{}", self.height, self.id.0)
    }
}

/// Parses `<height>::<block id>`. The literal `tip` is not a chain index;
/// callers that accept it must check for it before parsing.
impl FromStr for ChainIndex {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (height, id) = s.split_once("::").ok_or_else(|| {
            ExplorerError::InvalidInput(format!(
                "chain index {:?} must have the form <height>::<id>",
                s
            ))
        })?;
        let height = height
            .parse::<u64>()
            .map_err(|e| ExplorerError::InvalidInput(format!("invalid chain height: {}", e)))?;
        Ok(ChainIndex {
            height,
            id: id.parse()?,
        })
    }
}

crate::types::impl_string_serde!(ChainIndex);

/// Aggregate statistics recorded by the index for one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainStats {
    pub block: ChainIndex,
    pub timestamp: DateTime<Utc>,
    pub transaction_count: u64,
    pub siacoin_inputs: u64,
    pub siacoin_outputs: u64,
    pub siafund_inputs: u64,
    pub siafund_outputs: u64,
    pub file_contracts: u64,
    pub active_contract_count: u64,
    pub total_active_contract_size: u64,
}

impl ChainStats {
    /// Stats for a block with no activity.
    pub fn empty(block: ChainIndex, timestamp: DateTime<Utc>) -> Self {
        Self {
            block,
            timestamp,
            transaction_count: 0,
            siacoin_inputs: 0,
            siacoin_outputs: 0,
            siafund_inputs: 0,
            siafund_outputs: 0,
            file_contracts: 0,
            active_contract_count: 0,
            total_active_contract_size: 0,
        }
    }
}

/// The validation context in effect after the block at `index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusState {
    pub index: ChainIndex,
    pub timestamp: DateTime<Utc>,
    pub difficulty: Hash256,
    pub total_work: Hash256,
    pub siafund_pool: Currency,
}

impl Default for ConsensusState {
    fn default() -> Self {
        Self {
            index: ChainIndex::default(),
            timestamp: DateTime::<Utc>::default(),
            difficulty: Hash256::default(),
            total_work: Hash256::default(),
            siafund_pool: Currency::ZERO,
        }
    }
}
