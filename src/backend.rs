//! Capability boundaries consumed by the API
//!
//! The facade never owns chain data. Everything it reports or changes goes
//! through one of these four contracts, held as `Arc<dyn ...>` so the node
//! binary, the in-memory implementations and test doubles plug in the same
//! way.

use crate::chain::{ChainIndex, ChainStats, ConsensusState};
use crate::error::Result;
use crate::types::{
    Address, Currency, ElementId, FileContractElement, SiacoinElement, SiafundElement,
    Transaction, TransactionId,
};
use async_trait::async_trait;

/// A Syncer connects to other peers and relays transactions to them.
#[async_trait]
pub trait Syncer: Send + Sync {
    /// Address this node listens on for peer connections.
    fn addr(&self) -> String;
    async fn peers(&self) -> Vec<String>;
    async fn connect(&self, addr: &str) -> Result<()>;
    async fn broadcast_transaction(&self, txn: &Transaction, depends_on: &[Transaction]);
}

/// A TransactionPool validates and holds unconfirmed transactions.
#[async_trait]
pub trait TransactionPool: Send + Sync {
    async fn transactions(&self) -> Vec<Transaction>;
    async fn add_transaction(&self, txn: Transaction) -> Result<()>;
}

/// A ChainManager tracks the current consensus state.
#[async_trait]
pub trait ChainManager: Send + Sync {
    async fn tip_state(&self) -> ConsensusState;
}

/// An Explorer answers historical queries about blocks, outputs, contracts
/// and transactions.
#[async_trait]
pub trait Explorer: Send + Sync {
    async fn siacoin_element(&self, id: &ElementId) -> Result<SiacoinElement>;
    async fn siafund_element(&self, id: &ElementId) -> Result<SiafundElement>;
    async fn file_contract_element(&self, id: &ElementId) -> Result<FileContractElement>;
    async fn chain_stats(&self, index: &ChainIndex) -> Result<ChainStats>;
    async fn chain_stats_latest(&self) -> Result<ChainStats>;
    async fn siacoin_balance(&self, address: &Address) -> Result<Currency>;
    async fn siafund_balance(&self, address: &Address) -> Result<u64>;
    async fn transaction(&self, id: &TransactionId) -> Result<Transaction>;
    async fn unspent_siacoin_elements(&self, address: &Address) -> Result<Vec<ElementId>>;
    async fn unspent_siafund_elements(&self, address: &Address) -> Result<Vec<ElementId>>;
    /// Ids of the transactions `address` took part in, newest first,
    /// skipping `offset` and returning at most `amount`.
    async fn transactions(
        &self,
        address: &Address,
        amount: usize,
        offset: usize,
    ) -> Result<Vec<TransactionId>>;
    async fn state(&self, index: &ChainIndex) -> Result<ConsensusState>;
}
