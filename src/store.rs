//! In-memory element index
//!
//! [`MemoryStore`] implements [`Explorer`] and [`ChainManager`] over plain
//! hash maps. It is what `explorerd` serves when no external indexer is
//! attached, and what the integration tests seed. Nothing is persisted and
//! nothing is validated: callers feed it already-accepted chain data.

use crate::backend::{ChainManager, Explorer};
use crate::chain::{ChainIndex, ChainStats, ConsensusState};
use crate::error::{ExplorerError, Result};
use crate::types::{
    Address, Currency, ElementId, FileContractElement, SiacoinElement, SiafundElement,
    Transaction, TransactionId,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

#[derive(Default)]
struct StoreInner {
    siacoin_elements: HashMap<ElementId, SiacoinElement>,
    siafund_elements: HashMap<ElementId, SiafundElement>,
    contracts: HashMap<ElementId, FileContractElement>,
    // Per-address unspent ids, in the order they were created.
    unspent_siacoins: HashMap<Address, Vec<ElementId>>,
    unspent_siafunds: HashMap<Address, Vec<ElementId>>,
    transactions: HashMap<TransactionId, Transaction>,
    // Oldest first; reversed when paging.
    address_transactions: HashMap<Address, Vec<TransactionId>>,
    stats: BTreeMap<u64, ChainStats>,
    states: HashMap<ChainIndex, ConsensusState>,
    tip: Option<ChainIndex>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<StoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new unspent siacoin element.
    pub fn add_siacoin_element(&self, elem: SiacoinElement) {
        let mut inner = self.inner.write();
        inner
            .unspent_siacoins
            .entry(elem.output.address)
            .or_default()
            .push(elem.id);
        inner.siacoin_elements.insert(elem.id, elem);
    }

    /// Record a new unspent siafund element.
    pub fn add_siafund_element(&self, elem: SiafundElement) {
        let mut inner = self.inner.write();
        inner
            .unspent_siafunds
            .entry(elem.output.address)
            .or_default()
            .push(elem.id);
        inner.siafund_elements.insert(elem.id, elem);
    }

    pub fn add_file_contract(&self, elem: FileContractElement) {
        self.inner.write().contracts.insert(elem.id, elem);
    }

    /// Mark a siacoin element spent. The element stays queryable by id but
    /// no longer counts towards its address' balance.
    pub fn spend_siacoin_element(&self, id: &ElementId) -> Result<()> {
        let mut inner = self.inner.write();
        let address = inner
            .siacoin_elements
            .get(id)
            .map(|e| e.output.address)
            .ok_or_else(|| ExplorerError::NotFound(format!("siacoin element {}", id)))?;
        if let Some(ids) = inner.unspent_siacoins.get_mut(&address) {
            ids.retain(|e| e != id);
        }
        Ok(())
    }

    pub fn spend_siafund_element(&self, id: &ElementId) -> Result<()> {
        let mut inner = self.inner.write();
        let address = inner
            .siafund_elements
            .get(id)
            .map(|e| e.output.address)
            .ok_or_else(|| ExplorerError::NotFound(format!("siafund element {}", id)))?;
        if let Some(ids) = inner.unspent_siafunds.get_mut(&address) {
            ids.retain(|e| e != id);
        }
        Ok(())
    }

    /// Record a confirmed transaction and index it under every address it
    /// pays to.
    pub fn add_transaction(&self, txn: Transaction) -> TransactionId {
        let id = txn.id();
        let mut inner = self.inner.write();
        for addr in txn.addresses() {
            inner.address_transactions.entry(addr).or_default().push(id);
        }
        inner.transactions.insert(id, txn);
        id
    }

    /// Record the stats and resulting state of a block. The tip moves to the
    /// highest block seen.
    pub fn add_block(&self, stats: ChainStats, state: ConsensusState) {
        let mut inner = self.inner.write();
        let index = stats.block;
        if inner.tip.map_or(true, |tip| index.height >= tip.height) {
            inner.tip = Some(index);
        }
        inner.stats.insert(index.height, stats);
        inner.states.insert(index, state);
    }

    pub fn tip(&self) -> Option<ChainIndex> {
        self.inner.read().tip
    }
}

#[async_trait]
impl Explorer for MemoryStore {
    async fn siacoin_element(&self, id: &ElementId) -> Result<SiacoinElement> {
        self.inner
            .read()
            .siacoin_elements
            .get(id)
            .cloned()
            .ok_or_else(|| ExplorerError::NotFound(format!("siacoin element {}", id)))
    }

    async fn siafund_element(&self, id: &ElementId) -> Result<SiafundElement> {
        self.inner
            .read()
            .siafund_elements
            .get(id)
            .cloned()
            .ok_or_else(|| ExplorerError::NotFound(format!("siafund element {}", id)))
    }

    async fn file_contract_element(&self, id: &ElementId) -> Result<FileContractElement> {
        self.inner
            .read()
            .contracts
            .get(id)
            .cloned()
            .ok_or_else(|| ExplorerError::NotFound(format!("file contract {}", id)))
    }

    async fn chain_stats(&self, index: &ChainIndex) -> Result<ChainStats> {
        self.inner
            .read()
            .stats
            .get(&index.height)
            .filter(|s| s.block == *index)
            .cloned()
            .ok_or_else(|| ExplorerError::NotFound(format!("chain stats at {}", index)))
    }

    async fn chain_stats_latest(&self) -> Result<ChainStats> {
        let inner = self.inner.read();
        inner
            .tip
            .and_then(|tip| inner.stats.get(&tip.height))
            .cloned()
            .ok_or_else(|| ExplorerError::NotFound("no blocks have been indexed".to_string()))
    }

    async fn siacoin_balance(&self, address: &Address) -> Result<Currency> {
        let inner = self.inner.read();
        let ids = inner.unspent_siacoins.get(address).map(Vec::as_slice).unwrap_or(&[]);
        ids.iter()
            .filter_map(|id| inner.siacoin_elements.get(id))
            .try_fold(Currency::ZERO, |acc, e| acc.checked_add(e.output.value))
            .ok_or_else(|| {
                ExplorerError::Internal(format!("siacoin balance of {} overflows", address))
            })
    }

    async fn siafund_balance(&self, address: &Address) -> Result<u64> {
        let inner = self.inner.read();
        let ids = inner.unspent_siafunds.get(address).map(Vec::as_slice).unwrap_or(&[]);
        ids.iter()
            .filter_map(|id| inner.siafund_elements.get(id))
            .try_fold(0u64, |acc, e| acc.checked_add(e.output.value))
            .ok_or_else(|| {
                ExplorerError::Internal(format!("siafund balance of {} overflows", address))
            })
    }

    async fn transaction(&self, id: &TransactionId) -> Result<Transaction> {
        self.inner
            .read()
            .transactions
            .get(id)
            .cloned()
            .ok_or_else(|| ExplorerError::NotFound(format!("transaction {}", id)))
    }

    async fn unspent_siacoin_elements(&self, address: &Address) -> Result<Vec<ElementId>> {
        Ok(self
            .inner
            .read()
            .unspent_siacoins
            .get(address)
            .cloned()
            .unwrap_or_default())
    }

    async fn unspent_siafund_elements(&self, address: &Address) -> Result<Vec<ElementId>> {
        Ok(self
            .inner
            .read()
            .unspent_siafunds
            .get(address)
            .cloned()
            .unwrap_or_default())
    }

    async fn transactions(
        &self,
        address: &Address,
        amount: usize,
        offset: usize,
    ) -> Result<Vec<TransactionId>> {
        let inner = self.inner.read();
        let ids = inner
            .address_transactions
            .get(address)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        Ok(ids.iter().rev().skip(offset).take(amount).copied().collect())
    }

    async fn state(&self, index: &ChainIndex) -> Result<ConsensusState> {
        self.inner
            .read()
            .states
            .get(index)
            .cloned()
            .ok_or_else(|| ExplorerError::NotFound(format!("consensus state at {}", index)))
    }
}

#[async_trait]
impl ChainManager for MemoryStore {
    async fn tip_state(&self) -> ConsensusState {
        let inner = self.inner.read();
        inner
            .tip
            .and_then(|tip| inner.states.get(&tip))
            .cloned()
            .unwrap_or_default()
    }
}
