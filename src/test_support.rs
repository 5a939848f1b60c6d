//! Spy wrapper used by the unit tests of the composing modules.

use crate::backend::Explorer;
use crate::chain::{ChainIndex, ChainStats, ConsensusState};
use crate::error::{ExplorerError, Result};
use crate::store::MemoryStore;
use crate::types::{
    Address, Currency, ElementId, FileContractElement, SiacoinElement, SiafundElement,
    Transaction, TransactionId,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Records every call by method name and forwards to a [`MemoryStore`],
/// optionally failing the n-th call of a given method.
#[derive(Default)]
pub(crate) struct SpyExplorer {
    pub store: MemoryStore,
    calls: Mutex<Vec<&'static str>>,
    failures: Mutex<HashMap<&'static str, usize>>,
}

impl SpyExplorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the `nth` (zero-based) call of `method` fail.
    pub fn fail_call(&self, method: &'static str, nth: usize) {
        self.failures.lock().insert(method, nth);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    fn record(&self, method: &'static str) -> Result<()> {
        let mut calls = self.calls.lock();
        let seen = calls.iter().filter(|m| **m == method).count();
        calls.push(method);
        match self.failures.lock().get(method) {
            Some(&nth) if nth == seen => Err(ExplorerError::StorageError(format!(
                "injected failure in {}",
                method
            ))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Explorer for SpyExplorer {
    async fn siacoin_element(&self, id: &ElementId) -> Result<SiacoinElement> {
        self.record("siacoin_element")?;
        self.store.siacoin_element(id).await
    }

    async fn siafund_element(&self, id: &ElementId) -> Result<SiafundElement> {
        self.record("siafund_element")?;
        self.store.siafund_element(id).await
    }

    async fn file_contract_element(&self, id: &ElementId) -> Result<FileContractElement> {
        self.record("file_contract_element")?;
        self.store.file_contract_element(id).await
    }

    async fn chain_stats(&self, index: &ChainIndex) -> Result<ChainStats> {
        self.record("chain_stats")?;
        self.store.chain_stats(index).await
    }

    async fn chain_stats_latest(&self) -> Result<ChainStats> {
        self.record("chain_stats_latest")?;
        self.store.chain_stats_latest().await
    }

    async fn siacoin_balance(&self, address: &Address) -> Result<Currency> {
        self.record("siacoin_balance")?;
        self.store.siacoin_balance(address).await
    }

    async fn siafund_balance(&self, address: &Address) -> Result<u64> {
        self.record("siafund_balance")?;
        self.store.siafund_balance(address).await
    }

    async fn transaction(&self, id: &TransactionId) -> Result<Transaction> {
        self.record("transaction")?;
        self.store.transaction(id).await
    }

    async fn unspent_siacoin_elements(&self, address: &Address) -> Result<Vec<ElementId>> {
        self.record("unspent_siacoin_elements")?;
        self.store.unspent_siacoin_elements(address).await
    }

    async fn unspent_siafund_elements(&self, address: &Address) -> Result<Vec<ElementId>> {
        self.record("unspent_siafund_elements")?;
        self.store.unspent_siafund_elements(address).await
    }

    async fn transactions(
        &self,
        address: &Address,
        amount: usize,
        offset: usize,
    ) -> Result<Vec<TransactionId>> {
        self.record("transactions")?;
        self.store.transactions(address, amount, offset).await
    }

    async fn state(&self, index: &ChainIndex) -> Result<ConsensusState> {
        self.record("state")?;
        self.store.state(index).await
    }
}
