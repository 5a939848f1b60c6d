//! Shared doubles for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::http::{header, HeaderName, HeaderValue};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{TimeZone, Utc};
use explorerd::backend::Explorer;
use explorerd::chain::{BlockId, ChainIndex, ChainStats, ConsensusState};
use explorerd::error::{ExplorerError, Result};
use explorerd::store::MemoryStore;
use explorerd::types::{
    Address, Currency, ElementId, FileContractElement, Hash256, SiacoinElement, SiacoinOutput,
    SiafundElement, SiafundOutput, Transaction, TransactionId,
};
use parking_lot::Mutex;

pub const PASSWORD: &str = "correct horse";

/// `Authorization` header carrying `password` with an arbitrary username.
pub fn basic_auth(user: &str, password: &str) -> (HeaderName, HeaderValue) {
    let encoded = STANDARD.encode(format!("{}:{}", user, password));
    let value = HeaderValue::from_str(&format!("Basic {}", encoded)).unwrap();
    (header::AUTHORIZATION, value)
}

pub fn auth() -> (HeaderName, HeaderValue) {
    basic_auth("", PASSWORD)
}

pub fn addr(seed: u8) -> Address {
    Address::from([seed; 32])
}

pub fn elem_id(seed: u8, index: u64) -> ElementId {
    ElementId::new(Hash256([seed; 32]), index)
}

pub fn block(height: u64) -> ChainIndex {
    ChainIndex::new(height, BlockId::from([height as u8; 32]))
}

/// Explorer over a [`MemoryStore`] that records every call and can be told
/// to fail the nth call of one method.
#[derive(Default)]
pub struct CountingExplorer {
    pub store: MemoryStore,
    calls: Mutex<Vec<&'static str>>,
    pages: Mutex<Vec<(usize, usize)>>,
    failure: Mutex<Option<(&'static str, usize)>>,
    pub tip_state_calls: Mutex<usize>,
}

impl CountingExplorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_call(&self, method: &'static str, nth: usize) {
        *self.failure.lock() = Some((method, nth));
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    /// `(amount, offset)` of every `transactions` call.
    pub fn pages(&self) -> Vec<(usize, usize)> {
        self.pages.lock().clone()
    }

    fn record(&self, method: &'static str) -> Result<()> {
        let mut calls = self.calls.lock();
        let nth = calls.iter().filter(|c| **c == method).count();
        calls.push(method);
        if *self.failure.lock() == Some((method, nth)) {
            return Err(ExplorerError::StorageError(format!("{} unavailable", method)));
        }
        Ok(())
    }

    pub fn fund_siacoins(&self, owner: Address, id: ElementId, value: u128) -> SiacoinElement {
        let elem = SiacoinElement {
            id,
            output: SiacoinOutput {
                value: Currency(value),
                address: owner,
            },
            maturity_height: 0,
        };
        self.store.add_siacoin_element(elem.clone());
        elem
    }

    pub fn fund_siafunds(&self, owner: Address, id: ElementId, value: u64) -> SiafundElement {
        let elem = SiafundElement {
            id,
            output: SiafundOutput {
                value,
                address: owner,
            },
            claim_start: Currency::ZERO,
        };
        self.store.add_siafund_element(elem.clone());
        elem
    }

    pub fn mine(&self, height: u64) -> ChainStats {
        let ts = Utc.timestamp_opt(1_700_000_000 + height as i64 * 600, 0).unwrap();
        let mut stats = ChainStats::empty(block(height), ts);
        stats.transaction_count = height;
        let state = ConsensusState {
            index: block(height),
            timestamp: ts,
            ..Default::default()
        };
        self.store.add_block(stats.clone(), state);
        stats
    }
}

#[async_trait]
impl Explorer for CountingExplorer {
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
        self.pages.lock().push((amount, offset));
        self.store.transactions(address, amount, offset).await
    }

    async fn state(&self, index: &ChainIndex) -> Result<ConsensusState> {
        self.record("state")?;
        self.store.state(index).await
    }
}

/// Chain manager reads go straight to the store and are counted apart from
/// explorer calls.
#[async_trait]
impl explorerd::backend::ChainManager for CountingExplorer {
    async fn tip_state(&self) -> ConsensusState {
        *self.tip_state_calls.lock() += 1;
        explorerd::backend::ChainManager::tip_state(&self.store).await
    }
}
