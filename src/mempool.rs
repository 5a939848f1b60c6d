//! In-memory transaction pool
//!
//! Performs only the structural checks a relay needs before holding a
//! transaction: non-empty, bounded size, and no input spent twice (within the
//! transaction or against anything already pooled). Consensus validity is
//! left to the chain.

use crate::backend::TransactionPool;
use crate::error::{ExplorerError, Result};
use crate::types::{ElementId, Transaction, TransactionId};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Maximum transaction size in bytes (100KB) to prevent DoS
pub const MAX_TRANSACTION_SIZE: usize = 100_000;

#[derive(Default)]
struct PoolInner {
    // Admission order.
    txns: Vec<Transaction>,
    ids: HashSet<TransactionId>,
    // Parent element -> pooled transaction spending it.
    spent: HashMap<ElementId, TransactionId>,
}

#[derive(Default)]
pub struct Mempool {
    inner: RwLock<PoolInner>,
}

impl Mempool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().txns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: &TransactionId) -> bool {
        self.inner.read().ids.contains(id)
    }
}

/// Reject transactions that could never be relayed.
pub fn validate_transaction(txn: &Transaction) -> Result<()> {
    if txn.is_empty() {
        return Err(ExplorerError::InvalidTransaction(
            "transaction has no inputs, outputs or contracts".to_string(),
        ));
    }

    let size = bincode::serialized_size(txn)? as usize;
    if size > MAX_TRANSACTION_SIZE {
        return Err(ExplorerError::InvalidTransaction(format!(
            "transaction too large: {} bytes (max: {})",
            size, MAX_TRANSACTION_SIZE
        )));
    }

    let mut parents = HashSet::new();
    for parent in spent_parents(txn) {
        if !parents.insert(parent) {
            return Err(ExplorerError::InvalidTransaction(format!(
                "element {} is spent twice",
                parent
            )));
        }
    }
    Ok(())
}

fn spent_parents(txn: &Transaction) -> impl Iterator<Item = ElementId> + '_ {
    txn.siacoin_inputs
        .iter()
        .map(|i| i.parent)
        .chain(txn.siafund_inputs.iter().map(|i| i.parent))
}

#[async_trait]
impl TransactionPool for Mempool {
    async fn transactions(&self) -> Vec<Transaction> {
        self.inner.read().txns.clone()
    }

    async fn add_transaction(&self, txn: Transaction) -> Result<()> {
        validate_transaction(&txn)?;

        let id = txn.id();
        let mut inner = self.inner.write();
        if inner.ids.contains(&id) {
            debug!(txid = %id, "transaction already in pool");
            return Ok(());
        }
        for parent in spent_parents(&txn) {
            if let Some(other) = inner.spent.get(&parent) {
                return Err(ExplorerError::InvalidTransaction(format!(
                    "element {} is already spent by pooled transaction {}",
                    parent, other
                )));
            }
        }

        for parent in spent_parents(&txn) {
            inner.spent.insert(parent, id);
        }
        inner.ids.insert(id);
        inner.txns.push(txn);
        debug!(txid = %id, pool_size = inner.txns.len(), "transaction added to pool");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Address, Currency, Hash256, SiacoinInput, SiacoinOutput};

    fn spend(parent_seed: u8, value: u128) -> Transaction {
        Transaction {
            siacoin_inputs: vec![SiacoinInput {
                parent: ElementId::new(Hash256([parent_seed; 32]), 0),
            }],
            siacoin_outputs: vec![SiacoinOutput {
                value: Currency(value),
                address: Address::from([0xaa; 32]),
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_add_and_list_in_admission_order() {
        let pool = Mempool::new();
        let a = spend(1, 10);
        let b = spend(2, 20);
        pool.add_transaction(a.clone()).await.unwrap();
        pool.add_transaction(b.clone()).await.unwrap();
        assert_eq!(pool.transactions().await, vec![a, b]);
    }

    #[tokio::test]
    async fn test_resubmission_is_a_no_op() {
        let pool = Mempool::new();
        let a = spend(1, 10);
        pool.add_transaction(a.clone()).await.unwrap();
        pool.add_transaction(a).await.unwrap();
        assert_eq!(pool.len(), 1);
    }

    #[tokio::test]
    async fn test_rejects_double_spend_against_pool() {
        let pool = Mempool::new();
        pool.add_transaction(spend(1, 10)).await.unwrap();
        let err = pool.add_transaction(spend(1, 11)).await.unwrap_err();
        assert!(matches!(err, ExplorerError::InvalidTransaction(_)));
        assert_eq!(pool.len(), 1);
    }

    #[tokio::test]
    async fn test_rejects_empty_and_self_conflicting_transactions() {
        let pool = Mempool::new();
        assert!(pool.add_transaction(Transaction::default()).await.is_err());

        let mut txn = spend(3, 1);
        txn.siacoin_inputs.push(txn.siacoin_inputs[0].clone());
        assert!(pool.add_transaction(txn).await.is_err());
        assert!(pool.is_empty());
    }

    #[tokio::test]
    async fn test_rejects_oversized_transaction() {
        let mut txn = spend(4, 1);
        txn.siacoin_outputs = vec![
            SiacoinOutput {
                value: Currency(1),
                address: Address::from([1; 32]),
            };
            2_000
        ];
        assert!(matches!(
            validate_transaction(&txn),
            Err(ExplorerError::InvalidTransaction(_))
        ));
    }
}
