//! Dependency-ordered transaction admission
//!
//! A transaction spending unconfirmed outputs is submitted together with the
//! transactions that create them. Parents go to the pool first, in the
//! order given, then the transaction itself; only when all of them were
//! accepted is the set handed to the syncer for broadcast.
//!
//! Admission is not atomic. Parents accepted before a later rejection stay
//! in the pool.

use crate::backend::{Syncer, TransactionPool};
use crate::error::{Context, Failure};
use crate::types::Transaction;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Body of a broadcast request: a transaction plus its unconfirmed parents.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastRequest {
    #[serde(default)]
    pub depends_on: Vec<Transaction>,
    pub transaction: Transaction,
}

pub async fn admit(
    pool: &dyn TransactionPool,
    syncer: &dyn Syncer,
    txn: Transaction,
    depends_on: Vec<Transaction>,
) -> Result<(), Failure> {
    for (i, parent) in depends_on.iter().enumerate() {
        let parent_id = parent.id();
        if let Err(e) = pool
            .add_transaction(parent.clone())
            .await
            .context("couldn't broadcast transaction dependency")
        {
            warn!(txid = %parent_id, position = i, error = %e.source, "dependency rejected");
            return Err(e);
        }
    }

    let id = txn.id();
    if let Err(e) = pool
        .add_transaction(txn.clone())
        .await
        .context("couldn't broadcast transaction")
    {
        warn!(txid = %id, error = %e.source, "transaction rejected");
        return Err(e);
    }

    syncer.broadcast_transaction(&txn, &depends_on).await;
    info!(txid = %id, dependencies = depends_on.len(), "transaction admitted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExplorerError, Result};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Accepts everything except transactions whose miner fee is 13, and
    /// records each submission.
    #[derive(Default)]
    struct RecordingPool {
        submitted: Mutex<Vec<Transaction>>,
        accepted: Mutex<Vec<Transaction>>,
    }

    #[async_trait]
    impl TransactionPool for RecordingPool {
        async fn transactions(&self) -> Vec<Transaction> {
            self.accepted.lock().clone()
        }

        async fn add_transaction(&self, txn: Transaction) -> Result<()> {
            self.submitted.lock().push(txn.clone());
            if txn.miner_fee.0 == 13 {
                return Err(ExplorerError::InvalidTransaction("unlucky fee".to_string()));
            }
            self.accepted.lock().push(txn);
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingSyncer {
        broadcasts: Mutex<Vec<(Transaction, Vec<Transaction>)>>,
    }

    #[async_trait]
    impl Syncer for RecordingSyncer {
        fn addr(&self) -> String {
            "127.0.0.1:9981".to_string()
        }

        async fn peers(&self) -> Vec<String> {
            Vec::new()
        }

        async fn connect(&self, _addr: &str) -> Result<()> {
            Ok(())
        }

        async fn broadcast_transaction(&self, txn: &Transaction, depends_on: &[Transaction]) {
            self.broadcasts
                .lock()
                .push((txn.clone(), depends_on.to_vec()));
        }
    }

    fn txn(fee: u128) -> Transaction {
        Transaction {
            miner_fee: crate::types::Currency(fee),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_all_valid_admits_in_order_then_broadcasts_once() {
        let pool = RecordingPool::default();
        let syncer = RecordingSyncer::default();
        let (d1, d2, t) = (txn(1), txn(2), txn(3));

        admit(&pool, &syncer, t.clone(), vec![d1.clone(), d2.clone()])
            .await
            .unwrap();

        assert_eq!(
            *pool.submitted.lock(),
            vec![d1.clone(), d2.clone(), t.clone()]
        );
        assert_eq!(*syncer.broadcasts.lock(), vec![(t, vec![d1, d2])]);
    }

    #[tokio::test]
    async fn test_rejected_dependency_stops_without_rollback_or_broadcast() {
        let pool = RecordingPool::default();
        let syncer = RecordingSyncer::default();
        let (d1, d2, t) = (txn(1), txn(13), txn(3));

        let err = admit(&pool, &syncer, t.clone(), vec![d1.clone(), d2.clone()])
            .await
            .unwrap_err();

        assert_eq!(err.context, "couldn't broadcast transaction dependency");
        assert_eq!(*pool.submitted.lock(), vec![d1.clone(), d2]);
        let pooled = pool.transactions().await;
        assert!(pooled.contains(&d1));
        assert!(!pooled.contains(&t));
        assert!(syncer.broadcasts.lock().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_primary_keeps_dependencies_and_skips_broadcast() {
        let pool = RecordingPool::default();
        let syncer = RecordingSyncer::default();
        let (d1, t) = (txn(1), txn(13));

        let err = admit(&pool, &syncer, t, vec![d1.clone()]).await.unwrap_err();

        assert_eq!(err.context, "couldn't broadcast transaction");
        assert_eq!(pool.transactions().await, vec![d1]);
        assert!(syncer.broadcasts.lock().is_empty());
    }

    #[tokio::test]
    async fn test_no_dependencies() {
        let pool = RecordingPool::default();
        let syncer = RecordingSyncer::default();
        admit(&pool, &syncer, txn(5), Vec::new()).await.unwrap();
        assert_eq!(syncer.broadcasts.lock().len(), 1);
    }

    #[test]
    fn test_request_json_field_names() {
        let req: BroadcastRequest =
            serde_json::from_str(r#"{"transaction": {"minerFee": "4"}}"#).unwrap();
        assert!(req.depends_on.is_empty());
        assert_eq!(req.transaction.miner_fee.0, 4);
        let json = serde_json::to_value(&req).unwrap();
        assert!(json["dependsOn"].is_array());
    }
}
