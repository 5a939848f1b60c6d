//! Peer registry standing in for the gossip stack
//!
//! [`PeerSyncer`] implements [`Syncer`] without opening connections: it
//! tracks the peers it was asked to connect to and queues outbound
//! transaction broadcasts so a transport (or a test) can drain them.

use crate::backend::Syncer;
use crate::error::{ExplorerError, Result};
use crate::types::Transaction;
use async_trait::async_trait;
use std::collections::{BTreeSet, VecDeque};
use tokio::sync::RwLock;
use tracing::info;

/// A relayed transaction together with the unconfirmed parents it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Broadcast {
    pub transaction: Transaction,
    pub depends_on: Vec<Transaction>,
}

pub struct PeerSyncer {
    listen_addr: String,
    peers: RwLock<BTreeSet<String>>,
    /// Queue of broadcasts pending relay
    outbound: RwLock<VecDeque<Broadcast>>,
}

impl PeerSyncer {
    pub fn new(listen_addr: impl Into<String>) -> Self {
        Self {
            listen_addr: listen_addr.into(),
            peers: RwLock::new(BTreeSet::new()),
            outbound: RwLock::new(VecDeque::new()),
        }
    }

    /// Get peer count
    pub async fn peer_count(&self) -> usize {
        self.peers.read().await.len()
    }

    /// Take every queued broadcast, oldest first.
    pub async fn drain_broadcasts(&self) -> Vec<Broadcast> {
        self.outbound.write().await.drain(..).collect()
    }
}

/// Checks that `addr` has the form `host:port`.
pub fn validate_peer_addr(addr: &str) -> Result<()> {
    let (host, port) = addr.rsplit_once(':').ok_or_else(|| {
        ExplorerError::InvalidInput(format!("peer address {:?} must be host:port", addr))
    })?;
    if host.is_empty() {
        return Err(ExplorerError::InvalidInput(format!(
            "peer address {:?} has an empty host",
            addr
        )));
    }
    port.parse::<u16>()
        .map_err(|e| ExplorerError::InvalidInput(format!("invalid peer port {:?}: {}", port, e)))?;
    Ok(())
}

#[async_trait]
impl Syncer for PeerSyncer {
    fn addr(&self) -> String {
        self.listen_addr.clone()
    }

    async fn peers(&self) -> Vec<String> {
        self.peers.read().await.iter().cloned().collect()
    }

    async fn connect(&self, addr: &str) -> Result<()> {
        validate_peer_addr(addr)?;
        if addr == self.listen_addr {
            return Err(ExplorerError::NetworkError(
                "refusing to connect to self".to_string(),
            ));
        }

        if self.peers.write().await.insert(addr.to_string()) {
            info!(peer = %addr, "connected to peer");
            Ok(())
        } else {
            Err(ExplorerError::NetworkError(format!(
                "already connected to {}",
                addr
            )))
        }
    }

    async fn broadcast_transaction(&self, txn: &Transaction, depends_on: &[Transaction]) {
        let peers = self.peer_count().await;
        info!(
            txid = %txn.id(),
            dependencies = depends_on.len(),
            peers,
            "broadcasting transaction"
        );
        self.outbound.write().await.push_back(Broadcast {
            transaction: txn.clone(),
            depends_on: depends_on.to_vec(),
        });
    }
}
