//! Node orchestration: wires the in-memory backends to the API server

use crate::api::{self, Server};
use crate::backend::Syncer;
use crate::config::Config;
use crate::mempool::Mempool;
use crate::store::MemoryStore;
use crate::sync::PeerSyncer;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Booting,
    Ready,
    Stopped,
}

pub struct Node {
    pub config: Config,
    pub store: Arc<MemoryStore>,
    pub mempool: Arc<Mempool>,
    pub syncer: Arc<PeerSyncer>,
    state: parking_lot::RwLock<NodeState>,
}

/// Install the global tracing subscriber. `RUST_LOG` wins over `level`.
/// Calling this twice is harmless.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

impl Node {
    /// Build the node from a validated config.
    pub fn init(config: Config) -> Self {
        info!(
            http = %config.http.address,
            gateway = %config.network.gateway_address,
            "initializing explorerd"
        );
        let syncer = Arc::new(PeerSyncer::new(config.network.gateway_address.clone()));
        Self {
            config,
            store: Arc::new(MemoryStore::new()),
            mempool: Arc::new(Mempool::new()),
            syncer,
            state: parking_lot::RwLock::new(NodeState::Booting),
        }
    }

    pub fn state(&self) -> NodeState {
        *self.state.read()
    }

    /// The API view of this node's backends.
    pub fn server(&self) -> Arc<Server> {
        Arc::new(Server::new(
            self.store.clone(),
            self.syncer.clone(),
            self.mempool.clone(),
            self.store.clone(),
        ))
    }

    /// Connect to every bootstrap peer. Failures are logged and skipped.
    pub async fn bootstrap(&self) {
        for peer in &self.config.network.bootstrap_peers {
            match self.syncer.connect(peer).await {
                Ok(()) => info!(%peer, "connected to bootstrap peer"),
                Err(e) => warn!(%peer, error = %e, "failed to connect to bootstrap peer"),
            }
        }
    }

    /// Bootstrap, then serve the API until `shutdown` resolves.
    pub async fn start(
        &self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.bootstrap().await;
        *self.state.write() = NodeState::Ready;

        let result = api::run_api_server(self.server(), &self.config.http, shutdown).await;

        *self.state.write() = NodeState::Stopped;
        info!("explorerd stopped");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config() -> Config {
        let mut config = Config::default();
        config.http.password = "pw".to_string();
        config.http.address = "127.0.0.1:0".to_string();
        config.network.bootstrap_peers = vec![
            "10.0.0.1:9981".to_string(),
            "10.0.0.1:9981".to_string(),
            "10.0.0.2:9981".to_string(),
        ];
        config
    }

    #[tokio::test]
    async fn test_bootstrap_skips_failures() {
        let node = Node::init(config());
        assert_eq!(node.state(), NodeState::Booting);

        tokio::time::timeout(Duration::from_secs(5), node.bootstrap())
            .await
            .unwrap();
        // the duplicate is rejected and the rest still connect
        assert_eq!(
            node.syncer.peers().await,
            vec!["10.0.0.1:9981".to_string(), "10.0.0.2:9981".to_string()]
        );
    }

    #[tokio::test]
    async fn test_start_stops_on_shutdown() {
        let node = Node::init(config());
        let result = tokio::time::timeout(Duration::from_secs(5), node.start(async {})).await;
        assert!(result.unwrap().is_ok());
        assert_eq!(node.state(), NodeState::Stopped);
    }
}
