//! HTTP client for the explorerd API.
//!
//! One method per route. Every request carries Basic credentials with an
//! empty username.

use std::time::Duration;

use reqwest::{Client as HttpClient, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::admission::BroadcastRequest;
use crate::batch::{TransactionsRequest, WalletBalance};
use crate::chain::{ChainIndex, ChainStats, ConsensusState, TIP};
use crate::search::SearchResult;
use crate::types::{
    Address, ElementId, FileContractElement, SiacoinElement, SiafundElement, Transaction,
    TransactionId,
};

/// Errors that can occur when talking to the API.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl ClientError {
    /// HTTP status of an API-level failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Peer {
    net_address: String,
}

pub struct Client {
    http: HttpClient,
    base_url: String,
    password: String,
}

impl Client {
    /// `base_url` is the scheme and authority, e.g. `http://127.0.0.1:9980`.
    pub fn new(base_url: impl Into<String>, password: impl Into<String>) -> Result<Self, ClientError> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            password: password.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, ClientError> {
        let resp = req
            .basic_auth("", Some(&self.password))
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ClientError::Connection(format!("cannot connect to {}", self.base_url))
                } else {
                    ClientError::Http(e)
                }
            })?;

        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let message = match resp.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
        };
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ClientError> {
        let resp = self.send(self.http.get(self.url(path))).await?;
        Ok(resp.json().await?)
    }

    async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ClientError> {
        let resp = self.send(self.http.post(self.url(path)).json(body)).await?;
        Ok(resp.json().await?)
    }

    async fn post_empty<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), ClientError> {
        self.send(self.http.post(self.url(path)).json(body)).await?;
        Ok(())
    }

    pub async fn txpool_transactions(&self) -> Result<Vec<Transaction>, ClientError> {
        self.get("/txpool/transactions").await
    }

    pub async fn txpool_broadcast(
        &self,
        transaction: Transaction,
        depends_on: Vec<Transaction>,
    ) -> Result<(), ClientError> {
        let req = BroadcastRequest {
            depends_on,
            transaction,
        };
        self.post_empty("/txpool/broadcast", &req).await
    }

    pub async fn syncer_peers(&self) -> Result<Vec<String>, ClientError> {
        let peers: Vec<Peer> = self.get("/syncer/peers").await?;
        Ok(peers.into_iter().map(|p| p.net_address).collect())
    }

    pub async fn syncer_connect(&self, addr: &str) -> Result<(), ClientError> {
        self.post_empty("/syncer/connect", addr).await
    }

    pub async fn search(&self, id: &ElementId) -> Result<SearchResult, ClientError> {
        self.get(&format!("/explorer/element/search/{}", id)).await
    }

    pub async fn siacoin_element(&self, id: &ElementId) -> Result<SiacoinElement, ClientError> {
        self.get(&format!("/explorer/element/siacoin/{}", id)).await
    }

    pub async fn siafund_element(&self, id: &ElementId) -> Result<SiafundElement, ClientError> {
        self.get(&format!("/explorer/element/siafund/{}", id)).await
    }

    pub async fn file_contract_element(
        &self,
        id: &ElementId,
    ) -> Result<FileContractElement, ClientError> {
        self.get(&format!("/explorer/element/contract/{}", id)).await
    }

    pub async fn chain_stats(&self, index: &ChainIndex) -> Result<ChainStats, ClientError> {
        self.get(&format!("/explorer/chain/{}", index)).await
    }

    pub async fn chain_stats_latest(&self) -> Result<ChainStats, ClientError> {
        self.get(&format!("/explorer/chain/{}", TIP)).await
    }

    pub async fn chain_state(&self, index: &ChainIndex) -> Result<ConsensusState, ClientError> {
        self.get(&format!("/explorer/chain/{}/state", index)).await
    }

    pub async fn tip_state(&self) -> Result<ConsensusState, ClientError> {
        self.get(&format!("/explorer/chain/{}/state", TIP)).await
    }

    pub async fn transaction(&self, id: &TransactionId) -> Result<Transaction, ClientError> {
        self.get(&format!("/explorer/transaction/{}", id)).await
    }

    pub async fn address_balance(&self, address: &Address) -> Result<WalletBalance, ClientError> {
        self.get(&format!("/explorer/address/{}/balance", address)).await
    }

    /// Ids of the unspent siacoin elements owned by `address`.
    pub async fn address_siacoins(&self, address: &Address) -> Result<Vec<ElementId>, ClientError> {
        self.get(&format!("/explorer/address/{}/siacoins", address)).await
    }

    /// Ids of the unspent siafund elements owned by `address`.
    pub async fn address_siafunds(&self, address: &Address) -> Result<Vec<ElementId>, ClientError> {
        self.get(&format!("/explorer/address/{}/siafunds", address)).await
    }

    pub async fn address_transactions(
        &self,
        address: &Address,
        amount: usize,
        offset: usize,
    ) -> Result<Vec<TransactionId>, ClientError> {
        self.get(&format!(
            "/explorer/address/{}/transactions?amount={}&offset={}",
            address, amount, offset
        ))
        .await
    }

    pub async fn batch_balance(
        &self,
        addresses: &[Address],
    ) -> Result<Vec<WalletBalance>, ClientError> {
        self.post("/explorer/batch/addresses/balance", addresses).await
    }

    pub async fn batch_siacoins(
        &self,
        addresses: &[Address],
    ) -> Result<Vec<Vec<SiacoinElement>>, ClientError> {
        self.post("/explorer/batch/addresses/siacoins", addresses).await
    }

    pub async fn batch_siafunds(
        &self,
        addresses: &[Address],
    ) -> Result<Vec<Vec<SiafundElement>>, ClientError> {
        self.post("/explorer/batch/addresses/siafunds", addresses).await
    }

    pub async fn batch_transactions(
        &self,
        requests: &[TransactionsRequest],
    ) -> Result<Vec<Vec<Transaction>>, ClientError> {
        self.post("/explorer/batch/addresses/transactions", requests).await
    }
}
