use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Path, Query, State},
    Json,
};
use std::str::FromStr;
use std::sync::Arc;

use super::types::{PeerResponse, TransactionsQuery};
use super::{ApiError, Server};
use crate::admission::{self, BroadcastRequest};
use crate::batch::{self, TransactionsRequest, WalletBalance};
use crate::chain::{ChainIndex, ChainStats, ConsensusState, TIP};
use crate::error::{Context, ExplorerError};
use crate::search::{self, SearchResult};
use crate::types::{
    Address, ElementId, FileContractElement, SiacoinElement, SiafundElement, Transaction,
    TransactionId,
};

type ApiResult<T> = Result<Json<T>, ApiError>;

fn parse_param<T>(raw: &str, what: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = ExplorerError>,
{
    raw.parse()
        .map_err(|e| ApiError::InvalidInput(format!("failed to parse {}: {}", what, e)))
}

// ============================================================================
// Transaction pool & syncer
// ============================================================================

pub(super) async fn txpool_transactions(State(server): State<Arc<Server>>) -> Json<Vec<Transaction>> {
    Json(server.pool.transactions().await)
}

pub(super) async fn txpool_broadcast(
    State(server): State<Arc<Server>>,
    body: Result<Json<BroadcastRequest>, JsonRejection>,
) -> Result<(), ApiError> {
    let Json(req) = body?;
    admission::admit(
        server.pool.as_ref(),
        server.syncer.as_ref(),
        req.transaction,
        req.depends_on,
    )
    .await?;
    Ok(())
}

pub(super) async fn syncer_peers(State(server): State<Arc<Server>>) -> Json<Vec<PeerResponse>> {
    let peers = server
        .syncer
        .peers()
        .await
        .into_iter()
        .map(|net_address| PeerResponse { net_address })
        .collect();
    Json(peers)
}

pub(super) async fn syncer_connect(
    State(server): State<Arc<Server>>,
    body: Result<Json<String>, JsonRejection>,
) -> Result<(), ApiError> {
    let Json(addr) = body?;
    server
        .syncer
        .connect(&addr)
        .await
        .context("failed to connect to peer")?;
    Ok(())
}

// ============================================================================
// Elements
// ============================================================================

pub(super) async fn element_search(
    State(server): State<Arc<Server>>,
    Path(id): Path<String>,
) -> ApiResult<SearchResult> {
    let id: ElementId = parse_param(&id, "element id")?;
    Ok(Json(search::resolve(server.explorer.as_ref(), &id).await))
}

pub(super) async fn element_siacoin(
    State(server): State<Arc<Server>>,
    Path(id): Path<String>,
) -> ApiResult<SiacoinElement> {
    let id: ElementId = parse_param(&id, "element id")?;
    let elem = server
        .explorer
        .siacoin_element(&id)
        .await
        .context("failed to load siacoin element")?;
    Ok(Json(elem))
}

pub(super) async fn element_siafund(
    State(server): State<Arc<Server>>,
    Path(id): Path<String>,
) -> ApiResult<SiafundElement> {
    let id: ElementId = parse_param(&id, "element id")?;
    let elem = server
        .explorer
        .siafund_element(&id)
        .await
        .context("failed to load siafund element")?;
    Ok(Json(elem))
}

pub(super) async fn element_contract(
    State(server): State<Arc<Server>>,
    Path(id): Path<String>,
) -> ApiResult<FileContractElement> {
    let id: ElementId = parse_param(&id, "element id")?;
    let elem = server
        .explorer
        .file_contract_element(&id)
        .await
        .context("failed to load file contract element")?;
    Ok(Json(elem))
}

// ============================================================================
// Chain
// ============================================================================

pub(super) async fn chain_stats(
    State(server): State<Arc<Server>>,
    Path(index): Path<String>,
) -> ApiResult<ChainStats> {
    if index == TIP {
        let stats = server
            .explorer
            .chain_stats_latest()
            .await
            .context("failed to load latest chain stats")?;
        return Ok(Json(stats));
    }
    let index: ChainIndex = parse_param(&index, "chain index")?;
    let stats = server
        .explorer
        .chain_stats(&index)
        .await
        .context("failed to load chain stats")?;
    Ok(Json(stats))
}

pub(super) async fn chain_state(
    State(server): State<Arc<Server>>,
    Path(index): Path<String>,
) -> ApiResult<ConsensusState> {
    if index == TIP {
        return Ok(Json(server.chain.tip_state().await));
    }
    let index: ChainIndex = parse_param(&index, "chain index")?;
    let state = server
        .explorer
        .state(&index)
        .await
        .context("failed to load chain state")?;
    Ok(Json(state))
}

pub(super) async fn transaction(
    State(server): State<Arc<Server>>,
    Path(id): Path<String>,
) -> ApiResult<Transaction> {
    let id: TransactionId = parse_param(&id, "transaction id")?;
    let txn = server
        .explorer
        .transaction(&id)
        .await
        .context("failed to load transaction")?;
    Ok(Json(txn))
}

// ============================================================================
// Addresses
// ============================================================================

pub(super) async fn address_balance(
    State(server): State<Arc<Server>>,
    Path(address): Path<String>,
) -> ApiResult<WalletBalance> {
    let address: Address = parse_param(&address, "address")?;
    Ok(Json(batch::balance(server.explorer.as_ref(), &address).await?))
}

pub(super) async fn address_siacoins(
    State(server): State<Arc<Server>>,
    Path(address): Path<String>,
) -> ApiResult<Vec<ElementId>> {
    let address: Address = parse_param(&address, "address")?;
    let ids = server
        .explorer
        .unspent_siacoin_elements(&address)
        .await
        .context("failed to get unspent siacoin elements")?;
    Ok(Json(ids))
}

pub(super) async fn address_siafunds(
    State(server): State<Arc<Server>>,
    Path(address): Path<String>,
) -> ApiResult<Vec<ElementId>> {
    let address: Address = parse_param(&address, "address")?;
    let ids = server
        .explorer
        .unspent_siafund_elements(&address)
        .await
        .context("failed to get unspent siafund elements")?;
    Ok(Json(ids))
}

pub(super) async fn address_transactions(
    State(server): State<Arc<Server>>,
    Path(address): Path<String>,
    query: Result<Query<TransactionsQuery>, QueryRejection>,
) -> ApiResult<Vec<TransactionId>> {
    let address: Address = parse_param(&address, "address")?;
    let Query(page) = query?;
    let ids = server
        .explorer
        .transactions(&address, page.amount, page.offset)
        .await
        .context("failed to get address' transactions")?;
    Ok(Json(ids))
}

// ============================================================================
// Batch queries
// ============================================================================

pub(super) async fn batch_balance(
    State(server): State<Arc<Server>>,
    body: Result<Json<Vec<Address>>, JsonRejection>,
) -> ApiResult<Vec<WalletBalance>> {
    let Json(addresses) = body?;
    Ok(Json(batch::balances(server.explorer.as_ref(), &addresses).await?))
}

pub(super) async fn batch_siacoins(
    State(server): State<Arc<Server>>,
    body: Result<Json<Vec<Address>>, JsonRejection>,
) -> ApiResult<Vec<Vec<SiacoinElement>>> {
    let Json(addresses) = body?;
    Ok(Json(
        batch::siacoin_elements(server.explorer.as_ref(), &addresses).await?,
    ))
}

pub(super) async fn batch_siafunds(
    State(server): State<Arc<Server>>,
    body: Result<Json<Vec<Address>>, JsonRejection>,
) -> ApiResult<Vec<Vec<SiafundElement>>> {
    let Json(addresses) = body?;
    Ok(Json(
        batch::siafund_elements(server.explorer.as_ref(), &addresses).await?,
    ))
}

pub(super) async fn batch_transactions(
    State(server): State<Arc<Server>>,
    body: Result<Json<Vec<TransactionsRequest>>, JsonRejection>,
) -> ApiResult<Vec<Vec<Transaction>>> {
    let Json(requests) = body?;
    Ok(Json(batch::transactions(server.explorer.as_ref(), &requests).await?))
}
