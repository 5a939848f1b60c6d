//! Multi-address batch queries
//!
//! Each query fans out over its inputs one at a time and returns exactly one
//! result per input, in input order. The first backend error aborts the
//! whole batch: callers get that error and nothing else, even if earlier
//! items had already been resolved.

use crate::backend::Explorer;
use crate::error::{Context, Failure};
use crate::types::{Address, Currency, SiacoinElement, SiafundElement, Transaction};
use serde::{Deserialize, Serialize};

/// Siacoin and siafund holdings of one address, computed at query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletBalance {
    pub siacoins: Currency,
    pub siafunds: u64,
}

/// One page of an address' transaction history. Omitted paging fields are 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsRequest {
    pub address: Address,
    #[serde(default)]
    pub amount: usize,
    #[serde(default)]
    pub offset: usize,
}

pub async fn balance(explorer: &dyn Explorer, address: &Address) -> Result<WalletBalance, Failure> {
    let siacoins = explorer
        .siacoin_balance(address)
        .await
        .context("failed to get siacoin balance")?;
    let siafunds = explorer
        .siafund_balance(address)
        .await
        .context("failed to get siafund balance")?;
    Ok(WalletBalance { siacoins, siafunds })
}

pub async fn balances(
    explorer: &dyn Explorer,
    addresses: &[Address],
) -> Result<Vec<WalletBalance>, Failure> {
    let mut out = Vec::with_capacity(addresses.len());
    for address in addresses {
        out.push(balance(explorer, address).await?);
    }
    Ok(out)
}

pub async fn siacoin_elements(
    explorer: &dyn Explorer,
    addresses: &[Address],
) -> Result<Vec<Vec<SiacoinElement>>, Failure> {
    let mut out = Vec::with_capacity(addresses.len());
    for address in addresses {
        let ids = explorer
            .unspent_siacoin_elements(address)
            .await
            .context("failed to load unspent siacoin elements")?;
        let mut elems = Vec::with_capacity(ids.len());
        for id in &ids {
            elems.push(
                explorer
                    .siacoin_element(id)
                    .await
                    .context("failed to load siacoin elements")?,
            );
        }
        out.push(elems);
    }
    Ok(out)
}

pub async fn siafund_elements(
    explorer: &dyn Explorer,
    addresses: &[Address],
) -> Result<Vec<Vec<SiafundElement>>, Failure> {
    let mut out = Vec::with_capacity(addresses.len());
    for address in addresses {
        let ids = explorer
            .unspent_siafund_elements(address)
            .await
            .context("failed to load unspent siafund elements")?;
        let mut elems = Vec::with_capacity(ids.len());
        for id in &ids {
            elems.push(
                explorer
                    .siafund_element(id)
                    .await
                    .context("failed to load siafund elements")?,
            );
        }
        out.push(elems);
    }
    Ok(out)
}

pub async fn transactions(
    explorer: &dyn Explorer,
    requests: &[TransactionsRequest],
) -> Result<Vec<Vec<Transaction>>, Failure> {
    let mut out = Vec::with_capacity(requests.len());
    for req in requests {
        let ids = explorer
            .transactions(&req.address, req.amount, req.offset)
            .await
            .context("failed to load transactions")?;
        let mut txns = Vec::with_capacity(ids.len());
        for id in &ids {
            txns.push(
                explorer
                    .transaction(id)
                    .await
                    .context("failed to load transaction")?,
            );
        }
        out.push(txns);
    }
    Ok(out)
}
