//! Element search
//!
//! Siacoin outputs, siafund outputs and file contracts share one identifier
//! space, so an [`ElementId`] says nothing about what it names. [`resolve`]
//! asks the index for each kind in a fixed priority order and reports the
//! first hit.

use crate::backend::Explorer;
use crate::types::{ElementId, FileContractElement, SiacoinElement, SiafundElement};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What an element id turned out to be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "element", rename_all = "lowercase")]
pub enum SearchResult {
    Siacoin(SiacoinElement),
    Siafund(SiafundElement),
    Contract(FileContractElement),
    None,
}

/// Resolve `id` against siacoin, siafund, then file-contract lookups.
///
/// Lookup failures of individual kinds are expected and never surface; an
/// id no kind recognises yields [`SearchResult::None`].
pub async fn resolve(explorer: &dyn Explorer, id: &ElementId) -> SearchResult {
    match explorer.siacoin_element(id).await {
        Ok(elem) => return SearchResult::Siacoin(elem),
        Err(e) => debug!(%id, error = %e, "not a siacoin element"),
    }
    match explorer.siafund_element(id).await {
        Ok(elem) => return SearchResult::Siafund(elem),
        Err(e) => debug!(%id, error = %e, "not a siafund element"),
    }
    match explorer.file_contract_element(id).await {
        Ok(elem) => return SearchResult::Contract(elem),
        Err(e) => debug!(%id, error = %e, "not a file contract"),
    }
    SearchResult::None
}
