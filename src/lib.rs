//! explorerd - query and admission API for a Sia-style blockchain explorer
//!
//! # Architecture
//!
//! The facade owns no chain data. It routes authenticated HTTP requests to
//! four capability backends and composes three behaviours on top of them.
//!
//! ## Data Model
//! - [`types`] - Identifiers, currency, elements and transactions
//! - [`chain`] - Chain indices, per-block statistics and consensus state
//!
//! ## Capabilities
//! - [`backend`] - Syncer, transaction pool, chain manager and explorer contracts
//! - [`store`] - In-memory explorer index and chain manager
//! - [`mempool`] - In-memory transaction pool
//! - [`sync`] - Peer registry and broadcast queue
//!
//! ## Composed Behaviour
//! - [`search`] - Element search across siacoin, siafund and contract lookups
//! - [`batch`] - Multi-address batch queries
//! - [`admission`] - Dependency-ordered transaction admission
//!
//! ## Surfaces
//! - `api` - Authenticated HTTP routes (feature `api`)
//! - [`client`] - HTTP client for the API
//! - `node` - Node orchestration (feature `api`)
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Data Model
// ============================================================================
pub mod chain;
pub mod types;

// ============================================================================
// Capabilities
// ============================================================================
pub mod backend;
pub mod mempool;
pub mod store;
pub mod sync;

// ============================================================================
// Composed Behaviour
// ============================================================================
pub mod admission;
pub mod batch;
pub mod search;

// ============================================================================
// Surfaces
// ============================================================================
#[cfg(feature = "api")]
pub mod api;
pub mod client;
#[cfg(feature = "api")]
pub mod node;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;

#[cfg(test)]
mod test_support;
