//! Error types for explorerd

use std::fmt;

/// Errors reported by the backend capabilities (index, pool, syncer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplorerError {
    NotFound(String),
    InvalidTransaction(String),
    InvalidInput(String),
    NetworkError(String),
    StorageError(String),
    Internal(String),
}

impl fmt::Display for ExplorerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExplorerError::NotFound(msg) => write!(f, "not found: {}", msg),
            ExplorerError::InvalidTransaction(msg) => write!(f, "invalid transaction: {}", msg),
            ExplorerError::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
            ExplorerError::NetworkError(msg) => write!(f, "network error: {}", msg),
            ExplorerError::StorageError(msg) => write!(f, "storage error: {}", msg),
            ExplorerError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for ExplorerError {}

impl From<Box<bincode::ErrorKind>> for ExplorerError {
    fn from(err: Box<bincode::ErrorKind>) -> Self {
        ExplorerError::Internal(format!("encoding failed: {}", err))
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ExplorerError>;

/// A backend error annotated with the operation that was being attempted,
/// e.g. `failed to get siacoin balance: not found: ...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub context: &'static str,
    pub source: ExplorerError,
}

impl Failure {
    pub fn new(context: &'static str, source: ExplorerError) -> Self {
        Self { context, source }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.context, self.source)
    }
}

impl std::error::Error for Failure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Attach an operation description to a backend result.
pub trait Context<T> {
    fn context(self, context: &'static str) -> std::result::Result<T, Failure>;
}

impl<T> Context<T> for Result<T> {
    fn context(self, context: &'static str) -> std::result::Result<T, Failure> {
        self.map_err(|source| Failure::new(context, source))
    }
}
