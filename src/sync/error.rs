//! Sync error types.

use crate::db::StoreError;

/// Errors surfaced by basket sync operations.
#[derive(Debug)]
pub enum SyncError {
    /// Item name was empty or whitespace-only; nothing was attempted
    InvalidItemName,
    /// Removal was requested for an unknown basket id; nothing was written
    BasketNotFound(String),
    /// The store failed during the read-modify-write sequence. The write
    /// may or may not have been persisted.
    SyncFailed(StoreError),
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncError::InvalidItemName => write!(f, "Item name must not be empty"),
            SyncError::BasketNotFound(id) => write!(f, "Basket not found: {}", id),
            SyncError::SyncFailed(e) => write!(f, "Sync failed: {}", e),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::SyncFailed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for SyncError {
    fn from(e: StoreError) -> Self {
        SyncError::SyncFailed(e)
    }
}
