//! Read-modify-write protocol for basket item mutations.

mod error;
mod service;

pub use error::SyncError;
pub use service::BasketSyncService;
