//! Sepetsync Core
//!
//! Real-time basket synchronization: a replicated basket table with live
//! full-table subscriptions, the read-modify-write item protocol, QR
//! payload resolution, and the session projection consumed by
//! presentation layers.

pub mod commands;
pub mod config;
pub mod db;
pub mod models;
pub mod scan;
pub mod session;
pub mod sync;

pub use config::{Config, ConfigError};
pub use db::{init_db, BasketMap, BasketStore, StoreError, Subscription};
pub use models::{Basket, BasketState};
pub use scan::{ImageFrame, ResolveOutcome, ScanResolver, SymbolDecoder};
pub use session::{SessionFeed, SessionState, SessionView};
pub use sync::{BasketSyncService, SyncError};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
