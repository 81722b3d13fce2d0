//! Persistent basket table with live full-table subscriptions.
//!
//! Writes go to SQLite. After every committed write the full table is
//! re-read and broadcast to subscribers, so each emission is a complete
//! replacement snapshot, never a delta. Per-id writes are last-writer-wins;
//! there is no field-level merge.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use sqlx::SqlitePool;
use tokio::sync::broadcast;

use crate::models::{Basket, BasketState};

/// Full basket table, keyed by basket id.
pub type BasketMap = HashMap<String, Basket>;

/// Snapshot channel capacity. A lagged subscriber skips forward to the
/// oldest retained snapshot; full-replacement emissions make the skipped
/// intermediates harmless.
const CHANNEL_CAPACITY: usize = 16;

/// Errors that can occur during store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Backend I/O failure (read, write, or snapshot publish).
    Unavailable(String),
    /// The subscription channel terminated.
    Closed,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable(e) => write!(f, "Store unavailable: {}", e),
            StoreError::Closed => write!(f, "Subscription stream closed"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

/// Events pushed to subscribers.
#[derive(Debug, Clone)]
enum TableEvent {
    /// A fresh full-table snapshot.
    Snapshot(BasketMap),
    /// A snapshot could not be produced; the stream is no longer reliable.
    Lost(String),
}

// Row type for database queries
#[derive(sqlx::FromRow)]
struct BasketRow {
    id: String,
    state: String,
    items: String,
    created_at: i64,
    updated_at: i64,
}

impl BasketRow {
    fn into_basket(self) -> Basket {
        Basket {
            id: self.id,
            // Unknown state strings fall back to Empty
            state: BasketState::parse(&self.state).unwrap_or(BasketState::Empty),
            items: serde_json::from_str(&self.items).unwrap_or_default(),
            created_at: millis_to_datetime(self.created_at),
            updated_at: millis_to_datetime(self.updated_at),
        }
    }
}

fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or_else(Utc::now)
}

/// SQLite-backed basket table.
///
/// Cloning is cheap; clones share the connection pool and the subscriber
/// channel, so a write through any clone reaches every subscription.
#[derive(Clone)]
pub struct BasketStore {
    pool: SqlitePool,
    updates: broadcast::Sender<TableEvent>,
}

impl BasketStore {
    pub fn new(pool: SqlitePool) -> Self {
        let (updates, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { pool, updates }
    }

    /// Point lookup by basket id.
    pub async fn get(&self, id: &str) -> Result<Option<Basket>, StoreError> {
        let row: Option<BasketRow> = sqlx::query_as("SELECT * FROM baskets WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(BasketRow::into_basket))
    }

    /// Idempotent upsert keyed by `basket.id`.
    ///
    /// `state`, `items` and `updated_at` are overwritten wholesale;
    /// `created_at` of an existing row is preserved.
    pub async fn put(&self, basket: &Basket) -> Result<(), StoreError> {
        let items = serde_json::to_string(&basket.items).unwrap_or_else(|_| "[]".to_string());

        sqlx::query(
            r#"
            INSERT INTO baskets (id, state, items, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                state = excluded.state,
                items = excluded.items,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&basket.id)
        .bind(basket.state.as_str())
        .bind(&items)
        .bind(basket.created_at.timestamp_millis())
        .bind(basket.updated_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            "put basket {} ({}, {} items)",
            basket.id,
            basket.state,
            basket.items.len()
        );
        self.publish().await;
        Ok(())
    }

    /// Removes the record if present; no-op when absent.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM baskets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        tracing::debug!("deleted basket {}", id);
        self.publish().await;
        Ok(())
    }

    /// Full-table point read.
    pub async fn snapshot(&self) -> Result<BasketMap, StoreError> {
        let rows: Vec<BasketRow> = sqlx::query_as("SELECT * FROM baskets")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let basket = row.into_basket();
                (basket.id.clone(), basket)
            })
            .collect())
    }

    /// Opens a live subscription to the basket table.
    ///
    /// The current table is emitted first, then every post-write snapshot
    /// in the order the writes were observed.
    pub async fn subscribe(&self) -> Result<Subscription, StoreError> {
        // Receiver first, so a write landing during the initial read shows
        // up as a later snapshot instead of being missed.
        let rx = self.updates.subscribe();
        let initial = self.snapshot().await?;

        Ok(Subscription {
            initial: Some(initial),
            rx: Some(rx),
        })
    }

    /// Re-reads the table and pushes it to subscribers. A failed re-read
    /// terminates the streams with an error event rather than dropping the
    /// update silently.
    async fn publish(&self) {
        if self.updates.receiver_count() == 0 {
            return;
        }

        let event = match self.snapshot().await {
            Ok(snapshot) => TableEvent::Snapshot(snapshot),
            Err(e) => {
                tracing::warn!("failed to read basket table for publish: {}", e);
                TableEvent::Lost(e.to_string())
            }
        };

        // Ignore send errors (no subscribers)
        let _ = self.updates.send(event);
    }
}

/// A live, cancellable stream of full-table snapshots.
///
/// Obtained from [`BasketStore::subscribe`]. The stream is long-lived and
/// keeps a channel receiver alive until [`Subscription::cancel`] is called
/// or a terminal error is reported.
pub struct Subscription {
    initial: Option<BasketMap>,
    rx: Option<broadcast::Receiver<TableEvent>>,
}

impl Subscription {
    /// Waits for the next snapshot.
    ///
    /// Returns `None` once cancelled or after a terminal error has been
    /// reported. Stream termination surfaces as a single `StoreError`;
    /// callers treat it as the store being unavailable and may resubscribe.
    pub async fn next(&mut self) -> Option<Result<BasketMap, StoreError>> {
        if let Some(snapshot) = self.initial.take() {
            return Some(Ok(snapshot));
        }

        loop {
            let event = self.rx.as_mut()?.recv().await;
            match event {
                Ok(TableEvent::Snapshot(snapshot)) => return Some(Ok(snapshot)),
                Ok(TableEvent::Lost(reason)) => {
                    self.rx = None;
                    return Some(Err(StoreError::Unavailable(reason)));
                }
                // Skipped snapshots were already replaced by newer ones
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => {
                    self.rx = None;
                    return Some(Err(StoreError::Closed));
                }
            }
        }
    }

    /// Cancels the subscription and releases the channel receiver.
    /// Idempotent; `next` returns `None` from here on.
    pub fn cancel(&mut self) {
        self.initial = None;
        self.rx = None;
    }
}
