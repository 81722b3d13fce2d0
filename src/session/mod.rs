//! Live projection of the basket table for the presentation layer.
//!
//! `SessionView` is the state machine; `SessionFeed` pumps a store
//! subscription through a view and publishes every transition over a
//! watch channel, so observers always see the latest state.

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::db::{BasketMap, BasketStore, StoreError};
use crate::models::Basket;

/// Projection state observed by the presentation layer.
#[derive(Debug, Clone)]
pub enum SessionState {
    /// No snapshot received yet
    Loading,
    /// Latest known table; fully replaced on every emission
    Ready(BasketMap),
    /// The subscription stream terminated; recover by resubscribing
    Failed(String),
}

/// State machine mirroring the store's live subscription.
///
/// `Loading → Ready` on the first snapshot, `Ready → Ready` on every later
/// one; the view never reverts to `Loading` on its own. `Failed` is
/// terminal until [`SessionView::reset`].
#[derive(Debug)]
pub struct SessionView {
    state: SessionState,
}

impl SessionView {
    pub fn new() -> Self {
        Self {
            state: SessionState::Loading,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, SessionState::Ready(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, SessionState::Failed(_))
    }

    /// Applies a snapshot, replacing any previous one. Ignored once the
    /// view has failed; a failed view must be reset first.
    pub fn apply_snapshot(&mut self, snapshot: BasketMap) {
        if self.is_failed() {
            return;
        }
        self.state = SessionState::Ready(snapshot);
    }

    /// Marks the underlying stream as terminated.
    pub fn mark_failed(&mut self, cause: impl Into<String>) {
        self.state = SessionState::Failed(cause.into());
    }

    /// Re-enters `Loading` ahead of a resubscribe.
    pub fn reset(&mut self) {
        self.state = SessionState::Loading;
    }

    /// Latest snapshot, if the view is ready.
    pub fn snapshot(&self) -> Option<&BasketMap> {
        match &self.state {
            SessionState::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Basket> {
        self.snapshot().and_then(|snapshot| snapshot.get(id))
    }

    /// Membership in the current key set. Empty while not ready.
    pub fn contains(&self, id: &str) -> bool {
        self.snapshot().is_some_and(|snapshot| snapshot.contains_key(id))
    }
}

impl Default for SessionView {
    fn default() -> Self {
        Self::new()
    }
}

/// Pumps a store subscription into a watch channel.
///
/// One feed owns one subscription task. The task ends when the stream
/// reports an error (the published state becomes `Failed`) or when the
/// feed is dropped. Resubscribing means starting a new feed, which begins
/// in `Loading` again.
pub struct SessionFeed {
    rx: watch::Receiver<SessionState>,
    task: JoinHandle<()>,
}

impl SessionFeed {
    /// Subscribes to the store and starts the pump task.
    pub async fn start(store: &BasketStore) -> Result<Self, StoreError> {
        let mut subscription = store.subscribe().await?;
        let (tx, rx) = watch::channel(SessionState::Loading);

        let task = tokio::spawn(async move {
            let mut view = SessionView::new();
            while let Some(event) = subscription.next().await {
                match event {
                    Ok(snapshot) => view.apply_snapshot(snapshot),
                    Err(e) => {
                        tracing::warn!("session subscription failed: {}", e);
                        view.mark_failed(e.to_string());
                    }
                }
                if tx.send(view.state().clone()).is_err() {
                    // All observers gone; release the subscription early
                    subscription.cancel();
                    return;
                }
                if view.is_failed() {
                    return;
                }
            }
        });

        Ok(Self { rx, task })
    }

    /// Latest published state.
    pub fn state(&self) -> SessionState {
        self.rx.borrow().clone()
    }

    /// A receiver for observing state transitions.
    pub fn observe(&self) -> watch::Receiver<SessionState> {
        self.rx.clone()
    }

    /// Stops the pump task. The last published state stays observable.
    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for SessionFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}
