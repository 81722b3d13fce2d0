use clap::Args;

use crate::db::BasketStore;
use crate::scan::{self, ResolveOutcome};
use crate::session::{SessionState, SessionView};

/// Resolve a scanned QR payload against the live basket table.
///
/// Stands in for the scanner screen: the payload is entered manually
/// instead of being decoded from a camera frame.
#[derive(Args)]
pub struct ResolveCommand {
    /// Decoded symbol payload
    pub payload: String,
}

impl ResolveCommand {
    pub async fn run(&self, store: &BasketStore) -> Result<(), Box<dyn std::error::Error>> {
        let mut subscription = store.subscribe().await?;
        let mut view = SessionView::new();

        if let Some(event) = subscription.next().await {
            match event {
                Ok(snapshot) => view.apply_snapshot(snapshot),
                Err(e) => view.mark_failed(e.to_string()),
            }
        }
        subscription.cancel();

        if let SessionState::Failed(cause) = view.state() {
            return Err(cause.clone().into());
        }

        match scan::resolve(&self.payload, &view) {
            ResolveOutcome::Found(id) => println!("Found basket: {}", id),
            ResolveOutcome::NotFound => {
                println!("No basket for payload '{}'", self.payload)
            }
        }
        Ok(())
    }
}
