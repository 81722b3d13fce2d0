use clap::Args;

use crate::db::BasketStore;

/// Follow the live basket table, printing every snapshot as it arrives.
#[derive(Args)]
pub struct WatchCommand {
    /// Exit after the first snapshot
    #[arg(long)]
    pub once: bool,
}

impl WatchCommand {
    pub async fn run(&self, store: &BasketStore) -> Result<(), Box<dyn std::error::Error>> {
        let mut subscription = store.subscribe().await?;

        while let Some(event) = subscription.next().await {
            let table = event?;

            let mut ids: Vec<&String> = table.keys().collect();
            ids.sort();

            println!("-- {} basket(s) --", table.len());
            for id in ids {
                let basket = &table[id];
                println!(
                    "{}  {:<7}  [{}]",
                    basket.id,
                    basket.state.label(),
                    basket.items.join(", ")
                );
            }

            if self.once {
                subscription.cancel();
            }
        }

        Ok(())
    }
}
