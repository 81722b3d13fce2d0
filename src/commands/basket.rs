use clap::{Args, Subcommand, ValueEnum};

use crate::db::BasketStore;
use crate::models::Basket;
use crate::sync::BasketSyncService;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
pub struct BasketCommand {
    #[command(subcommand)]
    pub command: BasketSubcommand,
}

#[derive(Subcommand)]
pub enum BasketSubcommand {
    /// List all baskets
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a basket's state and items
    Show {
        /// Basket id (the QR payload)
        id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Add an item to a basket, creating the basket if needed
    Add {
        /// Basket id (the QR payload)
        id: String,

        /// Item name
        item: String,
    },

    /// Remove the first occurrence of an item from a basket
    Remove {
        /// Basket id (the QR payload)
        id: String,

        /// Item name
        item: String,
    },

    /// Delete a basket record (administrative)
    Delete {
        /// Basket id (the QR payload)
        id: String,
    },

    /// Seed demo baskets when the table is empty
    Seed,
}

impl BasketCommand {
    pub async fn run(
        &self,
        store: &BasketStore,
        service: &BasketSyncService,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            BasketSubcommand::List { format } => {
                let table = store.snapshot().await?;
                let mut baskets: Vec<&Basket> = table.values().collect();
                baskets.sort_by(|a, b| a.id.cmp(&b.id));

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&baskets)?);
                    }
                    OutputFormat::Text => {
                        if baskets.is_empty() {
                            println!("No baskets");
                            return Ok(());
                        }
                        for basket in baskets {
                            println!(
                                "{}  {:<7}  {} item(s)",
                                basket.id,
                                basket.state.label(),
                                basket.items.len()
                            );
                        }
                    }
                }
            }
            BasketSubcommand::Show { id, format } => {
                let Some(basket) = store.get(id).await? else {
                    println!("Basket not found: {}", id);
                    return Ok(());
                };

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&basket)?);
                    }
                    OutputFormat::Text => {
                        println!("{}  ({})", basket.id, basket.state.label());
                        if basket.items.is_empty() {
                            println!("  (empty)");
                        }
                        for (index, item) in basket.items.iter().enumerate() {
                            println!("  {}. {}", index + 1, item);
                        }
                    }
                }
            }
            BasketSubcommand::Add { id, item } => {
                let basket = service.add_item(id, item).await?;
                println!("Added '{}' to {} ({} item(s))", item, id, basket.items.len());
            }
            BasketSubcommand::Remove { id, item } => {
                let basket = service.remove_item(id, item).await?;
                println!(
                    "Removed '{}' from {} ({} item(s))",
                    item,
                    id,
                    basket.items.len()
                );
            }
            BasketSubcommand::Delete { id } => {
                store.delete(id).await?;
                println!("Deleted {}", id);
            }
            BasketSubcommand::Seed => {
                if service.initialize_demo_data().await? {
                    println!("Seeded demo baskets");
                } else {
                    println!("Table is not empty, nothing seeded");
                }
            }
        }
        Ok(())
    }
}
