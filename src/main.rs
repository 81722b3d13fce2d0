use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sepetsync::commands::{BasketCommand, ConfigCommand, ResolveCommand, WatchCommand};
use sepetsync::config::Config;
use sepetsync::db::{init_db, BasketStore};
use sepetsync::sync::BasketSyncService;

#[derive(Parser)]
#[command(name = "sepetsync")]
#[command(version)]
#[command(about = "Real-time basket synchronization over scannable QR ids", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and mutate baskets
    Basket(BasketCommand),

    /// Follow the live basket table
    Watch(WatchCommand),

    /// Resolve a scanned payload to a basket
    Resolve(ResolveCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sepetsync=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Basket(cmd)) => {
            let pool = init_db(Some(config.database_path.clone())).await?;
            let store = BasketStore::new(pool);
            let service = BasketSyncService::new(store.clone());
            cmd.run(&store, &service).await?;
        }
        Some(Commands::Watch(cmd)) => {
            let pool = init_db(Some(config.database_path.clone())).await?;
            let store = BasketStore::new(pool);
            cmd.run(&store).await?;
        }
        Some(Commands::Resolve(cmd)) => {
            let pool = init_db(Some(config.database_path.clone())).await?;
            let store = BasketStore::new(pool);
            cmd.run(&store).await?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
