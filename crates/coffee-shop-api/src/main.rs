//! Main entry point for the coffee shop API

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use coffee_shop_api::{config::Config, server::Server, store::SqliteDrinkStore};
use coffee_shop_common::logging::{self, LogFormat};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "coffee-shop-api", about = "Coffee shop drinks API", version, author)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Generate example configuration file
    #[arg(long)]
    gen_config: bool,

    /// Drop all drinks, recreate the schema and seed a sample drink before serving
    #[arg(long)]
    reset_db: bool,

    /// Log output format (compact or json)
    #[arg(long, env = "COFFEE_SHOP_LOG_FORMAT", default_value = "compact")]
    log_format: LogFormat,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_filter = format!("{}=info,tower_http=info", env!("CARGO_CRATE_NAME"));
    logging::init_logging(&args.verbosity, &log_filter, args.log_format)?;

    if args.gen_config {
        let example_config = Config::generate_example()?;
        println!("{example_config}");
        return Ok(());
    }

    info!("Starting coffee shop API v{}", coffee_shop_api::VERSION);

    let config = Config::load(args.config.as_deref())?;
    info!(
        "Configuration loaded, binding to {}",
        config.server.bind_address
    );

    if args.reset_db {
        let store = SqliteDrinkStore::connect(&config.database).await?;
        let seeded = store.reset().await?;
        info!("Database reset, seeded drink {} ({})", seeded.id, seeded.title);
    }

    let server = Server::new(config).await?;

    match server.run().await {
        Ok(()) => {
            info!("Coffee shop API shut down gracefully");
            Ok(())
        }
        Err(e) => {
            error!("Coffee shop API error: {}", e);
            Err(e.into())
        }
    }
}
