//! `did:web` document server.

use anyhow::{Context, Result};
use clap::Parser;
use credibil_didweb::{Config, serve};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // environment must be populated before clap reads it
    dotenv::dotenv().ok();
    let config = Config::parse();

    let subscriber = FmtSubscriber::builder().with_max_level(config.log_level).finish();
    tracing::subscriber::set_global_default(subscriber).context("setting subscriber")?;

    serve(config).await.context("server failed")
}
