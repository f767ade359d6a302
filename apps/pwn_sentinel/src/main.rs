use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod routes;

use routes::{router, AppState};

#[derive(Parser)]
#[command(author, version, about = "PWN-Filter breach lookup service")]
pub struct Cli {
    /// Snapshot written by `pwn build`
    #[arg(long)]
    filters: PathBuf,

    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();
    let state = AppState::load(&cli.filters)?;
    let listener = TcpListener::bind(&cli.addr).await?;
    tracing::info!(addr = %cli.addr, "listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
