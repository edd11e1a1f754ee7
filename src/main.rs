//! FinCanvas demo backend CLI
//!
//! This is the main entry point for the FinCanvas demo dashboard backend.

use anyhow::Result;
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Bind address override (host:port)
    #[arg(short, long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Seed market and portfolio data on startup instead of waiting for
    /// the seed endpoints to be called
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    init_tracing(&args.log_level)?;

    info!("Starting FinCanvas v{}", env!("CARGO_PKG_VERSION"));

    let mut config = fincanvas_api::config::ApiConfig::from_env()?;
    if let Some(bind) = &args.bind {
        config.bind_address = bind.parse()?;
    }

    let server = fincanvas_api::ApiServer::new(config).await?;

    if args.seed {
        let state = server.state();
        let (_, msg) = state.seed.seed_market().await?;
        info!("{}", msg);
        let (_, msg) = state.seed.seed_portfolio().await?;
        info!("{}", msg);
    }

    server.serve().await?;

    info!("FinCanvas shut down cleanly");
    Ok(())
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fincanvas={level},fincanvas_api={level},fincanvas_store={level},tower_http=info")));

    fmt().with_env_filter(filter).with_target(true).init();

    Ok(())
}
