use services::{AppServices, Clock};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod routes;

use config::{Command, Settings, parse_args, prepare_sqlite_file, print_usage};
use routes::{ApiState, build_router};

async fn serve(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    // Open + migrate SQLite at startup so services stay storage-agnostic.
    prepare_sqlite_file(&settings.db_url)?;
    let services = AppServices::new_sqlite(&settings.db_url, Clock::default_clock()).await?;
    let app = build_router(ApiState::from(&services));

    let listener = tokio::net::TcpListener::bind(settings.bind_addr).await?;
    info!(addr = %settings.bind_addr, db = %settings.db_url, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let command = parse_args(std::env::args().skip(1), |key| std::env::var(key).ok())
        .map_err(|e| {
            eprintln!("{e}");
            print_usage();
            e
        })?;

    match command {
        Command::Help => {
            print_usage();
            Ok(())
        }
        Command::Serve(settings) => serve(settings).await,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
