use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use trackd::api::{self, AppState};
use trackd::config::{CliOverrides, Config};
use trackd::logging::init_logging;
use trackd::storage::SqliteStorage;

/// Minimal issue-tracking REST API (`SQLite` + axum)
#[derive(Parser, Debug)]
#[command(name = "trackd", author, version, about, long_about = None)]
struct Cli {
    /// Database path (defaults to ./trackd.db)
    #[arg(long, env = "TRACKD_DB")]
    db: Option<PathBuf>,

    /// Bind address (defaults to 127.0.0.1:3000)
    #[arg(long, env = "TRACKD_BIND")]
    bind: Option<SocketAddr>,

    /// `SQLite` busy timeout in ms
    #[arg(long)]
    lock_timeout: Option<u64>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.quiet) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let overrides = CliOverrides {
        db: cli.db,
        bind: cli.bind,
        lock_timeout: cli.lock_timeout,
    };
    let config = Config::load(&overrides)?;

    let storage = SqliteStorage::open_with_timeout(&config.db_path, config.lock_timeout_ms)?;
    let app = api::router(AppState::new(storage));

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(
        addr = %config.bind,
        db = %config.db_path.display(),
        "trackd listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}
