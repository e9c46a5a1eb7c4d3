//! Study abroad API service.
//!
//! Serves two read-only datasets generated offline:
//!
//! ```text
//!                ┌──────────────────────────────────────────────┐
//!   Request ────▶│ request id → trace → timeout → cors → router │
//!                └──────────────┬───────────────────┬───────────┘
//!                               │                   │
//!                     /api/visa │                   │ /api/university
//!                               ▼                   ▼
//!                     ┌──────────────────┐  ┌───────────────────┐
//!                     │   VisaLoader     │  │     Catalog       │
//!                     │ (memoized cache) │  │ filter/sort/page  │
//!                     └────────┬─────────┘  └─────────┬─────────┘
//!                              ▼                      ▼
//!                     assets/visa_data/*.json   data/university_data/
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use study_abroad_api::config::loader::{apply_port_override, load_config};
use study_abroad_api::config::{validate_config, ConfigError, ServiceConfig};
use study_abroad_api::lifecycle::signals::spawn_signal_listener;
use study_abroad_api::observability::{logging, metrics};
use study_abroad_api::visa::DataWatcher;
use study_abroad_api::{ApiServer, Shutdown};

#[derive(Parser)]
#[command(name = "study-abroad-api", version)]
#[command(about = "Visa requirements and university rankings API", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted.
    #[arg(short, long, env = "STUDY_ABROAD_CONFIG")]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
        apply_port_override(&mut config, port);
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability);

    tracing::info!("study-abroad-api v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        visa_dir = %config.data.visa_dir,
        university_dir = %config.data.university_dir,
        aggregation = ?config.data.aggregation,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let watch = config.data.watch;
    let visa_dir = PathBuf::from(&config.data.visa_dir);
    let server = ApiServer::new(config);

    // Dropping the watcher stops it, so hold it for the life of the server.
    let _watcher = if watch {
        match DataWatcher::new(&visa_dir, server.state().visa.cache().clone()).run() {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                tracing::warn!(path = ?visa_dir, error = %e, "Visa data watcher disabled");
                None
            }
        }
    } else {
        None
    };

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
