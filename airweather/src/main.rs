mod api;
mod config;
mod scheduler;

use api::AppState;
use clap::{Parser, Subcommand};
use config::Config;
use engine::{SyncScheduler, SyncService};
use gateway::HttpRemoteGateway;
use std::path::PathBuf;
use std::sync::Arc;
use store::{PgRecordStore, RecordStore};

#[derive(Parser)]
#[command(name = "airweather", about = "Airport weather synchronization service")]
struct Cli {
    /// Path to the YAML config file
    #[arg(long, short, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API server
    Serve,
    /// Run bulk syncs on a fixed interval
    Scheduler,
    /// Apply or roll back the database schema
    Migrate {
        /// Drop the schema instead of creating it
        #[arg(long, conflicts_with = "fill")]
        down: bool,
        /// Seed the table with the busiest US airports after creating it
        #[arg(long)]
        fill: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    if let Some(statsd) = &config.statsd {
        install_statsd_exporter(statsd)?;
    }

    match cli.command {
        Command::Serve => serve(config).await,
        Command::Scheduler => run_scheduler(config).await,
        Command::Migrate { down, fill } => migrate(config, down, fill).await,
    }
}

fn install_statsd_exporter(statsd: &config::Statsd) -> Result<(), Box<dyn std::error::Error>> {
    let recorder = metrics_exporter_statsd::StatsdBuilder::from(&statsd.host, statsd.port)
        .build(Some(&statsd.prefix))
        .map_err(|e| format!("failed to build statsd exporter: {e}"))?;
    metrics::set_global_recorder(recorder)
        .map_err(|e| format!("failed to install statsd exporter: {e}"))?;
    tracing::info!(host = %statsd.host, port = statsd.port, "exporting metrics over statsd");
    Ok(())
}

async fn serve(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(PgRecordStore::connect(&config.database.dsn()).await?);
    let scheduler = start_sync_engine(&config, store.clone());

    let state = AppState {
        store: store as Arc<dyn RecordStore>,
        scheduler,
    };
    let addr = format!("{}:{}", config.listener.host, config.listener.port);
    api::serve(&addr, state).await?;
    Ok(())
}

async fn run_scheduler(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(PgRecordStore::connect(&config.database.dsn()).await?);
    let sync = start_sync_engine(&config, store);

    tracing::info!(
        interval_secs = config.sync.scheduler_interval_secs,
        "starting sync scheduler"
    );
    scheduler::run(sync, config.sync.scheduler_interval()).await;
    Ok(())
}

async fn migrate(config: Config, down: bool, fill: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = PgRecordStore::connect(&config.database.dsn()).await?;

    if down {
        store.drop_schema().await?;
        return Ok(());
    }

    store.ensure_schema().await?;
    if fill {
        let inserted = store.seed_top_airports().await?;
        tracing::info!(inserted, "seeded airport records");
    }
    Ok(())
}

fn start_sync_engine(config: &Config, store: Arc<PgRecordStore>) -> SyncScheduler {
    let gateway = Arc::new(HttpRemoteGateway::new(
        config.providers.directory_url.clone(),
        config.providers.weather_url.clone(),
        config.providers.weather_api_key.clone(),
    ));
    SyncScheduler::start(SyncService::new(gateway, store, config.sync.tuning()))
}
