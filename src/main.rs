//! ruHungry CLI
//!
//! Local entry point around the refresh and query boundaries. Routing
//! layers (cron jobs, web frontends) call the same library operations.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use ruhungry::{
    error::Result,
    models::Config,
    pipeline::{self, QueryParams},
    services::EngageClient,
    storage::{RedisBackend, SnapshotStore},
};

/// ruHungry - free-food campus event aggregator
#[derive(Parser, Debug)]
#[command(name = "ruhungry", version, about = "Free-food campus event aggregator")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch, filter, normalize and publish a new snapshot
    Refresh {
        /// Shared refresh secret (bare or "Bearer <secret>")
        #[arg(long)]
        secret: Option<String>,
    },

    /// Query the current snapshot
    Query {
        /// Inclusive lower bound on event end time (ISO 8601)
        #[arg(long)]
        from: Option<String>,

        /// Inclusive upper bound on event start time (ISO 8601)
        #[arg(long)]
        to: Option<String>,

        /// Case-insensitive organization substring
        #[arg(long)]
        org: Option<String>,

        /// Result cap (clamped to 1..=1000)
        #[arg(long)]
        limit: Option<i64>,
    },

    /// Validate the configuration file
    Validate,

    /// Show current snapshot metadata
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Build the snapshot store, degrading to memory-only when Redis is
/// unconfigured or unreachable.
async fn build_store(config: &Config) -> SnapshotStore {
    if config.cache.redis_url.is_none() {
        log::info!("No cache.redis_url configured; using in-process memory only");
        return SnapshotStore::memory_only();
    }

    match RedisBackend::connect(&config.cache).await {
        Ok(backend) => SnapshotStore::new(Box::new(backend)),
        Err(e) => {
            log::warn!("Cache backend unavailable, using in-process memory only: {e}");
            SnapshotStore::memory_only()
        }
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Arc::new(Config::load_or_default(&cli.config));

    match cli.command {
        Command::Refresh { secret } => {
            // Reject bad credentials before touching the cache backend or
            // building the HTTP client.
            pipeline::authorize_refresh(&config.auth.refresh_secret, secret.as_deref())?;

            let store = build_store(&config).await;
            let client = EngageClient::new(Arc::clone(&config))?;

            let snapshot = pipeline::run_refresh(&client, &store, &config).await?;

            log::info!(
                "Snapshot v{}: {} of {} events kept in {} ms at {}",
                snapshot.schema_version,
                snapshot.filtered_count,
                snapshot.source_count,
                snapshot.refresh_duration_ms,
                snapshot.last_refresh_iso
            );
        }

        Command::Query {
            from,
            to,
            org,
            limit,
        } => {
            let store = build_store(&config).await;
            let params = QueryParams {
                from,
                to,
                org,
                limit,
            };

            let result = pipeline::run_query(&store, &params).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("Config OK");
        }

        Command::Info => {
            let store = build_store(&config).await;
            match store.get().await {
                Some(snapshot) => {
                    log::info!("Last refresh: {}", snapshot.last_refresh_iso);
                    log::info!(
                        "Events: {} (from {} raw, {} ms)",
                        snapshot.filtered_count,
                        snapshot.source_count,
                        snapshot.refresh_duration_ms
                    );
                }
                None => log::info!("No snapshot found yet."),
            }
        }
    }

    Ok(())
}
