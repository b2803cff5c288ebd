//! vote4goat service binary
//!
//! Reads configuration and seed data, serves the HTTP API and shuts down
//! gracefully on SIGINT or SIGTERM.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};
use vote4goat::config::{validate_config, AppConfig};
use vote4goat::http::{ApiServer, ApiServerConfig};
use vote4goat::service::{AppState, HealthCheck, HealthStatus};

/// How often the running service logs a health summary
const HEALTH_LOG_INTERVAL: Duration = Duration::from_secs(30);

/// Head-to-head athlete voting with Elo rankings
#[derive(Parser)]
#[command(
    name = "vote4goat",
    version,
    about = "Head-to-head athlete voting service with Elo rankings",
    long_about = "Serves random duels between athletes of one sport, applies every vote as \
                 an atomic Elo update, publishes per-sport ranking tables and collects \
                 ordered Top-10 lists."
)]
struct Args {
    /// TOML configuration file; environment variables are used when absent
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// JSON seed file with entities, Top-10 lists, profiles and sessions
    #[arg(long, value_name = "FILE")]
    seed: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Shorthand for --log-level debug
    #[arg(short, long)]
    debug: bool,

    /// Port for the HTTP API
    #[arg(long, value_name = "PORT")]
    http_port: Option<u16>,

    /// Load the seed, print one health report and exit with its status
    #[arg(long)]
    health_check: bool,

    /// Validate configuration and exit without serving
    #[arg(long)]
    dry_run: bool,
}

impl Args {
    /// Resolve the configuration source and apply command line overrides
    fn into_config(self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::from_env()?,
        };

        if let Some(level) = self.log_level {
            config.service.log_level = level;
        }
        if self.debug {
            config.service.log_level = "debug".to_string();
        }
        if let Some(port) = self.http_port {
            config.service.http_port = port;
        }
        if let Some(seed) = self.seed {
            config.service.seed_path = Some(seed);
        }

        validate_config(&config).context("Invalid configuration")?;
        Ok(config)
    }
}

/// Install the fmt subscriber; `RUST_LOG` takes precedence over `level`
fn init_logging(level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))
}

fn log_banner(config: &AppConfig) {
    info!("🐐 vote4goat voting service v{}", vote4goat::VERSION);
    info!("   Service: {}", config.service.name);
    info!(
        "   HTTP: {}:{}",
        config.service.http_host, config.service.http_port
    );
    match &config.service.seed_path {
        Some(path) => info!("   Seed: {}", path.display()),
        None => info!("   Seed: none (empty catalog)"),
    }
    info!(
        "   Elo: K={}, baseline={}",
        config.rating.k_factor, config.rating.initial_rating
    );
    info!(
        "   Vote commits: {} attempts, {}ms budget",
        config.voting.max_retry_attempts, config.voting.transaction_timeout_ms
    );
    info!(
        "   Duels: {:?} selection, rankings {} rows by default",
        config.duel.strategy, config.ranking.default_limit
    );
}

/// Run one health check against a freshly loaded service
async fn run_health_check(config: AppConfig) -> Result<HealthStatus> {
    let app_state = Arc::new(AppState::new(config).await?);
    app_state.start().await?;

    let report = HealthCheck::check(app_state.clone()).await;
    app_state.shutdown().await?;
    let report = report?;

    println!("Health: {}", report.status);
    println!("  entities: {}", report.stats.entities);
    println!("  votes: {}", report.stats.votes);
    println!("  top10 submissions: {}", report.stats.top10_submissions);
    for check in &report.checks {
        match &check.message {
            Some(message) => println!("  {}: {} ({})", check.name, check.status, message),
            None => println!("  {}: {}", check.name, check.status),
        }
    }

    Ok(report.status)
}

/// Resolve when SIGINT or SIGTERM arrives
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Cannot listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Cannot install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => info!("SIGINT received"),
        _ = terminate => info!("SIGTERM received"),
    }
}

/// Log a health summary until the service stops
async fn log_health(app_state: Arc<AppState>) {
    let mut interval = tokio::time::interval(HEALTH_LOG_INTERVAL);

    while app_state.is_running().await {
        interval.tick().await;

        match HealthCheck::check(app_state.clone()).await {
            Ok(report) => info!(
                "Health {}: {} entities, {} votes, {} Top-10 submissions, up {}s",
                report.status,
                report.stats.entities,
                report.stats.votes,
                report.stats.top10_submissions,
                report.stats.uptime_seconds
            ),
            Err(e) => warn!("Periodic health check failed: {}", e),
        }
    }
}

/// Serve until a shutdown signal, then stop within the configured timeout
async fn serve(config: AppConfig) -> Result<()> {
    let app_state = Arc::new(
        AppState::new(config.clone())
            .await
            .context("Failed to initialize voting service")?,
    );
    app_state.start().await?;

    let server = Arc::new(ApiServer::new(
        ApiServerConfig::from(&config.service),
        app_state.clone(),
    ));
    let server_task = tokio::spawn({
        let server = server.clone();
        async move {
            if let Err(e) = server.start().await {
                error!("API server failed: {:#}", e);
            }
        }
    });
    let health_task = tokio::spawn(log_health(app_state.clone()));

    info!("✅ vote4goat is serving, Ctrl+C to stop");
    shutdown_signal().await;

    info!("🛑 Stopping vote4goat...");
    health_task.abort();

    let stop = async {
        server.stop().await?;
        if let Err(e) = server_task.await {
            warn!("API server task ended abnormally: {}", e);
        }
        app_state.shutdown().await?;
        Ok::<(), anyhow::Error>(())
    };

    match tokio::time::timeout(config.shutdown_timeout(), stop).await {
        Ok(result) => result?,
        Err(_) => warn!(
            "Shutdown did not finish within {}s, exiting anyway",
            config.service.shutdown_timeout_seconds
        ),
    }

    info!("vote4goat stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let health_check = args.health_check;
    let dry_run = args.dry_run;

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }

    if health_check {
        let healthy = match run_health_check(config).await {
            Ok(status) => status == HealthStatus::Healthy,
            Err(e) => {
                error!("Health check failed: {:#}", e);
                false
            }
        };
        std::process::exit(if healthy { 0 } else { 1 });
    }

    log_banner(&config);

    if dry_run {
        info!("Configuration is valid, dry run finished");
        return Ok(());
    }

    if let Err(e) = serve(config).await {
        error!("vote4goat failed: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
