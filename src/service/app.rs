//! Main application state and service coordination
//!
//! This module contains the production AppState that owns storage, the
//! voting service, metrics and background tasks.

use crate::accounts::{SessionAuthenticator, StaticSessionAuthenticator};
use crate::config::AppConfig;
use crate::metrics::MetricsCollector;
use crate::service::voting::VotingService;
use crate::storage::{InMemoryStorage, SeedData, Storage};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Seed data error: {message}")]
    Seed { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },

    #[error("Background task error: {message}")]
    BackgroundTask { message: String },
}

/// Main application state containing all service components
pub struct AppState {
    /// Application configuration
    config: AppConfig,

    /// Backing store shared by every component
    storage: Arc<dyn Storage>,

    /// Client operations
    voting: Arc<VotingService>,

    /// Prometheus metrics
    metrics: Arc<MetricsCollector>,

    /// Background task handles
    background_tasks: Mutex<Vec<JoinHandle<()>>>,

    /// Service status
    is_running: Arc<RwLock<bool>>,

    started_at: Instant,
}

impl AppState {
    /// Initialize the application, loading seed data when configured
    pub async fn new(config: AppConfig) -> Result<Self, ServiceError> {
        info!("Initializing {} voting service", config.service.name);

        let seed = match &config.service.seed_path {
            Some(path) => {
                info!("Loading seed data from {}", path.display());
                SeedData::from_file(path).map_err(|e| ServiceError::Seed {
                    message: format!("{:#}", e),
                })?
            }
            None => {
                warn!("No seed file configured, starting with an empty catalog");
                SeedData::default()
            }
        };

        Self::from_seed(config, seed)
    }

    /// Initialize the application from already parsed seed data
    pub fn from_seed(config: AppConfig, seed: SeedData) -> Result<Self, ServiceError> {
        let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
        seed.load_into(storage.as_ref(), config.rating.initial_rating)
            .map_err(|e| ServiceError::Seed {
                message: e.to_string(),
            })?;

        let authenticator = Arc::new(StaticSessionAuthenticator::new(seed.sessions));
        debug!("Session table holds {} tokens", authenticator.len());

        Self::with_components(config, storage, authenticator)
    }

    /// Initialize the application around existing components
    pub fn with_components(
        config: AppConfig,
        storage: Arc<dyn Storage>,
        authenticator: Arc<dyn SessionAuthenticator>,
    ) -> Result<Self, ServiceError> {
        let metrics = Arc::new(MetricsCollector::new().map_err(|e| {
            ServiceError::Initialization {
                message: format!("Failed to create metrics collector: {}", e),
            }
        })?);

        let voting = Arc::new(
            VotingService::new(&config, storage.clone(), authenticator, metrics.clone()).map_err(
                |e| ServiceError::Configuration {
                    message: e.to_string(),
                },
            )?,
        );

        Ok(Self {
            config,
            storage,
            voting,
            metrics,
            background_tasks: Mutex::new(Vec::new()),
            is_running: Arc::new(RwLock::new(false)),
            started_at: Instant::now(),
        })
    }

    /// Mark the service running and start background tasks
    pub async fn start(&self) -> Result<(), ServiceError> {
        info!("Starting {} voting service", self.config.service.name);

        *self.is_running.write().await = true;
        self.start_background_tasks().await;

        info!("✅ {} voting service started successfully", self.config.service.name);
        Ok(())
    }

    /// Perform graceful shutdown
    pub async fn shutdown(&self) -> Result<(), ServiceError> {
        info!("Starting graceful shutdown of {}", self.config.service.name);

        *self.is_running.write().await = false;
        self.stop_background_tasks().await;

        let votes = self
            .storage
            .vote_count()
            .map_err(|e| ServiceError::BackgroundTask {
                message: format!("Failed to get final stats: {}", e),
            })?;
        let submissions = self.storage.submission_count().unwrap_or_default();

        info!(
            "Final service statistics: votes={}, top10_submissions={}",
            votes, submissions
        );
        info!("✅ {} shutdown completed", self.config.service.name);

        Ok(())
    }

    /// Get service configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Check if service is running
    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    pub fn voting(&self) -> Arc<VotingService> {
        self.voting.clone()
    }

    pub fn storage(&self) -> Arc<dyn Storage> {
        self.storage.clone()
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Start background maintenance tasks
    async fn start_background_tasks(&self) {
        info!("Starting health metrics task (15s interval)...");

        let health_metrics_task = {
            let metrics = self.metrics.clone();
            let storage = self.storage.clone();
            let is_running = self.is_running.clone();
            let started_at = self.started_at;

            tokio::spawn(async move {
                let mut interval = tokio::time::interval(Duration::from_secs(15));
                info!("Health metrics task started");

                while *is_running.read().await {
                    interval.tick().await;

                    metrics.update_uptime(started_at.elapsed());

                    let storage_ok = storage.entity_count().is_ok();
                    metrics.update_component_health("storage", storage_ok);
                    metrics.update_component_health("service_running", true);
                    metrics.update_health_status(if storage_ok { 2 } else { 0 });

                    debug!(
                        "Updated service health metrics - uptime: {}s, storage: {}",
                        started_at.elapsed().as_secs(),
                        storage_ok
                    );
                }

                info!("Health metrics task stopped");
            })
        };

        self.background_tasks.lock().await.push(health_metrics_task);
        info!("1 background maintenance task started");
    }

    /// Stop all background tasks
    async fn stop_background_tasks(&self) {
        let mut tasks = self.background_tasks.lock().await;
        let task_count = tasks.len();
        if task_count == 0 {
            info!("No background tasks to stop");
            return;
        }

        info!("Stopping {} background tasks...", task_count);
        for (i, task) in tasks.drain(..).enumerate() {
            debug!("Aborting background task {}/{}", i + 1, task_count);
            task.abort();
        }

        info!("✅ All {} background tasks stopped", task_count);
    }
}
