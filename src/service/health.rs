//! Service health reporting
//!
//! Aggregates component checks and catalog counts for the `/health`,
//! `/ready`, `/alive` and `/stats` endpoints.

use crate::service::app::AppState;
use crate::storage::Storage;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

/// Health check status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// Gauge value exported to Prometheus
    pub fn as_gauge(&self) -> u8 {
        match self {
            HealthStatus::Healthy => 2,
            HealthStatus::Degraded => 1,
            HealthStatus::Unhealthy => 0,
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Degraded => write!(f, "degraded"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    /// Overall service status
    pub status: HealthStatus,
    /// Service name
    pub service: String,
    pub version: String,
    /// Current timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Detailed component checks
    pub checks: Vec<ComponentCheck>,
    /// Service statistics
    pub stats: ServiceStats,
}

/// Individual component health check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentCheck {
    /// Component name
    pub name: String,
    /// Component status
    pub status: HealthStatus,
    /// Optional error message if unhealthy
    pub message: Option<String>,
    /// Check duration in milliseconds
    pub duration_ms: u64,
}

/// Service statistics for health reporting
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceStats {
    pub entities: usize,
    pub votes: usize,
    pub top10_submissions: usize,
    pub uptime_seconds: u64,
}

impl HealthCheck {
    /// Check every component and gather catalog and activity counts.
    ///
    /// The overall status is the worst component status.
    pub async fn check(app_state: Arc<AppState>) -> Result<Self> {
        let checks = vec![
            Self::running_check(&app_state).await,
            Self::storage_check(&app_state),
        ];
        let status = checks
            .iter()
            .map(|check| check.status.clone())
            .min_by_key(HealthStatus::as_gauge)
            .unwrap_or(HealthStatus::Healthy);

        let metrics = app_state.metrics();
        metrics.update_health_status(status.as_gauge());
        for check in &checks {
            metrics.update_component_health(&check.name, check.status != HealthStatus::Unhealthy);
        }

        Ok(HealthCheck {
            status,
            service: app_state.config().service.name.clone(),
            version: crate::VERSION.to_string(),
            timestamp: chrono::Utc::now(),
            stats: Self::service_stats(&app_state),
            checks,
        })
    }

    /// Alive while the service is marked running
    pub async fn liveness_check(app_state: Arc<AppState>) -> Result<HealthStatus> {
        Ok(match app_state.is_running().await {
            true => HealthStatus::Healthy,
            false => HealthStatus::Unhealthy,
        })
    }

    /// Ready when running and the store answers
    pub async fn readiness_check(app_state: Arc<AppState>) -> Result<HealthStatus> {
        if !app_state.is_running().await {
            return Ok(HealthStatus::Unhealthy);
        }

        Ok(Self::storage_check(&app_state).status)
    }

    async fn running_check(app_state: &AppState) -> ComponentCheck {
        let started = std::time::Instant::now();
        let running = app_state.is_running().await;

        ComponentCheck {
            name: "service_running".to_string(),
            status: if running {
                HealthStatus::Healthy
            } else {
                HealthStatus::Unhealthy
            },
            message: (!running).then(|| "Voting service is stopped".to_string()),
            duration_ms: started.elapsed().as_millis() as u64,
        }
    }

    /// Storage is healthy when it answers, degraded when it holds no entities
    fn storage_check(app_state: &AppState) -> ComponentCheck {
        let started = std::time::Instant::now();

        let (status, message) = match app_state.storage().entity_count() {
            Ok(0) => (
                HealthStatus::Degraded,
                Some("Catalog is empty, no duels can be served".to_string()),
            ),
            Ok(_) => (HealthStatus::Healthy, None),
            Err(e) => {
                error!("Storage health check failed: {}", e);
                (HealthStatus::Unhealthy, Some(e.to_string()))
            }
        };

        ComponentCheck {
            name: "storage".to_string(),
            status,
            message,
            duration_ms: started.elapsed().as_millis() as u64,
        }
    }

    fn service_stats(app_state: &AppState) -> ServiceStats {
        match storage_counts(app_state.storage().as_ref()) {
            Ok((entities, votes, top10_submissions)) => ServiceStats {
                entities,
                votes,
                top10_submissions,
                uptime_seconds: app_state.uptime().as_secs(),
            },
            Err(e) => {
                debug!("Failed to gather storage stats for health check: {}", e);
                ServiceStats {
                    uptime_seconds: app_state.uptime().as_secs(),
                    ..ServiceStats::default()
                }
            }
        }
    }
}

fn storage_counts(storage: &dyn Storage) -> crate::error::Result<(usize, usize, usize)> {
    Ok((
        storage.entity_count()?,
        storage.vote_count()?,
        storage.submission_count()?,
    ))
}

impl HealthCheck {
    /// Pretty-printed JSON report
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
