//! Metrics collection using Prometheus
//!
//! This module provides metrics collection for the vote4goat service using
//! Prometheus metrics.

use crate::error::VoteError;
use crate::types::Sport;
use anyhow::Result;
use prometheus::{
    Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec,
    Opts, Registry,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the voting service
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Service-level metrics
    service_metrics: ServiceMetrics,

    /// Vote-related metrics
    vote_metrics: VoteMetrics,

    /// Duel and ranking read metrics
    read_metrics: ReadMetrics,

    /// Top-10 submission metrics
    top10_metrics: Top10Metrics,

    /// Performance metrics
    performance_metrics: PerformanceMetrics,
}

/// Service-level metrics
#[derive(Clone)]
pub struct ServiceMetrics {
    /// Service uptime in seconds
    pub uptime_seconds: IntGauge,

    /// Health check status (0=unhealthy, 1=degraded, 2=healthy)
    pub health_status: IntGauge,

    /// Component health status
    pub component_health: IntGaugeVec,

    /// HTTP API requests by route and status class
    pub http_requests_total: IntCounterVec,
}

/// Vote-related metrics
#[derive(Clone)]
pub struct VoteMetrics {
    /// Committed votes by sport
    pub votes_total: IntCounterVec,

    /// Rejected votes by error kind
    pub vote_rejections_total: IntCounterVec,

    /// Commit attempts repeated after a version conflict
    pub vote_retries_total: IntCounter,

    /// Rating points gained by winners
    pub winner_rating_gain: Histogram,
}

/// Duel and ranking read metrics
#[derive(Clone)]
pub struct ReadMetrics {
    /// Duels served by sport
    pub duels_served_total: IntCounterVec,

    /// Size of the pool duels are drawn from
    pub duel_pool_size: Histogram,

    /// Ranking pages served by sport
    pub ranking_reads_total: IntCounterVec,
}

/// Top-10 submission metrics
#[derive(Clone)]
pub struct Top10Metrics {
    /// Submissions by status
    pub submissions_total: IntCounterVec,
}

/// Performance metrics
#[derive(Clone)]
pub struct PerformanceMetrics {
    /// Rating calculation time
    pub rating_calculation_duration: Histogram,

    /// Service operation durations
    pub operation_duration: HistogramVec,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let service_metrics = ServiceMetrics::new(&registry)?;
        let vote_metrics = VoteMetrics::new(&registry)?;
        let read_metrics = ReadMetrics::new(&registry)?;
        let top10_metrics = Top10Metrics::new(&registry)?;
        let performance_metrics = PerformanceMetrics::new(&registry)?;

        Ok(Self {
            registry,
            service_metrics,
            vote_metrics,
            read_metrics,
            top10_metrics,
            performance_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn service(&self) -> &ServiceMetrics {
        &self.service_metrics
    }

    pub fn vote(&self) -> &VoteMetrics {
        &self.vote_metrics
    }

    pub fn read(&self) -> &ReadMetrics {
        &self.read_metrics
    }

    pub fn top10(&self) -> &Top10Metrics {
        &self.top10_metrics
    }

    pub fn performance(&self) -> &PerformanceMetrics {
        &self.performance_metrics
    }

    /// Record a committed vote
    pub fn record_vote_committed(&self, sport: Sport, winner_gain: f64) {
        self.vote_metrics
            .votes_total
            .with_label_values(&[sport_label(sport)])
            .inc();

        self.vote_metrics.winner_rating_gain.observe(winner_gain);
    }

    /// Record a vote that failed
    pub fn record_vote_rejected(&self, error: &VoteError) {
        self.vote_metrics
            .vote_rejections_total
            .with_label_values(&[error.kind()])
            .inc();
    }

    /// Record a commit retried after a version conflict
    pub fn record_vote_retry(&self) {
        self.vote_metrics.vote_retries_total.inc();
    }

    /// Record a duel handed out
    pub fn record_duel_served(&self, sport: Sport, pool_size: usize) {
        self.read_metrics
            .duels_served_total
            .with_label_values(&[sport_label(sport)])
            .inc();

        self.read_metrics.duel_pool_size.observe(pool_size as f64);
    }

    /// Record a ranking page served
    pub fn record_ranking_read(&self, sport: Sport) {
        self.read_metrics
            .ranking_reads_total
            .with_label_values(&[sport_label(sport)])
            .inc();
    }

    /// Record a Top-10 submission attempt
    pub fn record_top10_submission(&self, accepted: bool) {
        let status = if accepted { "accepted" } else { "rejected" };

        self.top10_metrics
            .submissions_total
            .with_label_values(&[status])
            .inc();
    }

    /// Record rating calculation duration
    pub fn record_rating_calculation(&self, duration: Duration) {
        self.performance_metrics
            .rating_calculation_duration
            .observe(duration.as_secs_f64());
    }

    /// Record a service operation duration
    pub fn record_operation(&self, operation: &str, duration: Duration) {
        self.performance_metrics
            .operation_duration
            .with_label_values(&[operation])
            .observe(duration.as_secs_f64());
    }

    /// Record an HTTP API request
    pub fn record_http_request(&self, route: &str, status: u16) {
        let class = match status {
            200..=299 => "2xx",
            400..=499 => "4xx",
            500..=599 => "5xx",
            _ => "other",
        };

        self.service_metrics
            .http_requests_total
            .with_label_values(&[route, class])
            .inc();
    }

    /// Update health status
    pub fn update_health_status(&self, status: u8) {
        self.service_metrics.health_status.set(status as i64);
    }

    /// Update component health
    pub fn update_component_health(&self, component: &str, healthy: bool) {
        let status = if healthy { 1 } else { 0 };
        self.service_metrics
            .component_health
            .with_label_values(&[component])
            .set(status);
    }

    /// Update uptime
    pub fn update_uptime(&self, uptime: Duration) {
        self.service_metrics
            .uptime_seconds
            .set(uptime.as_secs() as i64);
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

fn sport_label(sport: Sport) -> &'static str {
    match sport {
        Sport::Football => "football",
        Sport::Basketball => "basketball",
        Sport::Tennis => "tennis",
        Sport::Other => "other",
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl ServiceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let uptime_seconds =
            IntGauge::new("vote4goat_uptime_seconds", "Service uptime in seconds")?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        let health_status = IntGauge::new(
            "vote4goat_health_status",
            "Health status (0=unhealthy, 1=degraded, 2=healthy)",
        )?;
        registry.register(Box::new(health_status.clone()))?;

        let component_health = IntGaugeVec::new(
            Opts::new("vote4goat_component_health", "Component health status"),
            &["component"],
        )?;
        registry.register(Box::new(component_health.clone()))?;

        let http_requests_total = IntCounterVec::new(
            Opts::new("vote4goat_http_requests_total", "HTTP API requests"),
            &["route", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        Ok(Self {
            uptime_seconds,
            health_status,
            component_health,
            http_requests_total,
        })
    }
}

impl VoteMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let votes_total = IntCounterVec::new(
            Opts::new("vote4goat_votes_total", "Committed votes"),
            &["sport"],
        )?;
        registry.register(Box::new(votes_total.clone()))?;

        let vote_rejections_total = IntCounterVec::new(
            Opts::new("vote4goat_vote_rejections_total", "Rejected votes"),
            &["kind"],
        )?;
        registry.register(Box::new(vote_rejections_total.clone()))?;

        let vote_retries_total = IntCounter::new(
            "vote4goat_vote_retries_total",
            "Vote commits retried after a version conflict",
        )?;
        registry.register(Box::new(vote_retries_total.clone()))?;

        let winner_rating_gain = Histogram::with_opts(
            HistogramOpts::new(
                "vote4goat_winner_rating_gain",
                "Rating points gained by vote winners",
            )
            .buckets(vec![1.0, 4.0, 8.0, 12.0, 16.0, 20.0, 24.0, 28.0, 32.0]),
        )?;
        registry.register(Box::new(winner_rating_gain.clone()))?;

        Ok(Self {
            votes_total,
            vote_rejections_total,
            vote_retries_total,
            winner_rating_gain,
        })
    }
}

impl ReadMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let duels_served_total = IntCounterVec::new(
            Opts::new("vote4goat_duels_served_total", "Duels served"),
            &["sport"],
        )?;
        registry.register(Box::new(duels_served_total.clone()))?;

        let duel_pool_size = Histogram::with_opts(
            HistogramOpts::new("vote4goat_duel_pool_size", "Entities a duel is drawn from")
                .buckets(vec![2.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0]),
        )?;
        registry.register(Box::new(duel_pool_size.clone()))?;

        let ranking_reads_total = IntCounterVec::new(
            Opts::new("vote4goat_ranking_reads_total", "Ranking pages served"),
            &["sport"],
        )?;
        registry.register(Box::new(ranking_reads_total.clone()))?;

        Ok(Self {
            duels_served_total,
            duel_pool_size,
            ranking_reads_total,
        })
    }
}

impl Top10Metrics {
    fn new(registry: &Registry) -> Result<Self> {
        let submissions_total = IntCounterVec::new(
            Opts::new("vote4goat_top10_submissions_total", "Top-10 submissions"),
            &["status"],
        )?;
        registry.register(Box::new(submissions_total.clone()))?;

        Ok(Self { submissions_total })
    }
}

impl PerformanceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let rating_calculation_duration = Histogram::with_opts(
            HistogramOpts::new(
                "vote4goat_rating_calculation_duration_seconds",
                "Rating calculation time",
            )
            .buckets(vec![0.00001, 0.0001, 0.001, 0.005, 0.01]),
        )?;
        registry.register(Box::new(rating_calculation_duration.clone()))?;

        let operation_duration = HistogramVec::new(
            HistogramOpts::new(
                "vote4goat_operation_duration_seconds",
                "Service operation duration",
            )
            .buckets(vec![0.0001, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["operation"],
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        Ok(Self {
            rating_calculation_duration,
            operation_duration,
        })
    }
}
