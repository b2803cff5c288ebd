//! Main application configuration
//!
//! This module defines the primary configuration structures for the vote4goat
//! service, including TOML file loading, environment variable loading and
//! validation.

use crate::config::rating::{RatingSettings, VotingSettings};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub rating: RatingSettings,
    pub voting: VotingSettings,
    pub duel: DuelSettings,
    pub ranking: RankingSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Interface the HTTP API binds to
    pub http_host: String,
    /// Port for the HTTP API, health and metrics endpoints
    pub http_port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
    /// JSON file with entities, Top-10 categories, profiles and sessions
    pub seed_path: Option<PathBuf>,
}

/// How duel pairs are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuelStrategy {
    /// Any two distinct entities of the pool
    Uniform,
    /// A random entity and one of its closest-rated neighbours
    Proximity,
}

impl FromStr for DuelStrategy {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "uniform" => Ok(DuelStrategy::Uniform),
            "proximity" => Ok(DuelStrategy::Proximity),
            other => Err(anyhow!("Unknown duel strategy: {}", other)),
        }
    }
}

/// Duel selection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DuelSettings {
    pub strategy: DuelStrategy,
    /// Neighbour count considered by the proximity strategy
    pub proximity_window: usize,
}

/// Ranking table settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingSettings {
    /// Rows returned when the caller gives no limit
    pub default_limit: usize,
    /// Rows added by each "show more" step
    pub page_step: usize,
    /// Largest limit offered by "show more"
    pub show_more_cap: usize,
    /// Hard upper bound, larger limits are clamped
    pub max_limit: usize,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "vote4goat".to_string(),
            log_level: "info".to_string(),
            http_host: "0.0.0.0".to_string(),
            http_port: 8080,
            shutdown_timeout_seconds: 30,
            seed_path: None,
        }
    }
}

impl Default for DuelSettings {
    fn default() -> Self {
        Self {
            strategy: DuelStrategy::Uniform,
            proximity_window: 8,
        }
    }
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            default_limit: 10,
            page_step: 10,
            show_more_cap: 50,
            max_limit: 100,
        }
    }
}

/// Parse an environment variable into `target` when it is set
fn env_override<T: FromStr>(key: &str, target: &mut T) -> Result<()> {
    if let Ok(value) = env::var(key) {
        *target = value
            .parse()
            .map_err(|_| anyhow!("Invalid {} value: {}", key, value))?;
    }
    Ok(())
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }
        if let Ok(host) = env::var("HTTP_HOST") {
            self.service.http_host = host;
        }
        env_override("HTTP_PORT", &mut self.service.http_port)?;
        env_override(
            "SHUTDOWN_TIMEOUT_SECONDS",
            &mut self.service.shutdown_timeout_seconds,
        )?;
        if let Ok(seed) = env::var("SEED_PATH") {
            self.service.seed_path = Some(PathBuf::from(seed));
        }

        // Rating settings
        env_override("RATING_K_FACTOR", &mut self.rating.k_factor)?;
        env_override("RATING_INITIAL", &mut self.rating.initial_rating)?;

        // Voting settings
        env_override(
            "VOTE_MAX_RETRY_ATTEMPTS",
            &mut self.voting.max_retry_attempts,
        )?;
        env_override(
            "VOTE_RETRY_BASE_DELAY_MS",
            &mut self.voting.retry_base_delay_ms,
        )?;
        env_override("VOTE_RETRY_MAX_DELAY_MS", &mut self.voting.retry_max_delay_ms)?;
        env_override(
            "VOTE_TRANSACTION_TIMEOUT_MS",
            &mut self.voting.transaction_timeout_ms,
        )?;

        // Duel settings
        if let Ok(strategy) = env::var("DUEL_STRATEGY") {
            self.duel.strategy = strategy.parse()?;
        }
        env_override("DUEL_PROXIMITY_WINDOW", &mut self.duel.proximity_window)?;

        // Ranking settings
        env_override("RANKING_DEFAULT_LIMIT", &mut self.ranking.default_limit)?;
        env_override("RANKING_PAGE_STEP", &mut self.ranking.page_step)?;
        env_override("RANKING_SHOW_MORE_CAP", &mut self.ranking.show_more_cap)?;
        env_override("RANKING_MAX_LIMIT", &mut self.ranking.max_limit)?;

        Ok(())
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.service.shutdown_timeout_seconds)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.http_port == 0 {
        return Err(anyhow!("HTTP port cannot be 0"));
    }
    if config.service.shutdown_timeout_seconds == 0 {
        return Err(anyhow!("Shutdown timeout must be greater than 0"));
    }

    // Validate rating settings
    if !config.rating.k_factor.is_finite() || config.rating.k_factor <= 0.0 {
        return Err(anyhow!("K-factor must be a positive number"));
    }
    if !config.rating.initial_rating.is_finite() {
        return Err(anyhow!("Initial rating must be a finite number"));
    }

    // Validate voting settings
    if config.voting.max_retry_attempts == 0 {
        return Err(anyhow!("Vote retry attempts must be greater than 0"));
    }
    if config.voting.retry_base_delay_ms > config.voting.retry_max_delay_ms {
        return Err(anyhow!("Vote retry base delay cannot exceed the max delay"));
    }
    if config.voting.transaction_timeout_ms == 0 {
        return Err(anyhow!("Vote transaction timeout must be greater than 0"));
    }

    // Validate duel settings
    if config.duel.proximity_window == 0 {
        return Err(anyhow!("Duel proximity window must be greater than 0"));
    }

    // Validate ranking settings
    let ranking = &config.ranking;
    if ranking.default_limit == 0 || ranking.page_step == 0 {
        return Err(anyhow!("Ranking limit and page step must be greater than 0"));
    }
    if ranking.default_limit > ranking.max_limit || ranking.show_more_cap > ranking.max_limit {
        return Err(anyhow!(
            "Ranking default limit and show-more cap cannot exceed max limit {}",
            ranking.max_limit
        ));
    }

    Ok(())
}
