//! Metrics and monitoring for the vote4goat service
//!
//! This module provides Prometheus metrics collection for votes, duels,
//! rankings and Top-10 submissions. The metrics are exposed over HTTP by
//! [`crate::http::ApiServer`].

pub mod collector;

pub use collector::{
    MetricsCollector, MetricsTimer, PerformanceMetrics, ReadMetrics, ServiceMetrics,
    Top10Metrics, VoteMetrics,
};
