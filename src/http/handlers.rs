//! HTTP handlers for the voting API and service health checks

use crate::http::auth::CurrentUser;
use crate::http::error::ApiResult;
use crate::service::{AppState, HealthCheck, HealthStatus};
use crate::top10::Top10CategoryView;
use crate::types::{
    CategoryId, Duel, Entity, EntityId, NewProfile, ProfileView, RankingPage, Top10CategoryId,
    Top10Submission, Top10SubmissionRequest, UserId, UserProfile, VoteHistoryEntry, VoteOutcome,
    VoteRequest,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error};

type AppStateRef = State<Arc<AppState>>;

#[derive(Debug, Deserialize)]
pub struct DuelQuery {
    pub rank_limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ManualDuelQuery {
    pub id1: EntityId,
    pub id2: EntityId,
}

#[derive(Debug, Deserialize)]
pub struct VoteBody {
    pub winner_id: EntityId,
    pub loser_id: EntityId,
    #[serde(default)]
    pub ip: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RankingQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct Top10Query {
    pub sport: Option<CategoryId>,
}

#[derive(Debug, Deserialize)]
pub struct Top10Body {
    pub entity_ids: Vec<EntityId>,
    #[serde(default)]
    pub ip: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VisibilityBody {
    pub votes_visible: bool,
}

pub async fn get_duel(
    State(app): AppStateRef,
    Path(category_id): Path<CategoryId>,
    Query(query): Query<DuelQuery>,
) -> ApiResult<Json<Duel>> {
    Ok(Json(app.voting().get_duel(category_id, query.rank_limit)?))
}

pub async fn get_manual_duel(
    State(app): AppStateRef,
    Query(query): Query<ManualDuelQuery>,
) -> ApiResult<Json<Duel>> {
    Ok(Json(app.voting().get_manual_duel(query.id1, query.id2)?))
}

pub async fn cast_vote(
    State(app): AppStateRef,
    user: CurrentUser,
    Json(body): Json<VoteBody>,
) -> ApiResult<Json<VoteOutcome>> {
    let outcome = app
        .voting()
        .vote(VoteRequest {
            winner_id: body.winner_id,
            loser_id: body.loser_id,
            user_id: user.0,
            ip: body.ip,
        })
        .await?;

    Ok(Json(outcome))
}

pub async fn list_ranking(
    State(app): AppStateRef,
    Path(category_id): Path<CategoryId>,
    Query(query): Query<RankingQuery>,
) -> ApiResult<Json<RankingPage>> {
    Ok(Json(app.voting().list_ranking(category_id, query.limit)?))
}

pub async fn list_top10_categories(
    State(app): AppStateRef,
    Query(query): Query<Top10Query>,
) -> ApiResult<Json<Vec<Top10CategoryView>>> {
    Ok(Json(app.voting().list_top10_categories(query.sport)?))
}

pub async fn list_top10_candidates(
    State(app): AppStateRef,
    Path(id): Path<Top10CategoryId>,
) -> ApiResult<Json<Vec<Entity>>> {
    Ok(Json(app.voting().list_top10_candidates(id)?))
}

pub async fn submit_top10(
    State(app): AppStateRef,
    user: CurrentUser,
    Path(id): Path<Top10CategoryId>,
    Json(body): Json<Top10Body>,
) -> ApiResult<(StatusCode, Json<Top10Submission>)> {
    let submission = app.voting().submit_top10(Top10SubmissionRequest {
        top10_category_id: id,
        entity_ids: body.entity_ids,
        user_id: user.0,
        ip: body.ip,
    })?;

    Ok((StatusCode::CREATED, Json(submission)))
}

pub async fn register_profile(
    State(app): AppStateRef,
    user: CurrentUser,
    Json(body): Json<NewProfile>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    let user_id = user.require()?;
    let profile = app.voting().register_profile(user_id, body)?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn get_own_profile(
    State(app): AppStateRef,
    user: CurrentUser,
) -> ApiResult<Json<ProfileView>> {
    let user_id = user.require()?;
    Ok(Json(app.voting().get_profile(user_id)?))
}

pub async fn set_votes_visible(
    State(app): AppStateRef,
    user: CurrentUser,
    Json(body): Json<VisibilityBody>,
) -> ApiResult<Json<UserProfile>> {
    let user_id = user.require()?;
    Ok(Json(app.voting().set_votes_visible(user_id, body.votes_visible)?))
}

pub async fn vote_history(
    State(app): AppStateRef,
    user: CurrentUser,
    Path(subject): Path<UserId>,
) -> ApiResult<Json<Vec<VoteHistoryEntry>>> {
    Ok(Json(app.voting().vote_history(user.0, subject)?))
}

/// Root endpoint handler - shows service information
pub async fn root_handler(State(app): AppStateRef) -> impl IntoResponse {
    Json(json!({
        "service": app.config().service.name,
        "version": crate::VERSION,
        "endpoints": [
            "/api/categories/{category_id}/duel",
            "/api/duels/manual",
            "/api/votes",
            "/api/categories/{category_id}/ranking",
            "/api/top10",
            "/api/top10/{id}/candidates",
            "/api/top10/{id}/submissions",
            "/api/profiles",
            "/api/profiles/me",
            "/api/users/{user_id}/votes",
            "/health",
            "/ready",
            "/alive",
            "/metrics",
            "/stats"
        ]
    }))
}

/// Lightweight health check endpoint handler
pub async fn health_handler(State(app): AppStateRef) -> impl IntoResponse {
    debug!("Health check requested");

    let (status_code, status) = match HealthCheck::liveness_check(app.clone()).await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "healthy"),
        Ok(HealthStatus::Degraded) => (StatusCode::OK, "degraded"),
        Ok(HealthStatus::Unhealthy) | Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy"),
    };

    (
        status_code,
        Json(json!({
            "status": status,
            "service": app.config().service.name,
            "version": crate::VERSION
        })),
    )
}

/// Readiness check endpoint handler
pub async fn ready_handler(State(app): AppStateRef) -> impl IntoResponse {
    debug!("Readiness check requested");

    match HealthCheck::readiness_check(app).await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "Ready"),
        Ok(HealthStatus::Degraded) => (StatusCode::OK, "Degraded but ready"),
        Ok(HealthStatus::Unhealthy) => (StatusCode::SERVICE_UNAVAILABLE, "Not ready"),
        Err(e) => {
            error!("Readiness check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "Not ready")
        }
    }
}

/// Liveness check endpoint handler
pub async fn alive_handler(State(app): AppStateRef) -> impl IntoResponse {
    debug!("Liveness check requested");

    match HealthCheck::liveness_check(app).await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "Alive"),
        _ => (StatusCode::SERVICE_UNAVAILABLE, "Not alive"),
    }
}

/// Prometheus metrics endpoint handler
pub async fn metrics_handler(State(app): AppStateRef) -> Response {
    debug!("Metrics endpoint requested");

    let metrics = app.metrics();
    metrics.update_uptime(app.uptime());

    let metric_families = metrics.registry().gather();
    let encoder = TextEncoder::new();

    match encoder.encode_to_string(&metric_families) {
        Ok(metrics_output) => {
            debug!("Serving {} metric families", metric_families.len());
            (
                StatusCode::OK,
                [("content-type", encoder.format_type().to_string())],
                metrics_output,
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode metrics").into_response()
        }
    }
}

/// Detailed service statistics endpoint handler
pub async fn stats_handler(State(app): AppStateRef) -> impl IntoResponse {
    debug!("Stats endpoint requested");

    match HealthCheck::check(app.clone()).await {
        Ok(health) => {
            let status_code = if health.status == HealthStatus::Unhealthy {
                StatusCode::SERVICE_UNAVAILABLE
            } else {
                StatusCode::OK
            };

            let stats = json!({
                "service": {
                    "name": health.service,
                    "version": health.version,
                    "status": health.status,
                    "uptime_seconds": health.stats.uptime_seconds
                },
                "catalog": {
                    "entities": health.stats.entities
                },
                "activity": {
                    "votes": health.stats.votes,
                    "top10_submissions": health.stats.top10_submissions
                },
                "components": health.checks,
                "timestamp": chrono::Utc::now()
            });

            (status_code, Json(stats))
        }
        Err(e) => {
            error!("Failed to get stats: {}", e);

            let error_response = json!({
                "service": {
                    "name": app.config().service.name,
                    "version": crate::VERSION,
                    "status": "error"
                },
                "error": "Failed to get service stats",
                "timestamp": chrono::Utc::now()
            });

            (StatusCode::SERVICE_UNAVAILABLE, Json(error_response))
        }
    }
}
