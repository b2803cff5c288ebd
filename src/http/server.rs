//! HTTP server for the voting API, health checks and Prometheus metrics
//!
//! Built on Axum with graceful shutdown driven by a broadcast channel.

use crate::config::ServiceSettings;
use crate::http::handlers;
use crate::service::AppState;
use anyhow::{Context, Result};
use axum::{
    extract::{MatchedPath, Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host to bind to (typically "0.0.0.0" for all interfaces)
    pub host: String,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl From<&ServiceSettings> for ApiServerConfig {
    fn from(settings: &ServiceSettings) -> Self {
        Self {
            port: settings.http_port,
            host: settings.http_host.clone(),
        }
    }
}

/// Serves the voting API and monitoring endpoints
pub struct ApiServer {
    config: ApiServerConfig,
    app_state: Arc<AppState>,
    shutdown_tx: broadcast::Sender<()>,
}

impl ApiServer {
    pub fn new(config: ApiServerConfig, app_state: Arc<AppState>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            app_state,
            shutdown_tx,
        }
    }

    /// Bind and serve until [`ApiServer::stop`] is called
    pub async fn start(&self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .context("Invalid API server address")?;

        let app = create_router(self.app_state.clone());
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        info!("API server listening on http://{}", addr);

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("API server shutdown signal received");
            })
            .await?;

        info!("API server stopped");
        Ok(())
    }

    /// Signal the server to stop accepting connections
    pub async fn stop(&self) -> Result<()> {
        info!("Stopping API server...");

        if let Err(e) = self.shutdown_tx.send(()) {
            warn!("Failed to send shutdown signal to API server: {}", e);
        }

        Ok(())
    }
}

/// Build the router with every API and monitoring route
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/categories/{category_id}/duel", get(handlers::get_duel))
        .route("/categories/{category_id}/ranking", get(handlers::list_ranking))
        .route("/duels/manual", get(handlers::get_manual_duel))
        .route("/votes", post(handlers::cast_vote))
        .route("/top10", get(handlers::list_top10_categories))
        .route("/top10/{id}/candidates", get(handlers::list_top10_candidates))
        .route("/top10/{id}/submissions", post(handlers::submit_top10))
        .route("/profiles", post(handlers::register_profile))
        .route("/profiles/me", get(handlers::get_own_profile))
        .route("/profiles/me/visibility", put(handlers::set_votes_visible))
        .route("/users/{user_id}/votes", get(handlers::vote_history));

    Router::new()
        .route("/", get(handlers::root_handler))
        .route("/health", get(handlers::health_handler))
        .route("/ready", get(handlers::ready_handler))
        .route("/alive", get(handlers::alive_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/stats", get(handlers::stats_handler))
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            track_requests,
        ))
        .with_state(app_state)
}

/// Count requests by matched route and status class
async fn track_requests(State(app): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    app.metrics()
        .record_http_request(&route, response.status().as_u16());

    response
}
