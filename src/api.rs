//! HTTP API exposing the community scan to the web client

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::community::{ForkNetworkAggregator, RepoIdentity};
use crate::github::RepositoryHost;

pub struct AppState<H> {
    pub aggregator: ForkNetworkAggregator<H>,
    pub identity: RepoIdentity,
}

pub fn router<H: RepositoryHost + 'static>(state: Arc<AppState<H>>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/community", get(community::<H>))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .into_inner(),
        )
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "community-scan",
        "timestamp": chrono::Utc::now()
    }))
}

async fn community<H: RepositoryHost + 'static>(
    State(state): State<Arc<AppState<H>>>,
) -> (StatusCode, Json<Value>) {
    match state.aggregator.aggregate(&state.identity).await {
        Ok(aggregation) => {
            info!(
                "Serving {} entries ({:?}) for {}",
                aggregation.forks.len(),
                aggregation.source,
                aggregation.source_repo
            );
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "source": aggregation.source,
                    "source_repo": aggregation.source_repo,
                    "count": aggregation.forks.len(),
                    "forks": aggregation.forks,
                })),
            )
        }
        Err(err) => {
            error!("Community scan failed: {}", err);
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({
                    "error": err.to_string(),
                    "rate_limited": err.is_rate_limited(),
                })),
            )
        }
    }
}
