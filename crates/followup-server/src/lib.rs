pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::{Json, Router};
use followup_core::Engine;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(engine: Engine) -> Router {
    let app_state = state::AppState::new(engine);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(banner))
        .route("/api/ingest", post(routes::ingest::ingest_meeting))
        .route("/api/commitments", get(routes::commitments::list_commitments))
        .route("/api/health-score", get(routes::health::health_score))
        .route("/api/risks", get(routes::risks::list_risks))
        .route("/api/query", post(routes::query::query_memory))
        .route("/api/reconcile", post(routes::reconcile::reconcile))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// GET / liveness probe.
async fn banner() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "followup",
        "status": "running",
    }))
}

/// Start the API server.
pub async fn serve(engine: Engine, port: u16) -> anyhow::Result<()> {
    let app = build_router(engine);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("followup API listening on http://localhost:{port}");

    axum::serve(listener, app).await?;
    Ok(())
}
