use axum::extract::State;
use axum::Json;
use followup_core::HealthReport;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/health-score
///
/// Re-evaluates every stored commitment, so the score reflects the
/// current state of the whole memory, not just the latest meeting.
pub async fn health_score(State(app): State<AppState>) -> Result<Json<HealthReport>, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        let engine = app
            .engine
            .lock()
            .map_err(|_| anyhow::anyhow!("engine lock poisoned"))?;
        Ok::<_, anyhow::Error>(engine.health()?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
