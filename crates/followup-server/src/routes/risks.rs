use axum::extract::State;
use axum::Json;
use followup_core::RiskReport;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/risks
pub async fn list_risks(State(app): State<AppState>) -> Result<Json<RiskReport>, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        let engine = app
            .engine
            .lock()
            .map_err(|_| anyhow::anyhow!("engine lock poisoned"))?;
        Ok::<_, anyhow::Error>(engine.risks()?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
