use axum::extract::State;
use axum::Json;
use followup_core::Answer;

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct QueryRequest {
    pub question: String,
}

/// POST /api/query
pub async fn query_memory(
    State(app): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<Answer>, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        let engine = app
            .engine
            .lock()
            .map_err(|_| anyhow::anyhow!("engine lock poisoned"))?;
        Ok::<_, anyhow::Error>(engine.query(&req.question)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
