use axum::extract::State;
use axum::Json;
use followup_core::IngestOutcome;

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct IngestRequest {
    pub meeting_title: String,
    pub content: String,
}

/// POST /api/ingest
///
/// Extract commitments from a transcript, persist them, and return the
/// batch with its risk flags and health score.
pub async fn ingest_meeting(
    State(app): State<AppState>,
    Json(req): Json<IngestRequest>,
) -> Result<Json<IngestOutcome>, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        let mut engine = app
            .engine
            .lock()
            .map_err(|_| anyhow::anyhow!("engine lock poisoned"))?;
        Ok::<_, anyhow::Error>(engine.ingest_transcript(&req.meeting_title, &req.content)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    tracing::info!(
        meeting_id = %result.meeting_id,
        extracted = result.extracted_count,
        score = result.health_score,
        "ingested meeting"
    );
    Ok(Json(result))
}
