use axum::extract::State;
use axum::Json;
use followup_core::recorder::ReconcileReport;

use crate::error::AppError;
use crate::state::AppState;

/// POST /api/reconcile
///
/// Sweep the relational store and the similarity index back into
/// agreement after a partial write.
pub async fn reconcile(State(app): State<AppState>) -> Result<Json<ReconcileReport>, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        let mut engine = app
            .engine
            .lock()
            .map_err(|_| anyhow::anyhow!("engine lock poisoned"))?;
        Ok::<_, anyhow::Error>(engine.reconcile()?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    tracing::info!(
        reindexed = result.reindexed,
        removed = result.removed,
        "reconciled stores"
    );
    Ok(Json(result))
}
