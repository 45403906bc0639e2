use axum::extract::{Query, State};
use axum::Json;
use followup_core::Listing;

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct ListParams {
    pub owner: Option<String>,
}

/// GET /api/commitments?owner=<optional>
pub async fn list_commitments(
    State(app): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Listing>, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        let engine = app
            .engine
            .lock()
            .map_err(|_| anyhow::anyhow!("engine lock poisoned"))?;
        Ok::<_, anyhow::Error>(engine.list(params.owner.as_deref())?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
