use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use followup_core::EngineError;

// ---------------------------------------------------------------------------
// AppError - unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if let Some(e) = self.0.downcast_ref::<EngineError>() {
            match e {
                EngineError::NoCommitments
                | EngineError::EmptyTask
                | EngineError::InvalidPriority(_)
                | EngineError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
                EngineError::MeetingNotFound(_) => StatusCode::NOT_FOUND,
                EngineError::Llm(_) => StatusCode::BAD_GATEWAY,
                EngineError::Store(_)
                | EngineError::Index(_)
                | EngineError::Io(_)
                | EngineError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
