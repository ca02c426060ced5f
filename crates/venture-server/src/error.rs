use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use venture_core::VentureError;

// ---------------------------------------------------------------------------
// AppError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if let Some(e) = self.0.downcast_ref::<VentureError>() {
            match e {
                VentureError::ProjectNotFound(_) => StatusCode::NOT_FOUND,
                VentureError::NoPriorPlan(_) => StatusCode::UNPROCESSABLE_ENTITY,
                VentureError::InvalidPhase(_) | VentureError::InvalidStage(_) => {
                    StatusCode::BAD_REQUEST
                }
                VentureError::QueueClosed => StatusCode::SERVICE_UNAVAILABLE,
                VentureError::Upstream(_) => StatusCode::BAD_GATEWAY,
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

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
