use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::debug;

/// Client errors rejected before the model is touched.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request")]
    BadRequest(#[from] serde_json::Error),

    #[error("unknown action")]
    UnknownAction(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::UnknownAction(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::BadRequest(e) => debug!(error = %e, "rejected action body"),
            ApiError::UnknownAction(kind) => debug!(kind = %kind, "rejected action type"),
        }
        (self.status(), self.to_string()).into_response()
    }
}
