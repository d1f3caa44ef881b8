use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sheetview_core::SheetError;
use thiserror::Error;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Sheet(#[from] SheetError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Sheet(SheetError::NotInitialized) => StatusCode::CONFLICT,
            AppError::Sheet(SheetError::Config(_)) => StatusCode::BAD_REQUEST,
            AppError::Sheet(SheetError::Transport(msg)) => {
                tracing::error!("Spreadsheet transport error: {}", msg);
                StatusCode::BAD_GATEWAY
            }
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}
