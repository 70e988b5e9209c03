use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};
use crate::client::GenerationError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("No JSON data received")]
    NoJsonData,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Theme and user input are required")]
    MissingThemeOrInput,

    #[error("No poem data to save")]
    EmptyPoem,

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Failed to save poem: {0}")]
    Save(#[source] std::io::Error),

    #[error("File not found")]
    FileNotFound
}

impl AppError {

    pub fn status_code(&self) -> StatusCode {

        match self {
            AppError::NoJsonData
            | AppError::InvalidBody(_)
            | AppError::MissingThemeOrInput
            | AppError::EmptyPoem => StatusCode::BAD_REQUEST,
            AppError::Generation(kind) => match kind {
                GenerationError::InvalidApiKey => StatusCode::UNAUTHORIZED,
                GenerationError::QuotaExceeded | GenerationError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                GenerationError::NotConfigured | GenerationError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR
            },
            AppError::Save(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::FileNotFound => StatusCode::NOT_FOUND
        }

    }

}

impl IntoResponse for AppError {

    fn into_response(self) -> Response {

        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            error!(%status, "{}", message);
        } else {
            warn!(%status, "{}", message);
        }

        (status, Json(json!({ "error": message }))).into_response()

    }

}
