use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use engagement::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload")]
    MalformedPayload,

    #[error("Unknown meme")]
    UnknownMeme,

    #[error("Caption generation failed: {0}")]
    Captioning(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::MalformedPayload { .. } => StatusCode::BAD_REQUEST,
            AppError::UnknownMeme { .. } => StatusCode::NOT_FOUND,
            AppError::Captioning { .. } => StatusCode::BAD_GATEWAY,
            AppError::Storage { .. } | AppError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, self.to_string()).into_response()
    }
}
