use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;
use crate::translate::TranslateError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
}

/// Body of a failed translation proxy call, kept in the shape its clients read.
#[derive(Debug, Serialize)]
pub struct TranslationFailure {
    pub error: &'static str,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid token")]
    InvalidToken,

    #[error("{0}")]
    InvalidCredentials(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Too many requests, please try again later")]
    RateLimited,

    #[error("{context}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("Translation failed")]
    Translation(#[source] TranslateError),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn store(context: &'static str) -> impl FnOnce(StoreError) -> AppError {
        move |source| AppError::Store { context, source }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized | AppError::InvalidCredentials(_) => StatusCode::UNAUTHORIZED,
            AppError::InvalidToken => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Translation(TranslateError::RateLimited) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Store { .. } | AppError::Translation(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let AppError::Translation(e) = &self {
            if status.is_server_error() {
                error!("Translation failed: {}", e);
                let body = TranslationFailure {
                    error: "Translation failed",
                };
                return (status, Json(body)).into_response();
            }
        }

        let kind = if status.is_server_error() {
            match &self {
                AppError::Store { context, source } => error!("{}: {}", context, source),
                other => error!("{}", other),
            }
            "error"
        } else {
            "fail"
        };

        let body = ErrorResponse {
            status: kind,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
