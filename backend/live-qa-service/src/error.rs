use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error, Clone)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("Invalid {0} id")]
    InvalidId(&'static str),

    #[error("Room not found")]
    RoomNotFound,

    #[error("Message not found")]
    MessageNotFound,

    #[error("Answer not found")]
    AnswerNotFound,

    #[error("failed to start server: {0}")]
    StartServer(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("Failed to upgrade socket connection: {0}")]
    HandshakeFailure(String),

    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e.to_string())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    /// Whether the error is the server's fault (details stay in the logs).
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AppError::Config(_) | AppError::StartServer(_) | AppError::Database(_)
        )
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        if self.is_internal() {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            // Missing entities are reported as bad requests, matching the web client's expectations.
            StatusCode::BAD_REQUEST
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = if self.is_internal() {
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        HttpResponse::build(self.status_code()).json(ErrorBody { error })
    }
}
