use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use vtt_ai::AiError;
use vtt_core::errors::{DatabaseError, Error as CoreError, FieldError};

const UNEXPECTED_ERROR: &str = "An unexpected error occurred";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    Ai(#[from] AiError),
    #[error("Not Found")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
    errors: Vec<FieldError>,
}

fn core_status(err: &CoreError) -> StatusCode {
    match err {
        e if e.is_not_found() => StatusCode::NOT_FOUND,
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::Database(DatabaseError::UniqueViolation(_)) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn ai_status(err: &AiError) -> StatusCode {
    match err {
        AiError::Core(e) => core_status(e),
        e if e.is_client_error() => StatusCode::BAD_REQUEST,
        AiError::ProviderNotConfigured { .. } | AiError::NoDefaultProvider(_) => {
            StatusCode::BAD_REQUEST
        }
        AiError::Provider(_) | AiError::MissingApiKey(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(e) => core_status(e),
            ApiError::Ai(e) => ai_status(e),
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn field_errors(&self) -> Vec<FieldError> {
        match self {
            ApiError::Core(e) => e.field_errors(),
            ApiError::Ai(e) => e.field_errors(),
            other => vec![FieldError::new("", other.to_string())],
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Request failed: {}", self);
            ErrorBody {
                code: status.as_u16(),
                message: UNEXPECTED_ERROR.to_string(),
                errors: Vec::new(),
            }
        } else {
            ErrorBody {
                code: status.as_u16(),
                message: self.to_string(),
                errors: self.field_errors(),
            }
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
