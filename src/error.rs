use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("No data: {0}")]
    NoData(String),

    #[error("Model not trained yet. Call /train first.")]
    ModelNotFound,

    #[error("Model schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl AppError {
    /// Short machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InsufficientData(_) => "insufficient_data",
            AppError::NoData(_) => "no_data",
            AppError::ModelNotFound => "model_not_found",
            AppError::SchemaMismatch(_) => "schema_mismatch",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::UpstreamFailure(_) => "upstream_failure",
            AppError::BadRequest(_) => "bad_request",
            AppError::Internal(_) | AppError::Io(_) | AppError::SerdeJson(_) | AppError::Anyhow(_) => {
                "internal"
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::InsufficientData(_)
            | AppError::NoData(_)
            | AppError::ModelNotFound
            | AppError::SchemaMismatch(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UpstreamFailure(_)
            | AppError::Internal(_)
            | AppError::Io(_)
            | AppError::SerdeJson(_)
            | AppError::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::UpstreamFailure(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = Json(json!({
            "error": self.code(),
            "message": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::ModelNotFound.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::InsufficientData("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::UpstreamFailure("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_codes() {
        assert_eq!(AppError::NoData("x".into()).code(), "no_data");
        assert_eq!(AppError::SchemaMismatch("x".into()).code(), "schema_mismatch");
        assert_eq!(AppError::Internal("x".into()).code(), "internal");
    }

    #[test]
    fn test_model_not_found_message() {
        assert!(AppError::ModelNotFound.to_string().contains("/train"));
    }

    #[test]
    fn test_into_response_status() {
        let response = AppError::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
