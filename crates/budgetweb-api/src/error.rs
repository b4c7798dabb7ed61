//! Error types for budgetweb-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use budgetweb_core::error::ErrorCode;
use budgetweb_core::CoreError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Core(e) => match e.code() {
                ErrorCode::TransactionNotFound | ErrorCode::BudgetNotFound => StatusCode::NOT_FOUND,
                ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
                ErrorCode::DuplicateEntry => StatusCode::CONFLICT,
                ErrorCode::StoreError | ErrorCode::ReconciliationFailed => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn code(&self) -> String {
        match self {
            ApiError::NotFound { .. } => "NOT_FOUND".to_string(),
            ApiError::BadRequest { .. } => "BAD_REQUEST".to_string(),
            ApiError::Unauthorized { .. } => "UNAUTHORIZED".to_string(),
            ApiError::Core(e) => e.code().to_string(),
        }
    }
}

/// JSON body returned on error
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    suggestions: Vec<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let suggestions = match &self {
            ApiError::Core(e) => e.to_details().suggestions,
            _ => vec![],
        };
        let body = ErrorBody {
            success: false,
            code: self.code(),
            message: self.to_string(),
            suggestions,
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_map_to_statuses() {
        let not_found = ApiError::from(CoreError::BudgetNotFound { id: "b1".to_string() });
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let invalid = ApiError::from(CoreError::validation("amount must be greater than 0"));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let duplicate = ApiError::from(CoreError::DuplicateEntry {
            entry: "food".to_string(),
        });
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);

        let store = ApiError::from(CoreError::store("down"));
        assert_eq!(store.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_api_error_codes() {
        let missing = ApiError::Unauthorized {
            message: "missing x-user-id header".to_string(),
        };
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(missing.code(), "UNAUTHORIZED");

        let core = ApiError::from(CoreError::TransactionNotFound { id: "t1".to_string() });
        assert_eq!(core.code(), "TRANSACTION_NOT_FOUND");
        assert_eq!(core.to_string(), "Transaction not found: t1");
    }
}
