//! Error types for the PawMart API.
//!
//! ## Status Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CoreError / DbError / AuthError                                        │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  ApiError ──► IntoResponse                                              │
//! │                                                                         │
//! │  Validation            400  { "errors": [ { "field", "message" } ] }    │
//! │  BadRequest            400  { "message" }   conflict, bad transition,   │
//! │                                             insufficient stock          │
//! │  NotFound              404  { "message" }                               │
//! │  Unauthorized          401  { "message" }                               │
//! │  Forbidden             403  { "message" }                               │
//! │  Server                500  { "message": "Server error" }               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::auth::AuthError;
use pawmart_core::{CoreError, ValidationError};
use pawmart_db::DbError;

/// One rejected request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl From<&ValidationError> for FieldError {
    fn from(err: &ValidationError) -> Self {
        FieldError {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

/// API errors, as seen by HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    /// Details are logged where the error is converted, never sent.
    #[error("Server error")]
    Server,
}

impl ApiError {
    pub fn not_found(entity: &str) -> Self {
        ApiError::NotFound(format!("{} not found", entity))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Server => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Validation(errors) => json!({ "errors": errors }),
            other => json!({ "message": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

/// Convenience alias for handler results.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Conversions
// =============================================================================

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(vec![FieldError::from(&err)])
    }
}

impl From<Vec<ValidationError>> for ApiError {
    fn from(errors: Vec<ValidationError>) -> Self {
        ApiError::Validation(errors.iter().map(FieldError::from).collect())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { entity, .. } => ApiError::not_found(&entity),
            CoreError::Forbidden(_) => ApiError::Forbidden(err.to_string()),
            CoreError::Validation(v) => v.into(),
            CoreError::InsufficientStock { ref product, .. } => {
                ApiError::BadRequest(format!("Insufficient stock for {}", product))
            }
            CoreError::Conflict(_) | CoreError::InvalidTransition { .. } => {
                ApiError::BadRequest(err.to_string())
            }
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, .. } => ApiError::not_found(&entity),
            DbError::UniqueViolation { ref field, .. } => {
                ApiError::BadRequest(duplicate_message(field).to_string())
            }
            DbError::Conflict(message) => ApiError::BadRequest(message),
            other => {
                error!(error = %other, "Database error");
                ApiError::Server
            }
        }
    }
}

/// Client-facing message for a unique index hit. `field` is either the
/// name a repository reported or SQLite's index description.
fn duplicate_message(field: &str) -> &'static str {
    if field.contains("email") {
        "User already exists"
    } else if field.contains("owner") {
        "You already have a shop"
    } else if field.contains("employees_user") || field == "user" {
        "User is already employed by a shop"
    } else if field.contains("invoice") {
        "Invoice number already issued, please retry"
    } else {
        "Resource already exists"
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Signing(ref msg) => {
                error!(error = %msg, "Token signing failed");
                ApiError::Server
            }
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_statuses() {
        let cases = [
            (CoreError::not_found("Pet", "x"), StatusCode::NOT_FOUND),
            (CoreError::forbidden("update this pet"), StatusCode::FORBIDDEN),
            (
                CoreError::conflict("Pet is not available for adoption"),
                StatusCode::BAD_REQUEST,
            ),
            (
                CoreError::invalid_transition("adoption", "completed", "cancelled"),
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (core, status) in cases {
            assert_eq!(ApiError::from(core).status(), status);
        }
    }

    #[test]
    fn test_validation_lists_fields() {
        let err = ApiError::from(vec![
            ValidationError::Required {
                field: "name".to_string(),
            },
            ValidationError::TooShort {
                field: "password".to_string(),
                min: 6,
            },
        ]);
        match err {
            ApiError::Validation(fields) => {
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[1].field, "password");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_db_errors_hide_details() {
        let err = ApiError::from(DbError::QueryFailed("syntax error near doc".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Server error");

        let dup = ApiError::from(DbError::duplicate("email", "a@b.co"));
        assert_eq!(dup.to_string(), "User already exists");

        let dup = ApiError::from(DbError::duplicate("index 'shops_owner_unique'", "unknown"));
        assert_eq!(dup.to_string(), "You already have a shop");

        let conflict = ApiError::from(DbError::conflict("Funding limit reached"));
        assert_eq!(conflict.status(), StatusCode::BAD_REQUEST);
        assert_eq!(conflict.to_string(), "Funding limit reached");
    }

    #[test]
    fn test_insufficient_stock_message() {
        let err = ApiError::from(CoreError::InsufficientStock {
            product: "Rope Toy".to_string(),
            available: 1,
            requested: 3,
        });
        assert_eq!(err.to_string(), "Insufficient stock for Rope Toy");
    }
}
