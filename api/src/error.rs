//! Unified error types for the roster API
//!
//! This module defines error types for each layer:
//! - `DomainError`: value object and aggregate rule violations
//! - `RepositoryError`: persistence failures raised by storage adapters
//! - `AppError`: application layer errors (rendered as HTTP responses)
//!
//! `ErrorCode` is the single table mapping each error kind to its stable
//! client-facing code and HTTP status.

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;

use crate::domain::values::{Email, GroupId, UserId};

/// A single invalid input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All field errors collected while parsing one request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    /// Record the failure of `result`, if any, and hand back the parsed value.
    pub fn check<T>(&mut self, result: Result<T, DomainError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(DomainError::Validation(error)) => {
                self.push(error);
                None
            }
            Err(other) => {
                self.push(FieldError::new("input", other.to_string()));
                None
            }
        }
    }
}

#[cfg(test)]
impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Whether any recorded error concerns `field`
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(error: FieldError) -> Self {
        Self(vec![error])
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

/// Domain layer errors - raised by value objects and aggregates
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(FieldError),

    #[error("user {user_id} is already a member of group {group_id}")]
    AlreadyMember { user_id: UserId, group_id: GroupId },

    #[error("user {user_id} is not a member of group {group_id}")]
    NotMember { user_id: UserId, group_id: GroupId },
}

impl DomainError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        DomainError::Validation(FieldError::new(field, message))
    }
}

/// Persistence errors raised by repository adapters
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("stored {entity} {id} is invalid: {reason}")]
    CorruptRow {
        entity: &'static str,
        id: String,
        reason: String,
    },

    #[error("unique constraint violated during {operation}")]
    UniqueViolation {
        operation: &'static str,
        #[source]
        source: DbErr,
    },

    #[error("database error during {operation}")]
    Database {
        operation: &'static str,
        #[source]
        source: DbErr,
    },

    #[error("database connection unavailable during {operation}")]
    Connection {
        operation: &'static str,
        #[source]
        source: DbErr,
    },
}

impl RepositoryError {
    /// Classify a SeaORM error raised while running `operation`
    pub fn from_db(operation: &'static str, source: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(_)) = source.sql_err() {
            return RepositoryError::UniqueViolation { operation, source };
        }
        match source {
            DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => {
                RepositoryError::Connection { operation, source }
            }
            source => RepositoryError::Database { operation, source },
        }
    }

    /// Connection-class failures may succeed if the caller tries again.
    /// Nothing in this service retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RepositoryError::Connection { .. })
    }
}

/// Stable error codes returned to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ValidationError,
    InvalidJson,
    NotFound,
    UserNotFound,
    GroupNotFound,
    Conflict,
    EmailTaken,
    DuplicateMember,
    NotAMember,
    Unauthorized,
    Forbidden,
    DatabaseError,
    ConnectionError,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::InvalidJson => "INVALID_JSON",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::UserNotFound => "USER_NOT_FOUND",
            ErrorCode::GroupNotFound => "GROUP_NOT_FOUND",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::EmailTaken => "EMAIL_TAKEN",
            ErrorCode::DuplicateMember => "DUPLICATE_MEMBER",
            ErrorCode::NotAMember => "NOT_A_MEMBER",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::ConnectionError => "CONNECTION_ERROR",
        }
    }

    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::ValidationError | ErrorCode::InvalidJson => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound | ErrorCode::UserNotFound | ErrorCode::GroupNotFound => {
                StatusCode::NOT_FOUND
            }
            ErrorCode::Conflict
            | ErrorCode::EmailTaken
            | ErrorCode::DuplicateMember
            | ErrorCode::NotAMember => StatusCode::CONFLICT,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::ConnectionError => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application layer errors - used by services and HTTP handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("{message}")]
    NotFound { code: ErrorCode, message: String },

    #[error("{message}")]
    Conflict { code: ErrorCode, message: String },

    #[error("invalid request body: {0}")]
    InvalidJson(String),

    // No route is authenticated yet; the kinds keep their slots in the code table.
    #[allow(dead_code)]
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[allow(dead_code)]
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AppError {
    pub fn user_not_found(id: &UserId) -> Self {
        AppError::NotFound {
            code: ErrorCode::UserNotFound,
            message: format!("user {} not found", id),
        }
    }

    pub fn group_not_found(id: &GroupId) -> Self {
        AppError::NotFound {
            code: ErrorCode::GroupNotFound,
            message: format!("group {} not found", id),
        }
    }

    pub fn email_taken(email: &Email) -> Self {
        AppError::Conflict {
            code: ErrorCode::EmailTaken,
            message: format!("email {} is already in use", email),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation(_) => ErrorCode::ValidationError,
            AppError::NotFound { code, .. } | AppError::Conflict { code, .. } => *code,
            AppError::InvalidJson(_) => ErrorCode::InvalidJson,
            AppError::Unauthorized(_) => ErrorCode::Unauthorized,
            AppError::Forbidden(_) => ErrorCode::Forbidden,
            AppError::Repository(err) => match err {
                RepositoryError::NotFound { .. } => ErrorCode::NotFound,
                RepositoryError::UniqueViolation { .. } => ErrorCode::Conflict,
                RepositoryError::Connection { .. } => ErrorCode::ConnectionError,
                RepositoryError::CorruptRow { .. } | RepositoryError::Database { .. } => {
                    ErrorCode::DatabaseError
                }
            },
        }
    }

    /// Message safe to show a client. Infrastructure detail stays in the logs.
    pub fn client_message(&self) -> String {
        match self {
            AppError::Validation(_) => "request validation failed".to_string(),
            AppError::Repository(RepositoryError::NotFound { .. }) => self.to_string(),
            AppError::Repository(RepositoryError::UniqueViolation { .. }) => {
                "resource conflicts with existing data".to_string()
            }
            AppError::Repository(RepositoryError::Connection { .. }) => {
                "service temporarily unavailable".to_string()
            }
            AppError::Repository(_) => "internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        let message = err.to_string();
        match err {
            DomainError::Validation(field) => AppError::Validation(field.into()),
            DomainError::AlreadyMember { .. } => AppError::Conflict {
                code: ErrorCode::DuplicateMember,
                message,
            },
            DomainError::NotMember { .. } => AppError::Conflict {
                code: ErrorCode::NotAMember,
                message,
            },
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors)
    }
}

/// Error response body for JSON responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ValidationErrors>,
}

/// Render an error and every `source()` below it on one line
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut chain = err.to_string();
    let mut current = err.source();
    while let Some(cause) = current {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        current = cause.source();
    }
    chain
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();

        if let AppError::Repository(err) = &self {
            tracing::error!(
                code = code.as_str(),
                retryable = err.is_retryable(),
                error = %error_chain(err),
                "Repository failure"
            );
        }

        let message = self.client_message();
        let details = match self {
            AppError::Validation(errors) => Some(errors),
            _ => None,
        };

        let body = Json(ErrorResponse {
            code: code.as_str(),
            message,
            details,
        });

        (code.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_id() -> UserId {
        UserId::parse("u1").unwrap()
    }

    fn group_id() -> GroupId {
        GroupId::parse("g1").unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn error_code_status_table() {
        let expected = [
            (ErrorCode::ValidationError, 400),
            (ErrorCode::InvalidJson, 400),
            (ErrorCode::NotFound, 404),
            (ErrorCode::UserNotFound, 404),
            (ErrorCode::GroupNotFound, 404),
            (ErrorCode::Conflict, 409),
            (ErrorCode::EmailTaken, 409),
            (ErrorCode::DuplicateMember, 409),
            (ErrorCode::NotAMember, 409),
            (ErrorCode::Unauthorized, 401),
            (ErrorCode::Forbidden, 403),
            (ErrorCode::DatabaseError, 500),
            (ErrorCode::ConnectionError, 503),
        ];
        for (code, status) in expected {
            assert_eq!(code.status().as_u16(), status, "{}", code);
        }
    }

    #[test]
    fn error_code_strings_are_screaming_snake() {
        assert_eq!(ErrorCode::NotAMember.as_str(), "NOT_A_MEMBER");
        assert_eq!(ErrorCode::EmailTaken.to_string(), "EMAIL_TAKEN");
    }

    #[test]
    fn membership_errors_map_to_conflict() {
        let dup: AppError = DomainError::AlreadyMember {
            user_id: user_id(),
            group_id: group_id(),
        }
        .into();
        assert_eq!(dup.code(), ErrorCode::DuplicateMember);
        assert!(dup.to_string().contains("already a member"));

        let missing: AppError = DomainError::NotMember {
            user_id: user_id(),
            group_id: group_id(),
        }
        .into();
        assert_eq!(missing.code(), ErrorCode::NotAMember);
    }

    #[test]
    fn domain_validation_maps_to_validation() {
        let err: AppError = DomainError::validation("name", "name is required").into();
        match err {
            AppError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert!(errors.has_field("name"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn check_collects_every_failure() {
        let mut errors = ValidationErrors::new();
        let a: Option<u8> = errors.check(Err(DomainError::validation("email", "bad")));
        let b = errors.check(Ok(7u8));
        let c: Option<u8> = errors.check(Err(DomainError::validation("role", "bad")));

        assert!(a.is_none());
        assert_eq!(b, Some(7));
        assert!(c.is_none());
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.to_string(), "email: bad; role: bad");
    }

    #[test]
    fn repository_errors_classify_by_kind() {
        let conn = RepositoryError::from_db(
            "users.find_by_id",
            DbErr::Conn(sea_orm::RuntimeErr::Internal("refused".into())),
        );
        assert!(conn.is_retryable());
        assert_eq!(AppError::from(conn).code(), ErrorCode::ConnectionError);

        let db = RepositoryError::from_db("users.save", DbErr::Custom("boom".into()));
        assert!(!db.is_retryable());
        assert_eq!(AppError::from(db).code(), ErrorCode::DatabaseError);
    }

    #[test]
    fn error_chain_includes_sources() {
        let err = RepositoryError::from_db("users.save", DbErr::Custom("disk full".into()));
        let chain = error_chain(&err);
        assert!(chain.starts_with("database error during users.save"));
        assert!(chain.contains("disk full"));
    }

    #[tokio::test]
    async fn infrastructure_errors_hide_details_from_clients() {
        let err = AppError::from(RepositoryError::from_db(
            "users.save",
            DbErr::Custom("password=hunter2".into()),
        ));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["code"], "DATABASE_ERROR");
        assert_eq!(body["message"], "internal server error");
        assert!(!body.to_string().contains("hunter2"));
    }

    #[tokio::test]
    async fn validation_response_lists_fields() {
        let mut errors = ValidationErrors::new();
        errors.push(FieldError::new("email", "email format is invalid"));
        errors.push(FieldError::new("role", "role must be one of: admin, user"));

        let response = AppError::Validation(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["details"].as_array().unwrap().len(), 2);
        assert_eq!(body["details"][0]["field"], "email");
    }

    #[tokio::test]
    async fn not_found_response_has_no_details() {
        let response = AppError::user_not_found(&user_id()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["code"], "USER_NOT_FOUND");
        assert_eq!(body["message"], "user u1 not found");
        assert!(body.get("details").is_none());
    }
}
