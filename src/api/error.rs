// ==========================================
// Foundry QC Tracker - API error types
// ==========================================
// Repository errors are converted into request-level errors here.
// The HTTP layer maps each variant to a status and a stable code.
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    // ===== request =====
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("business rule violated: {0}")]
    BusinessRuleViolation(String),

    // ===== data access =====
    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("database connection failed: {0}")]
    DatabaseConnectionError(String),

    #[error("database transaction failed: {0}")]
    DatabaseTransactionError(String),

    // ===== general =====
    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// Stable machine-readable code, also the i18n key suffix (`error.<code>`)
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "invalid_input",
            ApiError::NotFound(_) => "not_found",
            ApiError::PermissionDenied(_) => "permission_denied",
            ApiError::BusinessRuleViolation(_) => "business_rule_violation",
            ApiError::DatabaseError(_)
            | ApiError::DatabaseConnectionError(_)
            | ApiError::DatabaseTransactionError(_) => "database_error",
            ApiError::InternalError(_) | ApiError::Other(_) => "internal_error",
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} (id={})", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("lock poisoned: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("duplicate value: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("unknown or referenced record: {}", msg))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("{}: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_conversion() {
        let api_err: ApiError = RepositoryError::not_found("Pipe", 42).into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("Pipe"));
                assert!(msg.contains("42"));
            }
            other => panic!("expected NotFound, got {:?}", other),
        }

        let api_err: ApiError =
            RepositoryError::UniqueConstraintViolation("pipes.no_code".to_string()).into();
        assert_eq!(api_err.code(), "business_rule_violation");

        let api_err: ApiError = RepositoryError::LockError("poisoned".to_string()).into();
        assert_eq!(api_err.code(), "database_error");
    }
}
