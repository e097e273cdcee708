//! # API Error Type
//!
//! Unified error type for commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in TeaCoop                                │
//! │                                                                         │
//! │  Command Function ── Result<T, ApiError>                               │
//! │         │                                                               │
//! │         ├── ValidationError::UnknownReference ─► NOT_FOUND             │
//! │         ├── ValidationError (field rules) ─────► VALIDATION_ERROR      │
//! │         ├── CoreError (lifecycle) ─────────────► BUSINESS_LOGIC        │
//! │         ├── DbError ───────────────────────────► DATABASE_ERROR        │
//! │         └── ConfigError ───────────────────────► CONFIG_ERROR          │
//! │                                                                         │
//! │  teacoop binary prints the error as JSON on stderr, exit code 1:       │
//! │  { "code": "NOT_FOUND", "message": "batch not found: IB009" }          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use teacoop_core::{CoreError, ValidationError};
use teacoop_db::DbError;

use crate::config::ConfigError;

/// Error returned from commands.
///
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "raw weight must be positive"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A referenced record does not exist
    NotFound,

    /// Input failed a field rule
    ValidationError,

    /// The records are not in a state that allows the operation
    BusinessLogic,

    /// Store operation failed
    DatabaseError,

    /// Configuration could not be loaded or is invalid
    ConfigError,

    /// Anything else
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::BusinessLogic => "BUSINESS_LOGIC",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// The error as one line of JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":"{}","message":"{}"}}"#, self.code.as_str(), self.message)
        })
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::UnknownReference { .. } => {
                ApiError::new(ErrorCode::NotFound, err.to_string())
            }
            other => ApiError::validation(other.to_string()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => ApiError::from(e),
            lifecycle @ (CoreError::DeliveryNotProcessable { .. }
            | CoreError::ZeroInputWeight { .. }) => {
                ApiError::new(ErrorCode::BusinessLogic, lifecycle.to_string())
            }
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::Serialization { key, message } => {
                tracing::error!(key = %key, "Stored collection unreadable: {}", message);
                ApiError::new(
                    ErrorCode::DatabaseError,
                    format!("Stored collection '{}' is unreadable", key),
                )
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::internal(format!("Could not encode output: {}", err))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for commands.
pub type ApiResult<T> = Result<T, ApiError>;
