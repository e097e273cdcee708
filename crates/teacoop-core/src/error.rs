//! # Error Types
//!
//! Domain-specific error types for teacoop-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  teacoop-core errors (this file)                                       │
//! │  ├── CoreError        - Lifecycle rule violations                      │
//! │  └── ValidationError  - Bad input or unresolved references             │
//! │                                                                         │
//! │  teacoop-db errors (separate crate)                                    │
//! │  └── DbError          - Persistence failures                           │
//! │                                                                         │
//! │  teacoop-cli errors (app)                                              │
//! │  └── ApiError         - What the user sees (serialized)                │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → notification           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::types::DeliveryStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised by the rule engine.
///
/// Every variant aborts the mutation; the caller's collections are untouched.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The delivery has already moved past processing.
    ///
    /// ## When This Occurs
    /// - Processing a delivery that is already `processed` or `sold`
    /// - Processing the same delivery twice
    #[error("Delivery {delivery_id} is {status}, only pending or processing deliveries can be processed")]
    DeliveryNotProcessable {
        delivery_id: String,
        status: DeliveryStatus,
    },

    /// The source delivery weighs nothing, so no loss percentage exists.
    #[error("Delivery {delivery_id} has zero raw weight and cannot be processed")]
    ZeroInputWeight { delivery_id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns the wrapped validation error, if any.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            CoreError::Validation(err) => Some(err),
            _ => None,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when a form payload breaks a field rule or names a record
/// that does not exist.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A referenced record does not resolve.
    ///
    /// ## User Workflow
    /// ```text
    /// Record Delivery (farmer: F009)
    ///      │
    ///      ▼
    /// farmers.find(F009) → none
    ///      │
    ///      ▼
    /// UnknownReference { entity: "farmer", id: "F009" }
    ///      │
    ///      ▼
    /// UI shows: "farmer not found: F009"
    /// ```
    #[error("{entity} not found: {id}")]
    UnknownReference { entity: &'static str, id: String },

    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or more.
    #[error("{field} cannot be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., malformed number, bad email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// Creates an UnknownReference error.
    pub fn unknown(entity: &'static str, id: impl Into<String>) -> Self {
        ValidationError::UnknownReference {
            entity,
            id: id.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
