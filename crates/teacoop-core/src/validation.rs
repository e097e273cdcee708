//! # Validation Module
//!
//! Field rules for the five entry forms.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Command (teacoop-cli)                                        │
//! │  ├── Type validation (deserialization, kg / amount parsing)            │
//! │  └── Calls the engine                                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Engine input check                                           │
//! │  └── THIS MODULE: field rules (required, ranges, signs)                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Engine reference check                                       │
//! │  └── farmer / batch / buyer ids resolve                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use teacoop_core::validation::{validate_name, validate_percentage};
//!
//! assert!(validate_name("name", "James Mwangi").is_ok());
//! assert!(validate_name("name", "   ").is_err());
//! assert!(validate_percentage("moisture", 101).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::weight::Weight;
use crate::{MAX_NAME_LENGTH, MAX_NOTES_LENGTH, MAX_SEARCH_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required display name (farmer name, company, contact, packaging).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most [`MAX_NAME_LENGTH`] characters
pub fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates an optional free-text field (phone, location, address).
///
/// Empty is fine; only the length is bounded.
pub fn validate_optional_text(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(())
}

/// Validates delivery notes.
pub fn validate_notes(notes: Option<&str>) -> ValidationResult<()> {
    match notes {
        Some(text) if text.chars().count() > MAX_NOTES_LENGTH => Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: MAX_NOTES_LENGTH,
        }),
        _ => Ok(()),
    }
}

/// Validates a buyer email.
///
/// Empty is accepted (the buyer form does not require it); otherwise a single
/// `@` with text on both sides and a dot in the domain.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    if email.is_empty() {
        return Ok(());
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "expected an address like name@example.com".to_string(),
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (matches everything)
/// - Maximum [`MAX_SEARCH_LENGTH`] characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_SEARCH_LENGTH {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_SEARCH_LENGTH,
        });
    }

    Ok(query.to_string())
}

/// Trims a required name and returns the owned value.
pub(crate) fn clean_name(field: &str, value: &str) -> ValidationResult<String> {
    validate_name(field, value)?;
    Ok(value.trim().to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a 0-100 percentage (moisture, quality score).
pub fn validate_percentage(field: &str, value: i64) -> ValidationResult<()> {
    if !(0..=100).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 100,
        });
    }
    Ok(())
}

/// Validates a delivered raw weight.
///
/// ## Rules
/// - Must be > 0: a zero raw weight would make the lot loss undefined
pub fn validate_raw_weight(weight: Weight) -> ValidationResult<()> {
    if !weight.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "raw weight".to_string(),
        });
    }
    Ok(())
}

/// Validates a weight that may be zero (lot output, sale quantity).
pub fn validate_weight(field: &str, weight: Weight) -> ValidationResult<()> {
    if weight.grams() < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a price per kilogram.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (donated leaf, free samples)
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "price per kg".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
