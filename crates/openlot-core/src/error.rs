//! # Error Types
//!
//! Domain-specific error types for openlot-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  openlot-core errors (this file)                                       │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  openlot-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  openlot-checkout errors (separate crate)                              │
//! │  └── CheckoutError    - The attempt_purchase result taxonomy           │
//! │                                                                         │
//! │  Web API errors (in app)                                               │
//! │  └── ApiError         - What clients see (serialized)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (listing id, field, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Listing cannot be found.
    #[error("Listing not found: {0}")]
    ListingNotFound(String),

    /// Listing is no longer for sale.
    ///
    /// ## When This Occurs
    /// - Adding a SOLD listing to a cart
    /// - Editing a listing after it was sold
    #[error("Listing {0} is no longer for sale")]
    ListingNotActive(String),

    /// Cart has exceeded maximum allowed items.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Monetary amount is invalid.
    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },

    /// Field value has an invalid format.
    #[error("{field} is invalid: {reason}")]
    InvalidFormat {
        field: &'static str,
        reason: &'static str,
    },
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;
