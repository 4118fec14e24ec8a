//! # Validation Module
//!
//! Input validation utilities for Openlot.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: API handler (deserialization, type shape)                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business rule validation                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (NOT NULL, UNIQUE, CHECK, foreign keys)              │
//! │                                                                         │
//! │  Defense in depth: each layer catches what the one above missed.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{ValidationError, ValidationResult};

/// Earliest model year accepted for a listing.
pub const MIN_LISTING_YEAR: i64 = 1900;

/// Highest odometer reading accepted, in miles.
pub const MAX_MILEAGE: i64 = 2_000_000;

// =============================================================================
// Listing Validators
// =============================================================================

/// Validates a listing title.
///
/// ## Rules
/// - At least 5 characters (after trimming)
/// - At most 255 characters
pub fn validate_title(title: &str) -> ValidationResult<()> {
    let title = title.trim();
    if title.len() < 5 {
        return Err(ValidationError::TooShort {
            field: "title",
            min: 5,
        });
    }
    if title.len() > 255 {
        return Err(ValidationError::TooLong {
            field: "title",
            max: 255,
        });
    }
    Ok(())
}

/// Validates a model year against `[MIN_LISTING_YEAR, current year + 1]`.
///
/// Next year's models show up in dealer inventory before January, so the
/// upper bound is one past the current year.
pub fn validate_year(year: i64, current_year: i64) -> ValidationResult<()> {
    let max = current_year + 1;
    if year < MIN_LISTING_YEAR || year > max {
        return Err(ValidationError::OutOfRange {
            field: "year",
            min: MIN_LISTING_YEAR,
            max,
        });
    }
    Ok(())
}

/// Validates a mileage reading.
pub fn validate_mileage(mileage: i64) -> ValidationResult<()> {
    if !(0..=MAX_MILEAGE).contains(&mileage) {
        return Err(ValidationError::OutOfRange {
            field: "mileage",
            min: 0,
            max: MAX_MILEAGE,
        });
    }
    Ok(())
}

/// Validates a listing location (at least 2 characters).
pub fn validate_location(location: &str) -> ValidationResult<()> {
    if location.trim().len() < 2 {
        return Err(ValidationError::TooShort {
            field: "location",
            min: 2,
        });
    }
    Ok(())
}

/// Validates a listing description (at least 20 characters - buyers need
/// some detail to go on).
pub fn validate_description(description: &str) -> ValidationResult<()> {
    if description.trim().len() < 20 {
        return Err(ValidationError::TooShort {
            field: "description",
            min: 20,
        });
    }
    Ok(())
}

// =============================================================================
// Account Validators
// =============================================================================

/// Validates a display name (at least 2 characters).
pub fn validate_name(name: &str) -> ValidationResult<()> {
    if name.trim().len() < 2 {
        return Err(ValidationError::TooShort {
            field: "name",
            min: 2,
        });
    }
    Ok(())
}

/// Validates an email address.
///
/// Intentionally loose: exactly one `@` with a dot somewhere after it.
/// Real validation happens when mail is actually delivered.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    let well_formed = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };

    if well_formed {
        Ok(())
    } else {
        Err(ValidationError::InvalidFormat {
            field: "email",
            reason: "must look like name@example.com",
        })
    }
}

/// Validates a password (at least 8 characters).
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.len() < 8 {
        return Err(ValidationError::TooShort {
            field: "password",
            min: 8,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_rules() {
        assert!(validate_title("2015 Toyota Corolla LE").is_ok());
        assert!(validate_title("Car").is_err());
        assert!(validate_title("  Car  ").is_err());
    }

    #[test]
    fn test_year_bounds() {
        assert!(validate_year(2015, 2026).is_ok());
        assert!(validate_year(2027, 2026).is_ok()); // next model year
        assert!(validate_year(2028, 2026).is_err());
        assert!(validate_year(1899, 2026).is_err());
    }

    #[test]
    fn test_mileage_bounds() {
        assert!(validate_mileage(0).is_ok());
        assert!(validate_mileage(65_000).is_ok());
        assert!(validate_mileage(-1).is_err());
        assert!(validate_mileage(2_000_001).is_err());
    }

    #[test]
    fn test_email_format() {
        assert!(validate_email("buyer@example.com").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("two@@example.com").is_err());
        assert!(validate_email("dotless@example").is_err());
        assert!(validate_email("spaces in@example.com").is_err());
    }

    #[test]
    fn test_password_length() {
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password("short").is_err());
    }
}
