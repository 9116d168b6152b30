//! # Validation Module
//!
//! Domain range checks for listing and contract inputs.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form / API layer                                             │
//! │  ├── Presence checks                                                    │
//! │  └── Numeric parsing (Money::from_str, Percentage::from_str)          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - domain ranges                                  │
//! │  ├── rent ≥ 0, 0 ≤ commission ≤ 100%                                  │
//! │  ├── 1 ≤ term_months ≤ MAX_TERM_MONTHS, 1 ≤ due_day ≤ 31              │
//! │  └── listing type and postal prefix shape                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE(listing code), UNIQUE(client document)                     │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::Percentage;
use crate::{MAX_LISTING_TYPE_LEN, MAX_TERM_MONTHS, POSTAL_PREFIX_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Contract Validators
// =============================================================================

/// Validates the monthly rent. Zero is allowed (courtesy contracts).
pub fn validate_monthly_rent(rent: Money) -> ValidationResult<()> {
    if rent.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "monthly_rent".to_string(),
        });
    }
    Ok(())
}

/// Validates the administration fee.
///
/// ## Rules
/// - Must not be negative
/// - Must not exceed 100% (the owner share would turn negative)
pub fn validate_commission(rate: Percentage) -> ValidationResult<()> {
    if rate.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "commission_percent".to_string(),
        });
    }
    if rate.bps() > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "commission_bps".to_string(),
            min: 0,
            max: 10_000,
        });
    }
    Ok(())
}

/// Validates the contract term in months.
///
/// ## Example
/// ```rust
/// use imobi_core::validation::validate_term_months;
///
/// assert!(validate_term_months(30).is_ok());
/// assert!(validate_term_months(0).is_err());
/// ```
pub fn validate_term_months(term_months: i64) -> ValidationResult<()> {
    if term_months <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "term_months".to_string(),
        });
    }
    if term_months > MAX_TERM_MONTHS {
        return Err(ValidationError::OutOfRange {
            field: "term_months".to_string(),
            min: 1,
            max: MAX_TERM_MONTHS,
        });
    }
    Ok(())
}

/// Validates the due day of month (1-31).
pub fn validate_due_day(due_day: i64) -> ValidationResult<()> {
    if !(1..=31).contains(&due_day) {
        return Err(ValidationError::OutOfRange {
            field: "due_day".to_string(),
            min: 1,
            max: 31,
        });
    }
    Ok(())
}

// =============================================================================
// Listing Validators
// =============================================================================

/// Validates a property type tag and returns it trimmed.
///
/// ## Rules
/// - Must not be empty
/// - At most [`MAX_LISTING_TYPE_LEN`] characters
/// - ASCII letters and digits only; a `-` would break the code layout
pub fn validate_listing_type(kind: &str) -> ValidationResult<&str> {
    let kind = kind.trim();

    if kind.is_empty() {
        return Err(ValidationError::Required {
            field: "type".to_string(),
        });
    }
    if kind.len() > MAX_LISTING_TYPE_LEN {
        return Err(ValidationError::TooLong {
            field: "type".to_string(),
            max: MAX_LISTING_TYPE_LEN,
        });
    }
    if !kind.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: "type".to_string(),
            reason: "must contain only letters and numbers".to_string(),
        });
    }
    Ok(kind)
}

/// Validates a normalized postal code and returns its 5-character prefix.
pub fn validate_postal_prefix(normalized: &str) -> ValidationResult<&str> {
    if normalized.chars().count() < POSTAL_PREFIX_LEN {
        return Err(ValidationError::TooShort {
            field: "postal_code".to_string(),
            min: POSTAL_PREFIX_LEN,
        });
    }

    let end = normalized
        .char_indices()
        .nth(POSTAL_PREFIX_LEN)
        .map(|(i, _)| i)
        .unwrap_or(normalized.len());
    let prefix = &normalized[..end];

    if !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "postal_code".to_string(),
            reason: "prefix must be digits".to_string(),
        });
    }
    Ok(prefix)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_monthly_rent() {
        assert!(validate_monthly_rent(Money::from_cents(0)).is_ok());
        assert!(validate_monthly_rent(Money::from_cents(150_000)).is_ok());
        assert!(validate_monthly_rent(Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_validate_commission() {
        assert!(validate_commission(Percentage::zero()).is_ok());
        assert!(validate_commission(Percentage::from_bps(825)).is_ok());
        assert!(validate_commission(Percentage::from_percent(100)).is_ok());

        assert!(matches!(
            validate_commission(Percentage::from_bps(-1)),
            Err(ValidationError::MustNotBeNegative { .. })
        ));
        assert!(matches!(
            validate_commission(Percentage::from_bps(10_001)),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_term_months() {
        assert!(validate_term_months(1).is_ok());
        assert!(validate_term_months(MAX_TERM_MONTHS).is_ok());

        assert!(validate_term_months(0).is_err());
        assert!(validate_term_months(-12).is_err());
        assert!(validate_term_months(MAX_TERM_MONTHS + 1).is_err());
    }

    #[test]
    fn test_validate_due_day() {
        assert!(validate_due_day(1).is_ok());
        assert!(validate_due_day(31).is_ok());
        assert!(validate_due_day(0).is_err());
        assert!(validate_due_day(32).is_err());
        assert!(validate_due_day(-5).is_err());
    }

    #[test]
    fn test_validate_listing_type() {
        assert_eq!(validate_listing_type(" AP ").unwrap(), "AP");
        assert!(validate_listing_type("SALA2").is_ok());

        assert!(validate_listing_type("").is_err());
        assert!(validate_listing_type("   ").is_err());
        assert!(validate_listing_type("A-P").is_err());
        assert!(validate_listing_type("CASA GRANDE").is_err());
        assert!(validate_listing_type(&"A".repeat(11)).is_err());
    }

    #[test]
    fn test_validate_postal_prefix() {
        assert_eq!(validate_postal_prefix("01310100").unwrap(), "01310");
        assert_eq!(validate_postal_prefix("01310").unwrap(), "01310");

        assert!(matches!(
            validate_postal_prefix("0131"),
            Err(ValidationError::TooShort { min: 5, .. })
        ));
        assert!(validate_postal_prefix("AB310100").is_err());
        assert!(validate_postal_prefix("çã310100").is_err());
    }
}
