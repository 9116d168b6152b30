//! # Listing Code Generator
//!
//! Derives the human-readable code of a new property listing.
//!
//! ## Format
//! ```text
//! "{type}-{postal_prefix}-{seq:03}"
//!
//!   type           AP, CA, SALA ...    (trimmed, alphanumeric)
//!   postal_prefix  first 5 digits of the postal code, separators removed
//!   seq            existing_count + 1, zero-padded to 3 digits
//! ```
//!
//! ## Uniqueness Is The Caller's Job
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. count listings WHERE type = ? AND postal_prefix = ?   (storage)    │
//! │  2. generate(type, postal_code, count)                    (THIS FILE)  │
//! │  3. INSERT listing with the code                          (storage)    │
//! │                                                                         │
//! │  Two writers can read the same count between 1 and 3. The generator    │
//! │  takes no locks; the caller serializes the sequence per                │
//! │  (type, postal_prefix), e.g. UNIQUE(code) + retry on conflict.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreResult, ValidationError};
use crate::types::ListingCode;
use crate::validation::{validate_listing_type, validate_postal_prefix};

/// Removes the separators people type inside postal codes.
///
/// ```rust
/// use imobi_core::listing::normalize_postal_code;
///
/// assert_eq!(normalize_postal_code(" 01.310-200 "), "01310200");
/// ```
pub fn normalize_postal_code(postal_code: &str) -> String {
    postal_code
        .chars()
        .filter(|c| !matches!(c, '-' | '.') && !c.is_whitespace())
        .collect()
}

/// Returns the 5-digit prefix [`generate`] will use for `postal_code`.
///
/// Callers scope their `existing_count` query with this value so the count
/// and the code agree on the prefix.
///
/// ## Example
/// ```rust
/// use imobi_core::listing::postal_prefix;
///
/// assert_eq!(postal_prefix("01310-100").unwrap(), "01310");
/// assert!(postal_prefix("013").is_err());
/// ```
pub fn postal_prefix(postal_code: &str) -> CoreResult<String> {
    let normalized = normalize_postal_code(postal_code);
    Ok(validate_postal_prefix(&normalized)?.to_string())
}

/// Builds the code for the next listing of `kind` under `postal_code`.
///
/// ## Errors
/// [`crate::CoreError::InvalidInput`] when the postal code has fewer than 5
/// characters after removing separators, the prefix is not numeric, the
/// type is empty or malformed, or `existing_count + 1` overflows.
///
/// ## Example
/// ```rust
/// use imobi_core::listing::generate;
///
/// assert_eq!(generate("AP", "01310-100", 4).unwrap().to_string(), "AP-01310-005");
/// assert_eq!(generate("AP", "01310-100", 0).unwrap().to_string(), "AP-01310-001");
/// ```
pub fn generate(kind: &str, postal_code: &str, existing_count: u32) -> CoreResult<ListingCode> {
    let kind = validate_listing_type(kind)?;
    let prefix = postal_prefix(postal_code)?;
    let sequence = existing_count
        .checked_add(1)
        .ok_or_else(|| ValidationError::OutOfRange {
            field: "existing_count".to_string(),
            min: 0,
            max: i64::from(u32::MAX - 1),
        })?;

    Ok(ListingCode {
        kind: kind.to_string(),
        postal_prefix: prefix,
        sequence,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_generate_examples() {
        assert_eq!(generate("AP", "01310-100", 4).unwrap().to_string(), "AP-01310-005");
        assert_eq!(generate("AP", "01310-100", 0).unwrap().to_string(), "AP-01310-001");
    }

    #[test]
    fn test_generate_parts() {
        let code = generate("CA", "22041-001", 11).unwrap();
        assert_eq!(code.kind, "CA");
        assert_eq!(code.postal_prefix, "22041");
        assert_eq!(code.sequence, 12);
        assert_eq!(code.to_string(), "CA-22041-012");
    }

    #[test]
    fn test_sequence_wider_than_padding() {
        assert_eq!(generate("AP", "01310100", 999).unwrap().to_string(), "AP-01310-1000");
    }

    #[test]
    fn test_postal_code_separators_removed() {
        for raw in ["01310-100", "01.310-100", "01310 100", " 01310100 ", "01310"] {
            assert_eq!(postal_prefix(raw).unwrap(), "01310", "input {:?}", raw);
        }
        assert_eq!(normalize_postal_code("01.310-200"), "01310200");
        assert_eq!(normalize_postal_code("22041 001"), "22041001");
    }

    #[test]
    fn test_short_postal_code_is_invalid_input() {
        for raw in ["", "0131", "01-31", "  1 2 3 4 "] {
            assert!(matches!(
                generate("AP", raw, 0),
                Err(CoreError::InvalidInput(ValidationError::TooShort { .. }))
            ));
        }
    }

    #[test]
    fn test_non_numeric_prefix_is_invalid_input() {
        assert!(matches!(
            generate("AP", "AB310-100", 0),
            Err(CoreError::InvalidInput(ValidationError::InvalidFormat { .. }))
        ));
    }

    #[test]
    fn test_type_is_trimmed_and_checked() {
        assert_eq!(generate(" AP ", "01310-100", 0).unwrap().to_string(), "AP-01310-001");
        assert!(generate("", "01310-100", 0).is_err());
        assert!(generate("A-P", "01310-100", 0).is_err());
    }

    #[test]
    fn test_count_overflow() {
        assert!(matches!(
            generate("AP", "01310-100", u32::MAX),
            Err(CoreError::InvalidInput(ValidationError::OutOfRange { .. }))
        ));
        assert_eq!(generate("AP", "01310-100", u32::MAX - 1).unwrap().sequence, u32::MAX);
    }

    #[test]
    fn test_generated_code_parses_back() {
        let code = generate("SALA", "30130-010", 41).unwrap();
        let parsed: ListingCode = code.to_string().parse().unwrap();
        assert_eq!(parsed, code);
    }
}
