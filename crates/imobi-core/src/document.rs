//! # Document Validator
//!
//! Check-digit validation for Brazilian taxpayer identifiers.
//!
//! ## Dispatch
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  raw input "529.982.247-25"                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  normalize() → "52998224725"   (every non-digit stripped)              │
//! │       │                                                                 │
//! │       ├── 11 digits → Individual                                       │
//! │       │     ├── all digits equal? → InvalidFormat (sentinel)           │
//! │       │     └── positions 9, 10: weights (i + 1) - k                   │
//! │       │         check = ((sum * 10) mod 11) mod 10                      │
//! │       │                                                                 │
//! │       ├── 14 digits → Organization                                     │
//! │       │     └── positions 12, 13: fixed weight tables                  │
//! │       │         check = 0 if sum mod 11 < 2 else 11 - sum mod 11       │
//! │       │                                                                 │
//! │       └── anything else → InvalidFormat                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use imobi_core::document;
//!
//! assert!(document::validate("529.982.247-25"));
//! assert!(document::validate("11.222.333/0001-81"));
//! assert!(!document::validate("111.111.111-11"));
//! ```

use crate::error::{CoreError, CoreResult};
use crate::types::{Document, DocumentKind};

/// Weights for the first organization check digit (position 12).
const ORGANIZATION_WEIGHTS_FIRST: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Weights for the second organization check digit (position 13).
const ORGANIZATION_WEIGHTS_SECOND: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

// =============================================================================
// Public API
// =============================================================================

/// Strips every character that is not an ASCII digit.
pub fn normalize(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Returns whether `raw` is a valid individual or organization identifier.
///
/// Pure: the same input always gives the same answer.
pub fn validate(raw: &str) -> bool {
    parse(raw).is_ok()
}

/// Validates `raw` and returns the normalized [`Document`].
///
/// ## Errors
/// - [`CoreError::InvalidFormat`] for a length other than 11 or 14, or an
///   11-digit value made of one repeated digit
/// - [`CoreError::ChecksumMismatch`] when either check digit is wrong
pub fn parse(raw: &str) -> CoreResult<Document> {
    let digits = normalize(raw);
    let kind = DocumentKind::from_len(digits.len()).ok_or_else(|| CoreError::InvalidFormat {
        reason: format!("expected 11 or 14 digits, got {}", digits.len()),
    })?;

    let values = digit_values(&digits);

    // Repeated digits pass the arithmetic but are known placeholders.
    if kind == DocumentKind::Individual && values.iter().all(|&d| d == values[0]) {
        return Err(CoreError::InvalidFormat {
            reason: "repeated-digit placeholder".to_string(),
        });
    }

    let body_len = kind.digit_count() - 2;
    if values[body_len..] != compute_check_digits(kind, &values[..body_len]) {
        return Err(CoreError::ChecksumMismatch { kind });
    }

    Ok(Document::new_unchecked(kind, digits))
}

/// Computes the two check digits for a document body.
///
/// `body` is the identifier without its check digits: 9 digits for an
/// individual, 12 for an organization. Separators are ignored.
///
/// ## Example
/// ```rust
/// use imobi_core::document::check_digits;
/// use imobi_core::DocumentKind;
///
/// assert_eq!(check_digits(DocumentKind::Individual, "529.982.247").unwrap(), [2, 5]);
/// assert_eq!(check_digits(DocumentKind::Organization, "11.222.333/0001").unwrap(), [8, 1]);
/// ```
pub fn check_digits(kind: DocumentKind, body: &str) -> CoreResult<[u8; 2]> {
    let digits = normalize(body);
    let expected = kind.digit_count() - 2;
    if digits.len() != expected {
        return Err(CoreError::InvalidFormat {
            reason: format!("{} body needs {} digits, got {}", kind, expected, digits.len()),
        });
    }
    Ok(compute_check_digits(kind, &digit_values(&digits)))
}

/// Appends the check digits to `body` and validates the result.
///
/// Used to mint fixtures and seed data. Fails like [`parse`] when the
/// completed identifier is a repeated-digit placeholder.
pub fn complete(kind: DocumentKind, body: &str) -> CoreResult<Document> {
    let [first, second] = check_digits(kind, body)?;
    parse(&format!("{}{}{}", normalize(body), first, second))
}

// =============================================================================
// Check Digit Arithmetic
// =============================================================================

fn digit_values(digits: &str) -> Vec<u8> {
    digits.bytes().map(|b| b - b'0').collect()
}

/// `body` holds exactly `kind.digit_count() - 2` values.
fn compute_check_digits(kind: DocumentKind, body: &[u8]) -> [u8; 2] {
    let mut digits = body.to_vec();
    match kind {
        DocumentKind::Individual => {
            let first = individual_check_digit(&digits);
            digits.push(first);
            let second = individual_check_digit(&digits);
            [first, second]
        }
        DocumentKind::Organization => {
            let first = organization_check_digit(&digits, &ORGANIZATION_WEIGHTS_FIRST);
            digits.push(first);
            let second = organization_check_digit(&digits, &ORGANIZATION_WEIGHTS_SECOND);
            [first, second]
        }
    }
}

/// Check digit for position `i = prefix.len()`: weight of digit `k` is
/// `(i + 1) - k`.
fn individual_check_digit(prefix: &[u8]) -> u8 {
    let top = prefix.len() as u32 + 1;
    let sum: u32 = prefix
        .iter()
        .enumerate()
        .map(|(k, &d)| d as u32 * (top - k as u32))
        .sum();
    ((sum * 10 % 11) % 10) as u8
}

fn organization_check_digit(prefix: &[u8], weights: &[u32]) -> u8 {
    let sum: u32 = prefix.iter().zip(weights).map(|(&d, &w)| d as u32 * w).sum();
    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        (11 - remainder) as u8
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_INDIVIDUALS: [&str; 6] = [
        "52998224725",
        "11144477735",
        "12345678909",
        "39053344705",
        "98765432100",
        "15350946056",
    ];

    const VALID_ORGANIZATIONS: [&str; 6] = [
        "11222333000181",
        "45997418000153",
        "04252011000110",
        "33000167000101",
        "60701190000104",
        "27865757000102",
    ];

    /// Replaces the digit at `position` with `digit`.
    fn with_digit(doc: &str, position: usize, digit: u8) -> String {
        let mut bytes = doc.as_bytes().to_vec();
        bytes[position] = b'0' + digit;
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("529.982.247-25"), "52998224725");
        assert_eq!(normalize("11.222.333/0001-81"), "11222333000181");
        assert_eq!(normalize(" abc "), "");
        // Only ASCII digits survive
        assert_eq!(normalize("١٢٣45"), "45");
    }

    #[test]
    fn test_valid_individuals() {
        for doc in VALID_INDIVIDUALS {
            assert!(validate(doc), "{} should be valid", doc);
            assert_eq!(parse(doc).unwrap().kind(), DocumentKind::Individual);
        }
    }

    #[test]
    fn test_valid_organizations() {
        for doc in VALID_ORGANIZATIONS {
            assert!(validate(doc), "{} should be valid", doc);
            assert_eq!(parse(doc).unwrap().kind(), DocumentKind::Organization);
        }
    }

    #[test]
    fn test_masked_input_is_accepted() {
        assert!(validate("529.982.247-25"));
        assert!(validate("11.222.333/0001-81"));
        assert_eq!(parse("529.982.247-25").unwrap().digits(), "52998224725");
    }

    #[test]
    fn test_repeated_digit_individuals_rejected() {
        for d in 0..10u8 {
            let doc = (b'0' + d) as char;
            let doc: String = std::iter::repeat(doc).take(11).collect();
            assert!(!validate(&doc), "{} must be rejected", doc);
            assert!(matches!(parse(&doc), Err(CoreError::InvalidFormat { .. })));
        }
    }

    #[test]
    fn test_repeated_zero_organization_follows_arithmetic() {
        // Only the 11-digit form has a placeholder rule; all zeros satisfy
        // the organization checksum.
        assert!(validate("00000000000000"));
        assert!(!validate("11111111111111"));
    }

    #[test]
    fn test_single_digit_changes_detected() {
        // These fixtures detect every single-digit substitution.
        for doc in ["52998224725", "11144477735", "15350946056"] {
            for position in 0..11 {
                for digit in 0..10u8 {
                    let changed = with_digit(doc, position, digit);
                    if changed != doc {
                        assert!(!validate(&changed), "{} should be invalid", changed);
                    }
                }
            }
        }

        for doc in VALID_ORGANIZATIONS {
            for position in 0..14 {
                for digit in 0..10u8 {
                    let changed = with_digit(doc, position, digit);
                    if changed != doc {
                        assert!(!validate(&changed), "{} should be invalid", changed);
                    }
                }
            }
        }
    }

    #[test]
    fn test_single_digit_changes_detected_with_high_probability() {
        // The individual scheme gives the leading digit weight 11 in the
        // second check, so a few substitutions there slip through.
        let mut total = 0;
        let mut undetected = 0;
        for doc in VALID_INDIVIDUALS {
            for position in 0..11 {
                for digit in 0..10u8 {
                    let changed = with_digit(doc, position, digit);
                    if changed == doc {
                        continue;
                    }
                    total += 1;
                    if validate(&changed) {
                        undetected += 1;
                    }
                }
            }
        }
        assert_eq!(total, 6 * 11 * 9);
        assert!(undetected * 50 < total, "{} of {} undetected", undetected, total);
    }

    #[test]
    fn test_corrupted_check_digits() {
        for doc in VALID_INDIVIDUALS {
            let last = doc.as_bytes()[10] - b'0';
            let corrupted = with_digit(doc, 10, (last + 1) % 10);
            assert_eq!(
                parse(&corrupted),
                Err(CoreError::ChecksumMismatch {
                    kind: DocumentKind::Individual
                })
            );
        }

        for doc in VALID_ORGANIZATIONS {
            for position in [12, 13] {
                let current = doc.as_bytes()[position] - b'0';
                let corrupted = with_digit(doc, position, (current + 1) % 10);
                assert_eq!(
                    parse(&corrupted),
                    Err(CoreError::ChecksumMismatch {
                        kind: DocumentKind::Organization
                    })
                );
            }
        }
    }

    #[test]
    fn test_wrong_lengths() {
        for doc in ["", "123", "5299822472", "529982247250", "1122233300018", "112223330001810"] {
            assert!(!validate(doc));
            assert!(matches!(parse(doc), Err(CoreError::InvalidFormat { .. })));
        }
    }

    #[test]
    fn test_weight_tables_not_interchangeable() {
        // Using the individual weighting on an organization body (or the
        // other way round) would not reproduce these digits.
        assert_eq!(check_digits(DocumentKind::Individual, "529982247").unwrap(), [2, 5]);
        assert_eq!(check_digits(DocumentKind::Organization, "112223330001").unwrap(), [8, 1]);
        assert_eq!(check_digits(DocumentKind::Organization, "459974180001").unwrap(), [5, 3]);
        assert!(check_digits(DocumentKind::Individual, "112223330001").is_err());
    }

    #[test]
    fn test_complete() {
        let doc = complete(DocumentKind::Individual, "111.444.777").unwrap();
        assert_eq!(doc.digits(), "11144477735");

        let doc = complete(DocumentKind::Organization, "60.701.190/0001").unwrap();
        assert_eq!(doc.formatted(), "60.701.190/0001-04");

        // 111111111 completes to the 11111111111 placeholder
        assert!(complete(DocumentKind::Individual, "111111111").is_err());
    }

    #[test]
    fn test_validate_is_idempotent() {
        for doc in VALID_INDIVIDUALS.iter().chain(VALID_ORGANIZATIONS.iter()) {
            let normalized = normalize(doc);
            assert_eq!(validate(&normalized), validate(&normalized));
            assert_eq!(parse(&normalized), parse(&normalized));
        }
        assert_eq!(validate("12345678900"), validate("12345678900"));
    }
}
