//! # Domain Types
//!
//! Core domain types used throughout Imobi.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Document     │   │   ListingCode   │   │    Contract     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  kind           │   │  kind  "AP"     │   │  monthly_rent   │       │
//! │  │  digits         │   │  prefix "01310" │   │  commission     │       │
//! │  └─────────────────┘   │  sequence 5     │   │  start_date     │       │
//! │                        └─────────────────┘   │  term_months    │       │
//! │  ┌─────────────────┐   ┌─────────────────┐   │  due_day        │       │
//! │  │  DocumentKind   │   │   Percentage    │   └────────┬────────┘       │
//! │  │  Individual     │   │  bps (i64)      │            │ 1:N            │
//! │  │  Organization   │   │  1000 = 10%     │   ┌────────▼────────┐       │
//! │  └─────────────────┘   └─────────────────┘   │   Installment   │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{parse_hundredths, Money};
use crate::{DEFAULT_COMMISSION_BPS, POSTAL_PREFIX_LEN};

// =============================================================================
// Percentage
// =============================================================================

/// A percentage in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1000 bps = 10% (the usual administration fee)
///
/// Signed so a negative form value survives parsing and is rejected by
/// validation with a proper error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Percentage(i64);

impl Percentage {
    /// Creates a percentage from basis points.
    #[inline]
    pub const fn from_bps(bps: i64) -> Self {
        Percentage(bps)
    }

    /// Creates a percentage from a whole number of percent.
    #[inline]
    pub const fn from_percent(percent: i64) -> Self {
        Percentage(percent * 100)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> i64 {
        self.0
    }

    /// Zero percent.
    #[inline]
    pub const fn zero() -> Self {
        Percentage(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the rate is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Percentage::from_bps(DEFAULT_COMMISSION_BPS)
    }
}

/// Parses `"10"`, `"8.25"` or `"-1"` (percent, up to two decimals).
impl FromStr for Percentage {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hundredths(s.trim().trim_end_matches('%'), "commission_percent").map(Percentage)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{}{}.{:02}%", sign, abs / 100, abs % 100)
    }
}

// =============================================================================
// Documents
// =============================================================================

/// The two national taxpayer identifier formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Natural person, 11 digits (CPF).
    Individual,
    /// Legal entity, 14 digits (CNPJ).
    Organization,
}

impl DocumentKind {
    /// Number of digits of a complete identifier of this kind.
    #[inline]
    pub const fn digit_count(&self) -> usize {
        match self {
            DocumentKind::Individual => 11,
            DocumentKind::Organization => 14,
        }
    }

    /// Picks the kind from a normalized digit count.
    pub const fn from_len(len: usize) -> Option<Self> {
        match len {
            11 => Some(DocumentKind::Individual),
            14 => Some(DocumentKind::Organization),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Individual => f.write_str("individual"),
            DocumentKind::Organization => f.write_str("organization"),
        }
    }
}

/// A validated, normalized taxpayer identifier.
///
/// Only [`crate::document::parse`] builds one, so holding a `Document`
/// means the check digits matched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, TS)]
#[ts(export)]
pub struct Document {
    kind: DocumentKind,
    digits: String,
}

impl Document {
    pub(crate) fn new_unchecked(kind: DocumentKind, digits: String) -> Self {
        Document { kind, digits }
    }

    /// Individual or organization.
    #[inline]
    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// The bare digits, as stored.
    #[inline]
    pub fn digits(&self) -> &str {
        &self.digits
    }

    /// Conventional masked rendering.
    ///
    /// ## Example
    /// ```rust
    /// use imobi_core::document;
    ///
    /// let cpf = document::parse("52998224725").unwrap();
    /// assert_eq!(cpf.formatted(), "529.982.247-25");
    ///
    /// let cnpj = document::parse("11222333000181").unwrap();
    /// assert_eq!(cnpj.formatted(), "11.222.333/0001-81");
    /// ```
    pub fn formatted(&self) -> String {
        let d = &self.digits;
        match self.kind {
            DocumentKind::Individual => {
                format!("{}.{}.{}-{}", &d[0..3], &d[3..6], &d[6..9], &d[9..11])
            }
            DocumentKind::Organization => format!(
                "{}.{}.{}/{}-{}",
                &d[0..2],
                &d[2..5],
                &d[5..8],
                &d[8..12],
                &d[12..14]
            ),
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digits)
    }
}

// =============================================================================
// Listing Code
// =============================================================================

/// Human-readable property code: `{kind}-{postal_prefix}-{sequence:03}`.
///
/// ## Example
/// `AP-01310-005` is the fifth apartment registered under postal prefix 01310.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ListingCode {
    /// Property type tag, e.g. `AP` (apartment) or `CA` (house).
    pub kind: String,
    /// First five digits of the postal code.
    pub postal_prefix: String,
    /// 1-based position within `(kind, postal_prefix)`.
    pub sequence: u32,
}

impl fmt::Display for ListingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{:03}", self.kind, self.postal_prefix, self.sequence)
    }
}

/// Parses the canonical code string back into its parts.
impl FromStr for ListingCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "listing_code".to_string(),
            reason: reason.to_string(),
        };

        let mut parts = s.split('-');
        let (Some(kind), Some(prefix), Some(seq), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid("expected TYPE-PREFIX-SEQ"));
        };

        if kind.is_empty() || !kind.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(invalid("type must be alphanumeric"));
        }
        if prefix.len() != POSTAL_PREFIX_LEN || !prefix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("postal prefix must be 5 digits"));
        }
        if seq.is_empty() || !seq.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("sequence must be numeric"));
        }
        let sequence: u32 = seq.parse().map_err(|_| invalid("sequence too large"))?;
        if sequence == 0 {
            return Err(invalid("sequence starts at 1"));
        }

        let code = ListingCode {
            kind: kind.to_string(),
            postal_prefix: prefix.to_string(),
            sequence,
        };
        if code.to_string() != s {
            return Err(invalid("sequence must be zero-padded to 3 digits"));
        }
        Ok(code)
    }
}

// =============================================================================
// Contract
// =============================================================================

/// Terms of a signed rental contract. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Contract {
    /// Gross rent charged to the tenant each month.
    pub monthly_rent: Money,
    /// Agency administration fee taken from each rent.
    pub commission: Percentage,
    /// Contract start; the month of the first installment.
    #[ts(as = "String")]
    pub start_date: NaiveDate,
    /// Number of monthly installments.
    pub term_months: i64,
    /// Day of month installments fall due (1-31).
    pub due_day: i64,
}

impl Contract {
    /// Creates contract terms with the default administration fee.
    pub fn new(monthly_rent: Money, start_date: NaiveDate, term_months: i64, due_day: i64) -> Self {
        Contract {
            monthly_rent,
            commission: Percentage::default(),
            start_date,
            term_months,
            due_day,
        }
    }

    /// Overrides the administration fee.
    pub fn with_commission(mut self, commission: Percentage) -> Self {
        self.commission = commission;
        self
    }
}

// =============================================================================
// Installment
// =============================================================================

/// One monthly obligation derived from a [`Contract`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Installment {
    /// 1-based position in the schedule.
    pub sequence: i64,
    #[ts(as = "String")]
    pub due_date: NaiveDate,
    /// Rent charged to the tenant.
    pub gross_amount: Money,
    /// Remitted to the property owner.
    pub owner_amount: Money,
    /// Kept by the agency.
    pub commission_amount: Money,
}

impl Installment {
    /// `owner_amount + commission_amount == gross_amount`.
    #[inline]
    pub fn is_balanced(&self) -> bool {
        self.owner_amount + self.commission_amount == self.gross_amount
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_constructors() {
        assert_eq!(Percentage::from_percent(10).bps(), 1000);
        assert_eq!(Percentage::from_bps(825).bps(), 825);
        assert!(Percentage::zero().is_zero());
        assert!(Percentage::from_bps(-1).is_negative());
    }

    #[test]
    fn test_percentage_default_is_ten_percent() {
        assert_eq!(Percentage::default(), Percentage::from_percent(10));
    }

    #[test]
    fn test_percentage_parse_and_display() {
        assert_eq!("10".parse::<Percentage>().unwrap().bps(), 1000);
        assert_eq!("8.25".parse::<Percentage>().unwrap().bps(), 825);
        assert_eq!("12.5%".parse::<Percentage>().unwrap().bps(), 1250);
        assert_eq!("-1".parse::<Percentage>().unwrap().bps(), -100);
        assert!("8.125".parse::<Percentage>().is_err());

        assert_eq!(Percentage::from_bps(825).to_string(), "8.25%");
        assert_eq!(Percentage::from_bps(-50).to_string(), "-0.50%");
    }

    #[test]
    fn test_document_kind_lengths() {
        assert_eq!(DocumentKind::from_len(11), Some(DocumentKind::Individual));
        assert_eq!(DocumentKind::from_len(14), Some(DocumentKind::Organization));
        assert_eq!(DocumentKind::from_len(12), None);
        assert_eq!(DocumentKind::Organization.digit_count(), 14);
    }

    #[test]
    fn test_listing_code_display() {
        let code = ListingCode {
            kind: "AP".to_string(),
            postal_prefix: "01310".to_string(),
            sequence: 5,
        };
        assert_eq!(code.to_string(), "AP-01310-005");

        let wide = ListingCode {
            sequence: 1234,
            ..code
        };
        assert_eq!(wide.to_string(), "AP-01310-1234");
    }

    #[test]
    fn test_listing_code_parse() {
        let code: ListingCode = "CA-22041-012".parse().unwrap();
        assert_eq!(code.kind, "CA");
        assert_eq!(code.postal_prefix, "22041");
        assert_eq!(code.sequence, 12);

        assert!("CA-22041-1234".parse::<ListingCode>().is_ok());

        assert!("CA-22041-12".parse::<ListingCode>().is_err());
        assert!("CA-22041-000".parse::<ListingCode>().is_err());
        assert!("CA-2204-012".parse::<ListingCode>().is_err());
        assert!("C-A-22041-012".parse::<ListingCode>().is_err());
        assert!("-22041-012".parse::<ListingCode>().is_err());
        assert!("CA22041012".parse::<ListingCode>().is_err());
    }

    #[test]
    fn test_contract_builder() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let contract = Contract::new(Money::from_cents(100_000), start, 12, 10)
            .with_commission(Percentage::from_percent(8));

        assert_eq!(contract.commission.bps(), 800);
        assert_eq!(contract.term_months, 12);
    }

    #[test]
    fn test_installment_serializes_money_as_cents() {
        let installment = Installment {
            sequence: 1,
            due_date: NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(),
            gross_amount: Money::from_cents(100_000),
            owner_amount: Money::from_cents(90_000),
            commission_amount: Money::from_cents(10_000),
        };
        assert!(installment.is_balanced());

        let json = serde_json::to_value(&installment).unwrap();
        assert_eq!(json["due_date"], "2024-02-10");
        assert_eq!(json["gross_amount"], 100_000);
        assert_eq!(json["commission_amount"], 10_000);
    }
}
