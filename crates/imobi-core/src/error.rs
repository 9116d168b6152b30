//! # Error Types
//!
//! Domain-specific error types for imobi-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  imobi-core errors (this file)                                         │
//! │  ├── CoreError        - InvalidFormat / ChecksumMismatch / InvalidInput │
//! │  └── ValidationError  - Which field broke which range rule             │
//! │                                                                         │
//! │  imobi-db errors (separate crate)                                      │
//! │  └── DbError          - Database failures, wraps CoreError             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → caller → user message   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, document kind)
//! 3. Every failure is a value; the engine never panics on bad input
//! 4. The engine never logs; translating errors is the caller's job

use thiserror::Error;

use crate::types::DocumentKind;

// =============================================================================
// Core Error
// =============================================================================

/// Engine errors.
///
/// These are value-level failures returned to the caller. Nothing here is
/// transient, so nothing is worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Identifier has the wrong shape after stripping non-digits.
    ///
    /// ## When This Occurs
    /// - Length is neither 11 nor 14
    /// - 11-digit sentinel made of one repeated digit (`000.000.000-00`)
    #[error("Invalid document format: {reason}")]
    InvalidFormat { reason: String },

    /// Identifier has the right length but a wrong check digit.
    ///
    /// ## User Workflow
    /// ```text
    /// Client form: document "529.982.247-26"
    ///      │
    ///      ▼
    /// parse() → ChecksumMismatch { kind: Individual }
    ///      │
    ///      ▼
    /// UI shows: "CPF ou CNPJ inválido"
    /// ```
    #[error("Check digit mismatch for {kind} document")]
    ChecksumMismatch { kind: DocumentKind },

    /// Out-of-range listing or contract parameter.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Always wrapped in [`CoreError::InvalidInput`] when they leave the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., non-digit postal prefix, bad decimal).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
