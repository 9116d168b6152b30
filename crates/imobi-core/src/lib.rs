//! # imobi-core: Pure Business Logic for Imobi
//!
//! This crate holds the document-validation and contract-financial engine of
//! the Imobi real-estate back-office, as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Imobi Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Back-office (forms, sessions, templates)           │   │
//! │  │    Client form ──► Listing intake ──► Contract signing          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ in-process calls                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ imobi-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ document  │  │  listing  │  │ schedule  │  │   money   │  │   │
//! │  │   │ CPF/CNPJ  │  │   codes   │  │ installm. │  │ centavos  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO LOGGING • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    imobi-db (Database Layer)                    │   │
//! │  │      counts, unique codes, atomic installment batches           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`document`] - Taxpayer identifier check digits
//! - [`listing`] - Listing code generator
//! - [`schedule`] - Installment schedule generator
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`types`] - Domain types (Contract, Installment, ListingCode, ...)
//! - [`validation`] - Domain range checks
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output; no hidden state
//! 2. **No I/O**: the caller owns storage, locking and transactions
//! 3. **Integer Money**: amounts are centavos (i64), rates are basis points
//! 4. **Explicit Errors**: every failure is a typed value, never a panic
//!
//! ## Example Usage
//!
//! ```rust
//! use imobi_core::{document, listing};
//!
//! assert!(document::validate("529.982.247-25"));
//!
//! let code = listing::generate("AP", "01310-100", 4).unwrap();
//! assert_eq!(code.to_string(), "AP-01310-005");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod document;
pub mod error;
pub mod listing;
pub mod money;
pub mod schedule;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{CommissionSplit, Money};
pub use schedule::{generate_schedule, ScheduleTotals};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Administration fee used when a contract form leaves it blank (10%).
pub const DEFAULT_COMMISSION_BPS: i64 = 1000;

/// Longest accepted contract, in months (50 years).
pub const MAX_TERM_MONTHS: i64 = 600;

/// Number of postal code characters that go into a listing code.
pub const POSTAL_PREFIX_LEN: usize = 5;

/// Longest accepted listing type tag.
pub const MAX_LISTING_TYPE_LEN: usize = 10;
