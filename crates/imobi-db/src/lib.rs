//! # imobi-db: Database Layer for Imobi
//!
//! SQLite persistence for clients, listings and rental contracts, built on
//! sqlx. This is where the engine's caller-side contracts are enforced:
//! unique listing codes and all-or-nothing installment batches.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Imobi Data Flow                                  │
//! │                                                                         │
//! │  Back-office handler (register client, list property, sign contract)  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     imobi-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │  │   │
//! │  │   │               │    │ ClientRepo     │   │              │  │   │
//! │  │   │ SqlitePool    │◄───│ ListingRepo    │   │ 001_initial  │  │   │
//! │  │   │ DbConfig      │    │ ContractRepo   │   │              │  │   │
//! │  │   └───────────────┘    └───────┬────────┘   └──────────────┘  │   │
//! │  │                                │ pure calls                     │   │
//! │  │                                ▼                                │   │
//! │  │                  imobi-core (document, listing, schedule)      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (IMOBI_DATABASE_PATH)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Pool settings and environment loading
//! - [`pool`] - Connection pool and repository access
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Client, listing and contract repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use imobi_db::{Database, DbConfig, NewListing};
//!
//! let db = Database::new(DbConfig::from_env()?).await?;
//!
//! let listing = db.listings().create(&NewListing {
//!     kind: "AP".into(),
//!     postal_code: "01310-100".into(),
//!     address: "Av. Paulista, 1000".into(),
//!     ..Default::default()
//! }).await?;
//! assert_eq!(listing.code, "AP-01310-001");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, DbConfig};
pub use error::{DbError, DbResult};
pub use pool::Database;

// Repository re-exports for convenience
pub use repository::client::{ClientRecord, ClientRepository, DocumentStatus, NewClient};
pub use repository::contract::{ContractRecord, ContractRepository, InstallmentRecord, NewContract};
pub use repository::listing::{ListingRecord, ListingRepository, ListingWithOwner, NewListing};
