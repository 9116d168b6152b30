//! # Repository Module
//!
//! Database repository implementations for Imobi.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Back-office handler                                                   │
//! │       │                                                                 │
//! │       │  db.listings().create(&new_listing)                            │
//! │       ▼                                                                 │
//! │  ListingRepository                                                     │
//! │  ├── validates through imobi-core (codes, documents, schedules)        │
//! │  ├── owns the transaction                                              │
//! │  └── maps sqlx errors into DbError                                     │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ClientRepository`](client::ClientRepository) - Clients keyed by taxpayer document
//! - [`ListingRepository`](listing::ListingRepository) - Listings with unique codes
//! - [`ContractRepository`](contract::ContractRepository) - Contracts and their installments

pub mod client;
pub mod contract;
pub mod listing;

use uuid::Uuid;

/// Generates a new primary key.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Wraps user input as a `LIKE` substring pattern, escaping `\`, `%` and `_`.
///
/// Queries using it must say `LIKE ? ESCAPE '\'`.
pub(crate) fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
