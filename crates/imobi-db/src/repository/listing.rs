//! # Listing Repository
//!
//! Stores property listings and allocates their human-readable codes.
//!
//! ## Code Allocation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  attempt = 0                                                            │
//! │  loop:                                                                  │
//! │    BEGIN IMMEDIATE            (write lock taken up front)              │
//! │      owner = clients.id WHERE document = ?     (owner_document only)   │
//! │      n     = COUNT(*) WHERE kind = ? AND postal_prefix = ?             │
//! │      code  = listing::generate(kind, postal_code, n + attempt)         │
//! │      INSERT ... code                                                    │
//! │        ├── ok                → COMMIT, done                             │
//! │        └── UNIQUE(code) hit  → ROLLBACK, attempt += 1                   │
//! │    attempt == listing_code_attempts → RetriesExhausted                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `BEGIN IMMEDIATE` serializes concurrent creators on the SQLite write lock
//! (waiting up to the busy timeout), so each one counts after the previous
//! commit. A deferred `BEGIN` would read first and fail the lock upgrade with
//! `SQLITE_BUSY` instead of waiting.
//!
//! The count alone is still not a safe sequence: a deleted row leaves a gap
//! the count falls back into, and rows outside the counted group can hold a
//! matching code. The `UNIQUE` constraint on `listings.code` is the arbiter;
//! the attempt offset walks past whatever code is already taken.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::pool::PoolConnection;
use sqlx::{Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::{generate_id, like_pattern};
use imobi_core::{document, listing, CoreError, Document, ListingCode, Money, ValidationError};

/// A stored listing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ListingRecord {
    pub id: String,
    /// Canonical code, e.g. `AP-01310-005`.
    pub code: String,
    pub kind: String,
    /// Digits only, separators removed.
    pub postal_code: String,
    pub postal_prefix: String,
    #[sqlx(rename = "asking_price_cents")]
    pub asking_price: Money,
    pub address: String,
    pub complement: Option<String>,
    pub area_m2: i64,
    pub bedrooms: i64,
    pub suites: i64,
    pub parking_spaces: i64,
    pub notes: Option<String>,
    pub owner_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ListingRecord {
    /// Parses the stored code back into its parts.
    pub fn listing_code(&self) -> Result<ListingCode, ValidationError> {
        self.code.parse()
    }
}

/// A search hit: the listing plus its owner's name, if it has an owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ListingWithOwner {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub listing: ListingRecord,
    pub owner_name: Option<String>,
}

/// Input for [`ListingRepository::create`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewListing {
    /// Property type tag, e.g. `AP`.
    pub kind: String,
    /// Postal code as typed; separators are fine.
    pub postal_code: String,
    pub asking_price: Money,
    pub address: String,
    pub complement: Option<String>,
    pub area_m2: i64,
    pub bedrooms: i64,
    pub suites: i64,
    pub parking_spaces: i64,
    pub notes: Option<String>,
    pub owner_id: Option<String>,
    /// Owner CPF / CNPJ, masked or not. Looked up inside the insert
    /// transaction and takes precedence over `owner_id`.
    pub owner_document: Option<String>,
}

/// Repository for listing database operations.
#[derive(Debug, Clone)]
pub struct ListingRepository {
    pool: SqlitePool,
    code_attempts: u32,
}

impl ListingRepository {
    /// Creates a new ListingRepository that tries at most `code_attempts`
    /// codes per listing.
    pub fn new(pool: SqlitePool, code_attempts: u32) -> Self {
        ListingRepository {
            pool,
            code_attempts: code_attempts.max(1),
        }
    }

    /// Creates a listing under the next free code for its type and prefix.
    ///
    /// ## Errors
    /// - [`DbError::Core`] for a bad type, postal code, owner document or
    ///   negative price
    /// - [`DbError::NotFound`] when `owner_document` belongs to no client
    /// - [`DbError::RetriesExhausted`] when every attempted code was taken
    /// - [`DbError::ForeignKeyViolation`] for an unknown `owner_id`
    pub async fn create(&self, new: &NewListing) -> DbResult<ListingRecord> {
        // Validates type and postal code once, and yields their canonical forms.
        let canonical = listing::generate(&new.kind, &new.postal_code, 0)?;
        if new.asking_price.is_negative() {
            return Err(CoreError::from(ValidationError::MustNotBeNegative {
                field: "asking_price".to_string(),
            })
            .into());
        }
        let owner_document = new.owner_document.as_deref().map(document::parse).transpose()?;

        for attempt in 0..self.code_attempts {
            let mut tx = ImmediateTx::begin(&self.pool).await?;

            match insert_attempt(&mut tx.conn, new, &canonical, owner_document.as_ref(), attempt)
                .await
            {
                Ok(record) => {
                    tx.commit().await?;
                    info!(id = %record.id, code = %record.code, "Listing created");
                    return Ok(record);
                }
                Err(err) if err.is_unique_violation() => {
                    warn!(attempt, "Listing code already taken, retrying");
                    tx.rollback().await;
                }
                Err(err) => {
                    tx.rollback().await;
                    return Err(err);
                }
            }
        }

        Err(DbError::RetriesExhausted {
            operation: "Listing code allocation".to_string(),
            attempts: self.code_attempts,
        })
    }

    /// Gets a listing by its code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<ListingRecord>> {
        let listing: Option<ListingRecord> =
            sqlx::query_as::<_, ListingRecord>("SELECT * FROM listings WHERE code = ?1")
                .bind(code.trim())
                .fetch_optional(&self.pool)
                .await?;

        Ok(listing)
    }

    /// Searches listings by code, address or owner name, newest first.
    ///
    /// `%` and `_` in the query match themselves. An empty query lists
    /// everything up to `limit`.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<ListingWithOwner>> {
        let query = query.trim();
        debug!(query = %query, limit = %limit, "Searching listings");

        let listings: Vec<ListingWithOwner> = sqlx::query_as::<_, ListingWithOwner>(
            r#"
            SELECT l.*, c.name AS owner_name
            FROM listings l
            LEFT JOIN clients c ON l.owner_id = c.id
            WHERE l.code LIKE ?1 ESCAPE '\'
               OR l.address LIKE ?1 ESCAPE '\'
               OR c.name LIKE ?1 ESCAPE '\'
            ORDER BY l.created_at DESC, l.rowid DESC
            LIMIT ?2
            "#,
        )
        .bind(like_pattern(query))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(listings)
    }

    /// Counts listings of `kind` sharing the prefix of `postal_code`.
    ///
    /// This is the `existing_count` the code generator expects.
    pub async fn count_by_prefix(&self, kind: &str, postal_code: &str) -> DbResult<i64> {
        let canonical = listing::generate(kind, postal_code, 0)?;

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM listings WHERE kind = ?1 AND postal_prefix = ?2",
        )
        .bind(&canonical.kind)
        .bind(&canonical.postal_prefix)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Counts all listings.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM listings")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Write Transaction
// =============================================================================

/// A pooled connection inside `BEGIN IMMEDIATE`.
///
/// If it is dropped while still open (a failed rollback, a cancelled
/// future), the connection is closed instead of going back to the pool.
struct ImmediateTx {
    conn: PoolConnection<Sqlite>,
    open: bool,
}

impl ImmediateTx {
    async fn begin(pool: &SqlitePool) -> DbResult<Self> {
        let mut conn = pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;
        Ok(ImmediateTx { conn, open: true })
    }

    async fn commit(mut self) -> DbResult<()> {
        let committed = sqlx::query("COMMIT").execute(&mut *self.conn).await;
        match committed {
            Ok(_) => {
                self.open = false;
                Ok(())
            }
            Err(err) => {
                self.rollback().await;
                Err(err.into())
            }
        }
    }

    async fn rollback(mut self) {
        let rolled_back = sqlx::query("ROLLBACK").execute(&mut *self.conn).await;
        match rolled_back {
            Ok(_) => self.open = false,
            Err(err) => warn!(error = %err, "Rollback failed, closing connection"),
        }
    }
}

impl Drop for ImmediateTx {
    fn drop(&mut self) {
        if self.open {
            self.conn.close_on_drop();
        }
    }
}

// =============================================================================
// Statements
// =============================================================================

async fn insert_attempt(
    conn: &mut SqliteConnection,
    new: &NewListing,
    canonical: &ListingCode,
    owner_document: Option<&Document>,
    attempt: u32,
) -> DbResult<ListingRecord> {
    let owner_id = match owner_document {
        Some(doc) => Some(owner_by_document(conn, doc).await?),
        None => new.owner_id.clone(),
    };

    let taken = count_in(conn, &canonical.kind, &canonical.postal_prefix).await?;
    let offset = u32::try_from(taken)
        .map_err(|_| DbError::Internal(format!("listing count out of range: {}", taken)))?
        .saturating_add(attempt);
    let code = listing::generate(&canonical.kind, &new.postal_code, offset)?;

    let record = ListingRecord {
        id: generate_id(),
        code: code.to_string(),
        kind: code.kind.clone(),
        postal_code: listing::normalize_postal_code(&new.postal_code),
        postal_prefix: code.postal_prefix.clone(),
        asking_price: new.asking_price,
        address: new.address.trim().to_string(),
        complement: new.complement.clone(),
        area_m2: new.area_m2,
        bedrooms: new.bedrooms,
        suites: new.suites,
        parking_spaces: new.parking_spaces,
        notes: new.notes.clone(),
        owner_id,
        created_at: Utc::now(),
    };

    debug!(code = %record.code, attempt, "Inserting listing");
    insert_in(conn, &record).await?;

    Ok(record)
}

async fn owner_by_document(conn: &mut SqliteConnection, doc: &Document) -> DbResult<String> {
    let id: Option<String> = sqlx::query_scalar("SELECT id FROM clients WHERE document = ?1")
        .bind(doc.digits())
        .fetch_optional(&mut *conn)
        .await?;

    id.ok_or_else(|| DbError::not_found("Client", doc.digits()))
}

async fn count_in(conn: &mut SqliteConnection, kind: &str, prefix: &str) -> DbResult<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM listings WHERE kind = ?1 AND postal_prefix = ?2")
            .bind(kind)
            .bind(prefix)
            .fetch_one(&mut *conn)
            .await?;

    Ok(count)
}

async fn insert_in(conn: &mut SqliteConnection, record: &ListingRecord) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO listings (
            id, code, kind, postal_code, postal_prefix, asking_price_cents,
            address, complement, area_m2, bedrooms, suites, parking_spaces,
            notes, owner_id, created_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6,
            ?7, ?8, ?9, ?10, ?11, ?12,
            ?13, ?14, ?15
        )
        "#,
    )
    .bind(&record.id)
    .bind(&record.code)
    .bind(&record.kind)
    .bind(&record.postal_code)
    .bind(&record.postal_prefix)
    .bind(record.asking_price.cents())
    .bind(&record.address)
    .bind(&record.complement)
    .bind(record.area_m2)
    .bind(record.bedrooms)
    .bind(record.suites)
    .bind(record.parking_spaces)
    .bind(&record.notes)
    .bind(&record.owner_id)
    .bind(record.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::client::NewClient;
    use crate::{Database, DbConfig};
    use std::collections::HashSet;

    fn listing(kind: &str, postal_code: &str) -> NewListing {
        NewListing {
            kind: kind.to_string(),
            postal_code: postal_code.to_string(),
            asking_price: Money::from_cents(25_000_000),
            address: "Av. Paulista, 1000".to_string(),
            ..NewListing::default()
        }
    }

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    /// Inserts a row whose code sits outside the counted `(kind, prefix)` group.
    async fn plant_code(db: &Database, code: &str) {
        sqlx::query(
            "INSERT INTO listings (id, code, kind, postal_code, postal_prefix, address, created_at)
             VALUES (?1, ?2, 'LEGACY', '00000000', '00000', 'legacy import', ?3)",
        )
        .bind(generate_id())
        .bind(code)
        .bind(Utc::now())
        .execute(db.pool())
        .await
        .unwrap();
    }

    async fn register_owner(db: &Database, document: &str, name: &str) -> String {
        db.clients()
            .insert(&NewClient {
                document: document.to_string(),
                name: name.to_string(),
                ..NewClient::default()
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_codes_increment_per_type_and_prefix() {
        let repo = db().await.listings();

        let first = repo.create(&listing("AP", "01310-100")).await.unwrap();
        let second = repo.create(&listing("AP", "01310.200")).await.unwrap();
        let house = repo.create(&listing("CA", "01310-100")).await.unwrap();
        let elsewhere = repo.create(&listing("AP", "22041-001")).await.unwrap();

        assert_eq!(first.code, "AP-01310-001");
        assert_eq!(second.code, "AP-01310-002");
        assert_eq!(house.code, "CA-01310-001");
        assert_eq!(elsewhere.code, "AP-22041-001");

        assert_eq!(repo.count_by_prefix("AP", "01310-999").await.unwrap(), 2);
        assert_eq!(repo.count().await.unwrap(), 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_get_distinct_codes() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("imobi.db")).max_connections(8))
            .await
            .unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let repo = db.listings();
                tokio::spawn(async move { repo.create(&listing("AP", "01310-100")).await })
            })
            .collect();

        let mut codes = HashSet::new();
        for handle in handles {
            let record = handle.await.unwrap().unwrap();
            assert!(codes.insert(record.code), "code handed out twice");
        }

        let expected: HashSet<String> = (1..=16).map(|n| format!("AP-01310-{:03}", n)).collect();
        assert_eq!(codes, expected);
        assert_eq!(db.listings().count().await.unwrap(), 16);

        db.close().await;
    }

    #[tokio::test]
    async fn test_colliding_code_is_skipped() {
        let db = db().await;
        plant_code(&db, "AP-01310-002").await;
        let repo = db.listings();

        assert_eq!(repo.create(&listing("AP", "01310-100")).await.unwrap().code, "AP-01310-001");
        assert_eq!(repo.create(&listing("AP", "01310-100")).await.unwrap().code, "AP-01310-003");
        assert_eq!(repo.count_by_prefix("AP", "01310-100").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let db = Database::new(DbConfig::in_memory().listing_code_attempts(2))
            .await
            .unwrap();
        plant_code(&db, "AP-01310-001").await;
        plant_code(&db, "AP-01310-002").await;

        let err = db.listings().create(&listing("AP", "01310-100")).await.unwrap_err();
        assert!(matches!(err, DbError::RetriesExhausted { attempts: 2, .. }));
        assert_eq!(db.listings().count_by_prefix("AP", "01310-100").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_input_writes_nothing() {
        let repo = db().await.listings();

        for bad in [listing("AP", "0131"), listing("", "01310-100"), listing("A-P", "01310-100")] {
            let err = repo.create(&bad).await.unwrap_err();
            assert!(matches!(err, DbError::Core(CoreError::InvalidInput(_))));
        }

        let mut negative = listing("AP", "01310-100");
        negative.asking_price = Money::from_cents(-1);
        assert!(repo.create(&negative).await.is_err());

        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_owner_rejected() {
        let repo = db().await.listings();
        let mut orphan = listing("AP", "01310-100");
        orphan.owner_id = Some("missing".to_string());

        let err = repo.create(&orphan).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert_eq!(repo.count().await.unwrap(), 0);

        // The rolled-back connection is reusable.
        let created = repo.create(&listing("AP", "01310-100")).await.unwrap();
        assert_eq!(created.code, "AP-01310-001");
    }

    #[tokio::test]
    async fn test_owner_resolved_by_document() {
        let db = db().await;
        let owner_id = register_owner(&db, "52998224725", "Maria Souza").await;
        let repo = db.listings();

        let mut owned = listing("AP", "01310-100");
        owned.owner_document = Some("529.982.247-25".to_string());
        owned.owner_id = Some("ignored".to_string());

        let created = repo.create(&owned).await.unwrap();
        assert_eq!(created.owner_id.as_deref(), Some(owner_id.as_str()));

        let stored = repo.get_by_code(&created.code).await.unwrap().unwrap();
        assert_eq!(stored.owner_id, Some(owner_id));
    }

    #[tokio::test]
    async fn test_unregistered_owner_document() {
        let repo = db().await.listings();

        let mut unknown = listing("AP", "01310-100");
        unknown.owner_document = Some("111.444.777-35".to_string());
        let err = repo.create(&unknown).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref id, .. } if id == "11144477735"));

        let mut invalid = listing("AP", "01310-100");
        invalid.owner_document = Some("529.982.247-24".to_string());
        let err = repo.create(&invalid).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::ChecksumMismatch { .. })));

        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_postal_code_stored_without_separators() {
        let repo = db().await.listings();
        let created = repo.create(&listing("AP", " 01.310-200 ")).await.unwrap();

        assert_eq!(created.postal_code, "01310200");
        let stored = repo.get_by_code(&created.code).await.unwrap().unwrap();
        assert_eq!(stored.postal_code, "01310200");
        assert_eq!(stored.postal_prefix, "01310");
    }

    #[tokio::test]
    async fn test_search_by_code_address_and_owner() {
        let db = db().await;
        register_owner(&db, "52998224725", "Maria Souza").await;
        let repo = db.listings();

        let paulista = repo.create(&listing("AP", "01310-100")).await.unwrap();

        let mut augusta = listing("CA", "01310-200");
        augusta.address = "Rua Augusta, 500".to_string();
        augusta.owner_document = Some("52998224725".to_string());
        let augusta = repo.create(&augusta).await.unwrap();

        let mut rio = listing("SL", "22041-001");
        rio.address = "Av. Atlantica, 10".to_string();
        let rio = repo.create(&rio).await.unwrap();

        let by_address = repo.search("paulista", 10).await.unwrap();
        assert_eq!(by_address.len(), 1);
        assert_eq!(by_address[0].listing.id, paulista.id);
        assert_eq!(by_address[0].owner_name, None);

        let by_owner = repo.search("souza", 10).await.unwrap();
        assert_eq!(by_owner.len(), 1);
        assert_eq!(by_owner[0].listing.id, augusta.id);
        assert_eq!(by_owner[0].owner_name.as_deref(), Some("Maria Souza"));

        let by_code = repo.search("sl-22041", 10).await.unwrap();
        assert_eq!(by_code.len(), 1);
        assert_eq!(by_code[0].listing.code, "SL-22041-001");

        // Newest first
        let all: Vec<String> = repo
            .search("", 10)
            .await
            .unwrap()
            .into_iter()
            .map(|hit| hit.listing.id)
            .collect();
        assert_eq!(all, vec![rio.id, augusta.id, paulista.id]);
        assert_eq!(repo.search("", 2).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_search_wildcards_are_literal() {
        let repo = db().await.listings();
        repo.create(&listing("AP", "01310-100")).await.unwrap();

        let mut discounted = listing("CA", "01310-100");
        discounted.address = "Rua 100% Nova, 1".to_string();
        repo.create(&discounted).await.unwrap();

        let found = repo.search("%", 10).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].listing.address, "Rua 100% Nova, 1");

        assert!(repo.search("_", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_by_code() {
        let repo = db().await.listings();
        let created = repo.create(&listing("AP", "01310-100")).await.unwrap();

        let found = repo.get_by_code("AP-01310-001").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.postal_prefix, "01310");
        assert_eq!(found.asking_price, Money::from_cents(25_000_000));
        assert_eq!(found.listing_code().unwrap().sequence, 1);

        assert!(repo.get_by_code("AP-01310-002").await.unwrap().is_none());
    }
}
