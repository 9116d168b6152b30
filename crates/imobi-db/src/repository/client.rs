//! # Client Repository
//!
//! Owners, tenants and buyers, each identified by a CPF or CNPJ.
//!
//! ## Registration Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  form input "529.982.247-25"                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  check_document() ──► Invalid          (check digits fail)             │
//! │       │           ──► Duplicate{name}  (already registered)            │
//! │       │           ──► Available                                        │
//! │       ▼                                                                 │
//! │  insert() stores the normalized digits "52998224725"                   │
//! │           UNIQUE(document) catches a concurrent duplicate              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::{generate_id, like_pattern};
use imobi_core::{document, CoreError, DocumentKind, ValidationError};

/// A stored client row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ClientRecord {
    pub id: String,
    pub person_type: DocumentKind,
    /// Normalized digits.
    pub document: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub postal_code: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for [`ClientRepository::insert`]. The document may carry a mask.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewClient {
    pub document: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub postal_code: Option<String>,
    pub address: Option<String>,
}

/// Result of checking a document typed into a client form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Wrong length, repeated digits or check digit mismatch.
    Invalid,
    /// Valid, but already registered to `name`.
    Duplicate { name: String },
    /// Valid and free.
    Available,
}

/// Repository for client database operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    /// Creates a new ClientRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ClientRepository { pool }
    }

    /// Checks a raw document before registration.
    ///
    /// A failed lookup is an error, never `Available`.
    pub async fn check_document(&self, raw: &str) -> DbResult<DocumentStatus> {
        let Ok(parsed) = document::parse(raw) else {
            debug!("Document rejected by check digits");
            return Ok(DocumentStatus::Invalid);
        };

        let owner: Option<String> =
            sqlx::query_scalar("SELECT name FROM clients WHERE document = ?1")
                .bind(parsed.digits())
                .fetch_optional(&self.pool)
                .await?;

        Ok(match owner {
            Some(name) => DocumentStatus::Duplicate { name },
            None => DocumentStatus::Available,
        })
    }

    /// Registers a client after validating its document.
    ///
    /// ## Errors
    /// - [`DbError::Core`] when the document fails validation
    /// - [`DbError::UniqueViolation`] when the document is already registered
    pub async fn insert(&self, new: &NewClient) -> DbResult<ClientRecord> {
        let parsed = document::parse(&new.document)?;
        let name = new.name.trim();
        if name.is_empty() {
            return Err(CoreError::from(ValidationError::Required {
                field: "name".to_string(),
            })
            .into());
        }

        let record = ClientRecord {
            id: generate_id(),
            person_type: parsed.kind(),
            document: parsed.digits().to_string(),
            name: name.to_string(),
            email: new.email.clone(),
            phone: new.phone.clone(),
            postal_code: new.postal_code.clone(),
            address: new.address.clone(),
            created_at: Utc::now(),
        };

        debug!(id = %record.id, kind = %record.person_type, "Inserting client");

        sqlx::query(
            r#"
            INSERT INTO clients (
                id, person_type, document, name,
                email, phone, postal_code, address, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&record.id)
        .bind(record.person_type.to_string())
        .bind(&record.document)
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.phone)
        .bind(&record.postal_code)
        .bind(&record.address)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|err| match DbError::from(err) {
            DbError::UniqueViolation { .. } => DbError::duplicate("document", &record.document),
            other => other,
        })?;

        info!(id = %record.id, "Client registered");
        Ok(record)
    }

    /// Gets a client by document, masked or not.
    pub async fn get_by_document(&self, raw: &str) -> DbResult<Option<ClientRecord>> {
        let digits = document::normalize(raw);

        let client: Option<ClientRecord> =
            sqlx::query_as::<_, ClientRecord>("SELECT * FROM clients WHERE document = ?1")
                .bind(digits)
                .fetch_optional(&self.pool)
                .await?;

        Ok(client)
    }

    /// Gets a client by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<ClientRecord>> {
        let client: Option<ClientRecord> =
            sqlx::query_as::<_, ClientRecord>("SELECT * FROM clients WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(client)
    }

    /// Searches clients by name, or by document digits when the query has any.
    ///
    /// `%` and `_` in the query match themselves.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<ClientRecord>> {
        let query = query.trim();
        debug!(query = %query, limit = %limit, "Searching clients");

        let digits = document::normalize(query);

        let clients: Vec<ClientRecord> = sqlx::query_as::<_, ClientRecord>(
            r#"
            SELECT * FROM clients
            WHERE name LIKE ?1 ESCAPE '\'
               OR (?2 <> '' AND document LIKE '%' || ?2 || '%')
            ORDER BY name
            LIMIT ?3
            "#,
        )
        .bind(like_pattern(query))
        .bind(digits)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }

    /// Counts registered clients.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
