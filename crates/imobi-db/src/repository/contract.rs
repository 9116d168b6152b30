//! # Contract Repository
//!
//! Rental contracts and their installment schedules.
//!
//! ## Signing a Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. generate_schedule(terms)      (pure, no transaction yet)           │
//! │     └── InvalidInput? → return, nothing written                        │
//! │                                                                         │
//! │  2. BEGIN                                                              │
//! │     ├── INSERT contracts                                               │
//! │     ├── INSERT installments × term_months                              │
//! │     └── COMMIT                                                         │
//! │                                                                         │
//! │  Any failure inside 2 drops the transaction: no contract without its   │
//! │  full schedule, no orphan installments.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;
use crate::repository::generate_id;
use imobi_core::{generate_schedule, Contract, Installment, Money, Percentage, ScheduleTotals};

/// A stored contract row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContractRecord {
    pub id: String,
    pub listing_id: String,
    pub tenant_id: String,
    #[sqlx(rename = "monthly_rent_cents")]
    pub monthly_rent: Money,
    #[sqlx(rename = "commission_bps")]
    pub commission: Percentage,
    pub start_date: NaiveDate,
    pub term_months: i64,
    pub due_day: i64,
    pub created_at: DateTime<Utc>,
}

impl ContractRecord {
    /// The financial terms, as the schedule generator takes them.
    pub fn terms(&self) -> Contract {
        Contract {
            monthly_rent: self.monthly_rent,
            commission: self.commission,
            start_date: self.start_date,
            term_months: self.term_months,
            due_day: self.due_day,
        }
    }
}

/// A stored installment row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct InstallmentRecord {
    pub id: String,
    pub contract_id: String,
    pub sequence: i64,
    pub due_date: NaiveDate,
    #[sqlx(rename = "gross_cents")]
    pub gross_amount: Money,
    #[sqlx(rename = "owner_cents")]
    pub owner_amount: Money,
    #[sqlx(rename = "commission_cents")]
    pub commission_amount: Money,
}

impl From<InstallmentRecord> for Installment {
    fn from(record: InstallmentRecord) -> Self {
        Installment {
            sequence: record.sequence,
            due_date: record.due_date,
            gross_amount: record.gross_amount,
            owner_amount: record.owner_amount,
            commission_amount: record.commission_amount,
        }
    }
}

/// Input for [`ContractRepository::create`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContract {
    pub listing_id: String,
    pub tenant_id: String,
    pub terms: Contract,
}

/// Repository for contract database operations.
#[derive(Debug, Clone)]
pub struct ContractRepository {
    pool: SqlitePool,
}

impl ContractRepository {
    /// Creates a new ContractRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ContractRepository { pool }
    }

    /// Stores a contract together with its full installment schedule.
    ///
    /// ## Errors
    /// - [`crate::DbError::Core`] when the terms are invalid; nothing is written
    /// - [`crate::DbError::ForeignKeyViolation`] for an unknown listing or tenant
    pub async fn create(&self, new: &NewContract) -> DbResult<ContractRecord> {
        let schedule = generate_schedule(&new.terms)?;

        let terms = &new.terms;
        let record = ContractRecord {
            id: generate_id(),
            listing_id: new.listing_id.clone(),
            tenant_id: new.tenant_id.clone(),
            monthly_rent: terms.monthly_rent,
            commission: terms.commission,
            start_date: terms.start_date,
            term_months: terms.term_months,
            due_day: terms.due_day,
            created_at: Utc::now(),
        };

        debug!(
            id = %record.id,
            listing_id = %record.listing_id,
            installments = schedule.len(),
            "Inserting contract"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO contracts (
                id, listing_id, tenant_id, monthly_rent_cents, commission_bps,
                start_date, term_months, due_day, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&record.id)
        .bind(&record.listing_id)
        .bind(&record.tenant_id)
        .bind(record.monthly_rent.cents())
        .bind(record.commission.bps())
        .bind(record.start_date)
        .bind(record.term_months)
        .bind(record.due_day)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await?;

        for installment in &schedule {
            sqlx::query(
                r#"
                INSERT INTO installments (
                    id, contract_id, sequence, due_date,
                    gross_cents, owner_cents, commission_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(generate_id())
            .bind(&record.id)
            .bind(installment.sequence)
            .bind(installment.due_date)
            .bind(installment.gross_amount.cents())
            .bind(installment.owner_amount.cents())
            .bind(installment.commission_amount.cents())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            id = %record.id,
            installments = schedule.len(),
            "Contract created"
        );
        Ok(record)
    }

    /// Gets a contract by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<ContractRecord>> {
        let contract: Option<ContractRecord> =
            sqlx::query_as::<_, ContractRecord>("SELECT * FROM contracts WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(contract)
    }

    /// Gets the installments of a contract, in sequence order.
    pub async fn installments(&self, contract_id: &str) -> DbResult<Vec<InstallmentRecord>> {
        let installments: Vec<InstallmentRecord> = sqlx::query_as::<_, InstallmentRecord>(
            "SELECT * FROM installments WHERE contract_id = ?1 ORDER BY sequence",
        )
        .bind(contract_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(installments)
    }

    /// Sums the stored schedule of a contract.
    ///
    /// ## Errors
    /// - [`crate::DbError::Core`] when a sum leaves the i64 range
    pub async fn totals(&self, contract_id: &str) -> DbResult<ScheduleTotals> {
        let installments: Vec<Installment> = self
            .installments(contract_id)
            .await?
            .into_iter()
            .map(Installment::from)
            .collect();

        Ok(ScheduleTotals::from_installments(&installments)?)
    }

    /// Counts stored contracts.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contracts")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
