//! # Contract Schedule Generator
//!
//! Expands a rental [`Contract`] into its monthly [`Installment`]s.
//!
//! ## Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  for i in 0..term_months:                                               │
//! │                                                                         │
//! │    due_date   = month(start_date + i months), day = due_day            │
//! │                 └── clamped to the month's last day when shorter       │
//! │                     (due_day 31 in February → 28th / 29th)             │
//! │                                                                         │
//! │    commission = round_half_up(rent × rate)      in centavos            │
//! │    owner      = rent - commission               exact remainder        │
//! │    sequence   = i + 1                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The whole batch is built before anything is returned: invalid terms give
//! an error and no installments at all. The caller persists the batch in a
//! single transaction.
//!
//! ## Example
//! ```rust
//! use chrono::NaiveDate;
//! use imobi_core::schedule::generate_schedule;
//! use imobi_core::{Contract, Money, Percentage};
//!
//! let contract = Contract {
//!     monthly_rent: Money::from_cents(100_000),
//!     commission: Percentage::from_percent(10),
//!     start_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
//!     term_months: 3,
//!     due_day: 10,
//! };
//!
//! let installments = generate_schedule(&contract).unwrap();
//! assert_eq!(installments.len(), 3);
//! assert_eq!(installments[1].due_date, NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());
//! assert_eq!(installments[1].commission_amount, Money::from_cents(10_000));
//! ```

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Contract, Installment};
use crate::validation::{
    validate_commission, validate_due_day, validate_monthly_rent, validate_term_months,
};

/// Generates every installment of `contract`, in order.
///
/// ## Errors
/// [`crate::CoreError::InvalidInput`] when `term_months` is not positive (or
/// above [`crate::MAX_TERM_MONTHS`]), the rent or commission is negative, the
/// commission exceeds 100%, `due_day` is outside 1-31, or a due date would
/// fall outside the supported calendar.
pub fn generate_schedule(contract: &Contract) -> CoreResult<Vec<Installment>> {
    validate_term_months(contract.term_months)?;
    validate_monthly_rent(contract.monthly_rent)?;
    validate_commission(contract.commission)?;
    validate_due_day(contract.due_day)?;

    let split = contract.monthly_rent.split(contract.commission);
    let due_day = contract.due_day as u32;

    (0..contract.term_months)
        .map(|offset| {
            let due_date = due_date(contract.start_date, offset as u32, due_day).ok_or_else(|| {
                ValidationError::InvalidFormat {
                    field: "start_date".to_string(),
                    reason: "schedule runs past the supported calendar".to_string(),
                }
            })?;

            Ok(Installment {
                sequence: offset + 1,
                due_date,
                gross_amount: split.gross,
                owner_amount: split.owner,
                commission_amount: split.commission,
            })
        })
        .collect()
}

/// Due date `offset` months after `start`, on `due_day` or the month's last
/// day, whichever comes first.
fn due_date(start: NaiveDate, offset: u32, due_day: u32) -> Option<NaiveDate> {
    let month = start.with_day(1)?.checked_add_months(Months::new(offset))?;
    let last_day = month.checked_add_months(Months::new(1))?.pred_opt()?.day();
    month.with_day(due_day.min(last_day))
}

// =============================================================================
// Totals
// =============================================================================

/// Aggregate of a schedule, for contract summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScheduleTotals {
    pub installments: i64,
    pub gross: Money,
    pub owner: Money,
    pub commission: Money,
}

impl ScheduleTotals {
    /// Sums a slice of installments.
    ///
    /// ## Errors
    /// [`crate::CoreError::InvalidInput`] when a sum leaves the i64 range.
    pub fn from_installments(installments: &[Installment]) -> CoreResult<Self> {
        installments
            .iter()
            .try_fold(ScheduleTotals::default(), |totals, installment| {
                Ok(ScheduleTotals {
                    installments: totals.installments + 1,
                    gross: add_total("gross", totals.gross, installment.gross_amount)?,
                    owner: add_total("owner", totals.owner, installment.owner_amount)?,
                    commission: add_total(
                        "commission",
                        totals.commission,
                        installment.commission_amount,
                    )?,
                })
            })
    }
}

fn add_total(field: &str, total: Money, amount: Money) -> CoreResult<Money> {
    total.checked_add(amount).ok_or_else(|| {
        ValidationError::OutOfRange {
            field: format!("{}_total", field),
            min: i64::MIN,
            max: i64::MAX,
        }
        .into()
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
