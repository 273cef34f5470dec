//! Database models for cash-register entries.

use crate::api::models::cash_register::CashEntryCreate;
use crate::types::{ApplicationId, BranchId, CashEntryId, MasterItemId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

#[derive(Debug, Clone)]
pub struct CashEntryCreateDBRequest {
    pub entry_date: NaiveDate,
    pub vehicle_number: String,
    pub customer_name: Option<String>,
    pub purpose: Option<String>,
    pub fees: Decimal,
    pub cash_received: Decimal,
    pub payment_mode_id: Option<MasterItemId>,
    pub bank_account_id: Option<MasterItemId>,
    pub remarks: Option<String>,
    pub branch_id: BranchId,
    pub created_by: UserId,
}

impl CashEntryCreateDBRequest {
    pub fn from_api(api: CashEntryCreate, branch_id: BranchId, created_by: UserId) -> Self {
        Self {
            entry_date: api.entry_date,
            vehicle_number: api.vehicle_number,
            customer_name: api.customer_name,
            purpose: api.purpose,
            fees: api.fees,
            cash_received: api.cash_received,
            payment_mode_id: api.payment_mode_id,
            bank_account_id: api.bank_account_id,
            remarks: api.remarks,
            branch_id,
            created_by,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CashEntryDBResponse {
    pub id: CashEntryId,
    pub entry_date: NaiveDate,
    pub vehicle_number: String,
    pub customer_name: Option<String>,
    pub purpose: Option<String>,
    pub fees: Decimal,
    pub cash_received: Decimal,
    pub payment_mode_id: Option<MasterItemId>,
    pub bank_account_id: Option<MasterItemId>,
    pub remarks: Option<String>,
    pub branch_id: BranchId,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

/// Outcome of saving a cash entry: the persisted row plus the application
/// (if any) whose advance the entry was credited against.
#[derive(Debug, Clone)]
pub struct CashEntrySaveDBResponse {
    pub entry: CashEntryDBResponse,
    pub credited_application_id: Option<ApplicationId>,
}
