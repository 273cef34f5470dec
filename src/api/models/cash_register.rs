//! API request/response models for cash-register entries.

use crate::db::models::cash_register::CashEntryDBResponse;
use crate::types::{ApplicationId, BranchId, CashEntryId, MasterItemId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::lenient_decimal;
use super::pagination::Pagination;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CashEntryCreate {
    #[schema(value_type = String, format = "date")]
    pub entry_date: NaiveDate,
    pub vehicle_number: String,
    pub customer_name: Option<String>,
    pub purpose: Option<String>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    #[schema(value_type = f64)]
    pub fees: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    #[schema(value_type = f64)]
    pub cash_received: Decimal,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub payment_mode_id: Option<MasterItemId>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub bank_account_id: Option<MasterItemId>,
    pub remarks: Option<String>,
    /// Only honored for admin callers; staff entries take the creator's branch
    #[schema(value_type = Option<String>, format = "uuid")]
    pub branch_id: Option<BranchId>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CashEntryResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: CashEntryId,
    #[schema(value_type = String, format = "date")]
    pub entry_date: NaiveDate,
    pub vehicle_number: String,
    pub customer_name: Option<String>,
    pub purpose: Option<String>,
    #[schema(value_type = f64)]
    pub fees: Decimal,
    #[schema(value_type = f64)]
    pub cash_received: Decimal,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub payment_mode_id: Option<MasterItemId>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub bank_account_id: Option<MasterItemId>,
    pub remarks: Option<String>,
    #[schema(value_type = String, format = "uuid")]
    pub branch_id: BranchId,
    #[schema(value_type = String, format = "uuid")]
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

/// Query parameters for listing cash entries
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListCashEntriesQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Restrict to one register day
    #[param(value_type = Option<String>, format = "date")]
    pub entry_date: Option<NaiveDate>,
}

/// Result of saving a cash entry, including the reconciliation outcome.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CashEntrySaveResponse {
    pub entry: CashEntryResponse,
    /// The application whose advance was credited, if one matched the
    /// entry's vehicle number and branch
    #[schema(value_type = Option<String>, format = "uuid")]
    pub credited_application_id: Option<ApplicationId>,
}

impl From<CashEntryDBResponse> for CashEntryResponse {
    fn from(db: CashEntryDBResponse) -> Self {
        Self {
            id: db.id,
            entry_date: db.entry_date,
            vehicle_number: db.vehicle_number,
            customer_name: db.customer_name,
            purpose: db.purpose,
            fees: db.fees,
            cash_received: db.cash_received,
            payment_mode_id: db.payment_mode_id,
            bank_account_id: db.bank_account_id,
            remarks: db.remarks,
            branch_id: db.branch_id,
            created_by: db.created_by,
            created_at: db.created_at,
        }
    }
}
