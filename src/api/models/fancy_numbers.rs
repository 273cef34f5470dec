//! API request/response models for fancy-number bookings.

use crate::db::models::fancy_numbers::FancyNumberDBResponse;
use crate::types::{BranchId, FancyNumberId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::lenient_date;

/// Booking status.
///
/// Auction bookings start `pending` and are resolved manually to exactly one
/// of `allotted` / `not_allotted`. Non-auction bookings are `confirmed` at
/// creation; all three non-pending states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "fancy_number_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FancyNumberStatus {
    Pending,
    Allotted,
    NotAllotted,
    Confirmed,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct FancyNumberCreate {
    pub fancy_number: String,
    #[serde(default)]
    pub is_for_auction: bool,
    pub application_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    #[schema(value_type = Option<String>, format = "date")]
    pub temp_expiry_date: Option<NaiveDate>,
    pub contact_number: Option<String>,
    pub contact_person: Option<String>,
    pub remarks: Option<String>,
    /// Only honored for admin callers; staff entries take the creator's branch
    #[schema(value_type = Option<String>, format = "uuid")]
    pub branch_id: Option<BranchId>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct FancyNumberUpdate {
    pub application_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    #[schema(value_type = Option<String>, format = "date")]
    pub temp_expiry_date: Option<NaiveDate>,
    pub contact_number: Option<String>,
    pub contact_person: Option<String>,
    pub remarks: Option<String>,
}

/// Auction outcome supplied by the manual resolution action.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AuctionResultRequest {
    pub result: AuctionResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuctionResult {
    Allotted,
    NotAllotted,
}

impl From<AuctionResult> for FancyNumberStatus {
    fn from(result: AuctionResult) -> Self {
        match result {
            AuctionResult::Allotted => FancyNumberStatus::Allotted,
            AuctionResult::NotAllotted => FancyNumberStatus::NotAllotted,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FancyNumberResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: FancyNumberId,
    pub fancy_number: String,
    pub is_for_auction: bool,
    pub application_number: Option<String>,
    #[schema(value_type = Option<String>, format = "date")]
    pub temp_expiry_date: Option<NaiveDate>,
    pub contact_number: Option<String>,
    pub contact_person: Option<String>,
    pub remarks: Option<String>,
    pub status: FancyNumberStatus,
    #[schema(value_type = String, format = "uuid")]
    pub branch_id: BranchId,
    #[schema(value_type = String, format = "uuid")]
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FancyNumberDBResponse> for FancyNumberResponse {
    fn from(db: FancyNumberDBResponse) -> Self {
        Self {
            id: db.id,
            fancy_number: db.fancy_number,
            is_for_auction: db.is_for_auction,
            application_number: db.application_number,
            temp_expiry_date: db.temp_expiry_date,
            contact_number: db.contact_number,
            contact_person: db.contact_person,
            remarks: db.remarks,
            status: db.status,
            branch_id: db.branch_id,
            created_by: db.created_by,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
