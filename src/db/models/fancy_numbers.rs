//! Database models for fancy-number bookings.

use crate::api::models::fancy_numbers::{FancyNumberCreate, FancyNumberStatus, FancyNumberUpdate};
use crate::types::{BranchId, FancyNumberId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone)]
pub struct FancyNumberCreateDBRequest {
    pub fancy_number: String,
    pub is_for_auction: bool,
    pub application_number: Option<String>,
    pub temp_expiry_date: Option<NaiveDate>,
    pub contact_number: Option<String>,
    pub contact_person: Option<String>,
    pub remarks: Option<String>,
    pub status: FancyNumberStatus,
    pub branch_id: BranchId,
    pub created_by: UserId,
}

impl FancyNumberCreateDBRequest {
    /// Build from the API request. Auction bookings start pending; everything
    /// else is confirmed at creation.
    pub fn from_api(api: FancyNumberCreate, branch_id: BranchId, created_by: UserId) -> Self {
        let status = if api.is_for_auction {
            FancyNumberStatus::Pending
        } else {
            FancyNumberStatus::Confirmed
        };
        Self {
            fancy_number: api.fancy_number,
            is_for_auction: api.is_for_auction,
            application_number: api.application_number,
            temp_expiry_date: api.temp_expiry_date,
            contact_number: api.contact_number,
            contact_person: api.contact_person,
            remarks: api.remarks,
            status,
            branch_id,
            created_by,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FancyNumberUpdateDBRequest {
    pub application_number: Option<String>,
    pub temp_expiry_date: Option<NaiveDate>,
    pub contact_number: Option<String>,
    pub contact_person: Option<String>,
    pub remarks: Option<String>,
}

impl From<FancyNumberUpdate> for FancyNumberUpdateDBRequest {
    fn from(update: FancyNumberUpdate) -> Self {
        Self {
            application_number: update.application_number,
            temp_expiry_date: update.temp_expiry_date,
            contact_number: update.contact_number,
            contact_person: update.contact_person,
            remarks: update.remarks,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct FancyNumberDBResponse {
    pub id: FancyNumberId,
    pub fancy_number: String,
    pub is_for_auction: bool,
    pub application_number: Option<String>,
    pub temp_expiry_date: Option<NaiveDate>,
    pub contact_number: Option<String>,
    pub contact_person: Option<String>,
    pub remarks: Option<String>,
    pub status: FancyNumberStatus,
    pub branch_id: BranchId,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn api_request(is_for_auction: bool) -> FancyNumberCreate {
        FancyNumberCreate {
            fancy_number: "KL-01-9999".to_string(),
            is_for_auction,
            application_number: None,
            temp_expiry_date: None,
            contact_number: None,
            contact_person: None,
            remarks: None,
            branch_id: None,
        }
    }

    #[test]
    fn test_auction_bookings_start_pending() {
        let request = FancyNumberCreateDBRequest::from_api(api_request(true), Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(request.status, FancyNumberStatus::Pending);
    }

    #[test]
    fn test_direct_bookings_start_confirmed() {
        let request = FancyNumberCreateDBRequest::from_api(api_request(false), Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(request.status, FancyNumberStatus::Confirmed);
    }
}
