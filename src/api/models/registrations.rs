//! API request/response models for vehicle registrations.

use crate::db::models::registrations::RegistrationDBResponse;
use crate::types::{BranchId, RegistrationId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegistrationCreate {
    pub application_number: String,
    pub vehicle_type: Option<String>,
    pub contact_number: Option<String>,
    /// Only honored for admin callers; staff entries take the creator's branch
    #[schema(value_type = Option<String>, format = "uuid")]
    pub branch_id: Option<BranchId>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RegistrationUpdate {
    pub vehicle_type: Option<String>,
    pub contact_number: Option<String>,
}

/// Supplies the number for the one-shot allotment action.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AllotNumberRequest {
    pub allotted_number: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RegistrationResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: RegistrationId,
    pub application_number: String,
    pub vehicle_type: Option<String>,
    pub contact_number: Option<String>,
    pub is_allotted: bool,
    pub allotted_number: Option<String>,
    #[schema(value_type = String, format = "uuid")]
    pub branch_id: BranchId,
    #[schema(value_type = String, format = "uuid")]
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RegistrationDBResponse> for RegistrationResponse {
    fn from(db: RegistrationDBResponse) -> Self {
        Self {
            id: db.id,
            application_number: db.application_number,
            vehicle_type: db.vehicle_type,
            contact_number: db.contact_number,
            is_allotted: db.is_allotted,
            allotted_number: db.allotted_number,
            branch_id: db.branch_id,
            created_by: db.created_by,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
