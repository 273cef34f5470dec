//! Database models for vehicle registrations.

use crate::api::models::registrations::{RegistrationCreate, RegistrationUpdate};
use crate::types::{BranchId, RegistrationId, UserId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone)]
pub struct RegistrationCreateDBRequest {
    pub application_number: String,
    pub vehicle_type: Option<String>,
    pub contact_number: Option<String>,
    pub branch_id: BranchId,
    pub created_by: UserId,
}

impl RegistrationCreateDBRequest {
    pub fn from_api(api: RegistrationCreate, branch_id: BranchId, created_by: UserId) -> Self {
        Self {
            application_number: api.application_number,
            vehicle_type: api.vehicle_type,
            contact_number: api.contact_number,
            branch_id,
            created_by,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegistrationUpdateDBRequest {
    pub vehicle_type: Option<String>,
    pub contact_number: Option<String>,
}

impl From<RegistrationUpdate> for RegistrationUpdateDBRequest {
    fn from(update: RegistrationUpdate) -> Self {
        Self {
            vehicle_type: update.vehicle_type,
            contact_number: update.contact_number,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct RegistrationDBResponse {
    pub id: RegistrationId,
    pub application_number: String,
    pub vehicle_type: Option<String>,
    pub contact_number: Option<String>,
    pub is_allotted: bool,
    pub allotted_number: Option<String>,
    pub branch_id: BranchId,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
