//! API request/response models for branches.

use crate::db::models::branches::BranchDBResponse;
use crate::types::BranchId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BranchCreate {
    pub name: String,
    pub code: String,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BranchUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BranchResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: BranchId,
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<BranchDBResponse> for BranchResponse {
    fn from(db: BranchDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            code: db.code,
            address: db.address,
            created_at: db.created_at,
        }
    }
}
