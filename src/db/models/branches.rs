//! Database models for branches.

use crate::api::models::branches::{BranchCreate, BranchUpdate};
use crate::types::BranchId;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone)]
pub struct BranchCreateDBRequest {
    pub name: String,
    pub code: String,
    pub address: Option<String>,
}

impl From<BranchCreate> for BranchCreateDBRequest {
    fn from(api: BranchCreate) -> Self {
        Self {
            name: api.name,
            code: api.code,
            address: api.address,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BranchUpdateDBRequest {
    pub name: Option<String>,
    pub address: Option<String>,
}

impl From<BranchUpdate> for BranchUpdateDBRequest {
    fn from(update: BranchUpdate) -> Self {
        Self {
            name: update.name,
            address: update.address,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct BranchDBResponse {
    pub id: BranchId,
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}
