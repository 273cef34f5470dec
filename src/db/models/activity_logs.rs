//! Database models for the audit trail.

use crate::types::{ActivityLogId, BranchId, UserId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone)]
pub struct ActivityLogCreateDBRequest {
    pub user_id: UserId,
    pub user_name: String,
    pub action: String,
    pub entity: String,
    pub entity_id: Option<String>,
    pub changes: Option<serde_json::Value>,
    pub branch_id: Option<BranchId>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ActivityLogDBResponse {
    pub id: ActivityLogId,
    pub user_id: UserId,
    pub user_name: String,
    pub action: String,
    pub entity: String,
    pub entity_id: Option<String>,
    pub changes: Option<serde_json::Value>,
    pub branch_id: Option<BranchId>,
    pub created_at: DateTime<Utc>,
}
