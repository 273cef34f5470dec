//! API response models for the audit trail.

use crate::db::models::activity_logs::ActivityLogDBResponse;
use crate::types::{ActivityLogId, BranchId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::pagination::Pagination;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ActivityLogResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ActivityLogId,
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    pub user_name: String,
    pub action: String,
    pub entity: String,
    pub entity_id: Option<String>,
    #[schema(value_type = Object)]
    pub changes: Option<serde_json::Value>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub branch_id: Option<BranchId>,
    pub created_at: DateTime<Utc>,
}

/// Query parameters for listing activity logs
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListActivityLogsQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Filter by entity name (e.g. "applications")
    pub entity: Option<String>,
}

impl From<ActivityLogDBResponse> for ActivityLogResponse {
    fn from(db: ActivityLogDBResponse) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            user_name: db.user_name,
            action: db.action,
            entity: db.entity,
            entity_id: db.entity_id,
            changes: db.changes,
            branch_id: db.branch_id,
            created_at: db.created_at,
        }
    }
}
