//! Database repository for the audit trail.

use crate::db::{
    errors::Result,
    models::activity_logs::{ActivityLogCreateDBRequest, ActivityLogDBResponse},
};
use crate::types::abbrev_uuid;
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing activity logs
#[derive(Debug, Clone, Default)]
pub struct ActivityLogFilter {
    /// Restrict to one entity kind, e.g. "application"
    pub entity: Option<String>,
    pub skip: i64,
    pub limit: i64,
}

const ACTIVITY_LOG_COLUMNS: &str =
    "id, user_id, user_name, action, entity, entity_id, changes, branch_id, created_at";

pub struct ActivityLogs<'c> {
    db: &'c mut PgConnection,
}

impl<'c> ActivityLogs<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&request.user_id), entity = %request.entity), err)]
    pub async fn create(&mut self, request: &ActivityLogCreateDBRequest) -> Result<ActivityLogDBResponse> {
        let log = sqlx::query_as::<_, ActivityLogDBResponse>(&format!(
            "INSERT INTO activity_logs (id, user_id, user_name, action, entity, entity_id, changes, branch_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {ACTIVITY_LOG_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(request.user_id)
        .bind(&request.user_name)
        .bind(&request.action)
        .bind(&request.entity)
        .bind(&request.entity_id)
        .bind(&request.changes)
        .bind(request.branch_id)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(log)
    }

    #[instrument(skip(self, filter), err)]
    pub async fn list(&mut self, filter: &ActivityLogFilter) -> Result<Vec<ActivityLogDBResponse>> {
        let logs = sqlx::query_as::<_, ActivityLogDBResponse>(&format!(
            "SELECT {ACTIVITY_LOG_COLUMNS} FROM activity_logs \
             WHERE ($1::text IS NULL OR entity = $1) \
             ORDER BY created_at DESC, id DESC \
             OFFSET $2 LIMIT $3"
        ))
        .bind(&filter.entity)
        .bind(filter.skip)
        .bind(filter.limit)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sqlx::PgPool;

    fn log_request(entity: &str, action: &str) -> ActivityLogCreateDBRequest {
        ActivityLogCreateDBRequest {
            user_id: Uuid::new_v4(),
            user_name: "Test User".to_string(),
            action: action.to_string(),
            entity: entity.to_string(),
            entity_id: Some(Uuid::new_v4().to_string()),
            changes: Some(json!({"vehicle_number": "KL-01-AB-1234"})),
            branch_id: None,
        }
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_create_and_list_logs(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut logs = ActivityLogs::new(&mut conn);

        logs.create(&log_request("application", "create")).await.unwrap();
        logs.create(&log_request("registration", "create")).await.unwrap();

        let all = logs.list(&ActivityLogFilter { entity: None, skip: 0, limit: 50 }).await.unwrap();
        assert_eq!(all.len(), 2);

        let filtered = logs
            .list(&ActivityLogFilter {
                entity: Some("application".to_string()),
                skip: 0,
                limit: 50,
            })
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].entity, "application");
        assert_eq!(
            filtered[0].changes.as_ref().and_then(|c| c.get("vehicle_number")).and_then(|v| v.as_str()),
            Some("KL-01-AB-1234")
        );
    }
}
