use axum::{
    Json,
    extract::{Query, State},
};

use crate::{
    AppState,
    api::models::{
        activity_logs::{ActivityLogResponse, ListActivityLogsQuery},
        users::CurrentUser,
    },
    auth::permissions,
    db::handlers::{ActivityLogFilter, ActivityLogs},
    errors::Error,
};

/// List audit trail entries, newest first (admin only)
///
/// The trail is written asynchronously, so an entry for a just-completed
/// request may lag by a moment.
#[utoipa::path(
    get,
    path = "/activity-logs",
    tag = "activity-logs",
    params(ListActivityLogsQuery),
    responses(
        (status = 200, description = "Audit trail entries", body = Vec<ActivityLogResponse>),
        (status = 403, description = "Admin access required"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_activity_logs(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListActivityLogsQuery>,
) -> Result<Json<Vec<ActivityLogResponse>>, Error> {
    permissions::require_admin(&current_user, "activity logs")?;
    let (skip, limit) = query.pagination.params();

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let logs = ActivityLogs::new(&mut conn)
        .list(&ActivityLogFilter {
            entity: query.entity,
            skip,
            limit,
        })
        .await?;

    Ok(Json(logs.into_iter().map(ActivityLogResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use crate::api::models::users::Role;
    use crate::test_utils::{create_test_app, create_test_branch, create_test_user, login};
    use serde_json::json;
    use sqlx::PgPool;
    use std::time::Duration;

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_mutations_reach_the_trail(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let branch = create_test_branch(&pool, "Central", "CEN").await;
        create_test_user(&pool, "clerk@example.com", Role::Staff, Some(branch)).await;
        create_test_user(&pool, "admin@example.com", Role::Admin, None).await;

        let clerk_cookie = login(&server, "clerk@example.com").await;
        server
            .post("/api/v1/applications")
            .add_header("cookie", &clerk_cookie)
            .json(&json!({"vehicle_number": "KL-01-AA-0001"}))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        // The writer task runs behind the request
        tokio::time::sleep(Duration::from_millis(100)).await;

        let admin_cookie = login(&server, "admin@example.com").await;
        let response = server
            .get("/api/v1/activity-logs?entity=application")
            .add_header("cookie", &admin_cookie)
            .await;
        response.assert_status_ok();
        let logs: Vec<serde_json::Value> = response.json();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0]["action"], "create");
        assert_eq!(logs[0]["user_name"], "clerk@example.com");
        assert_eq!(logs[0]["changes"]["vehicle_number"], "KL-01-AA-0001");
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_trail_is_admin_only(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        create_test_user(&pool, "clerk@example.com", Role::Staff, None).await;
        let cookie = login(&server, "clerk@example.com").await;

        let response = server.get("/api/v1/activity-logs").add_header("cookie", &cookie).await;
        assert_eq!(response.status_code(), 403);
    }
}
