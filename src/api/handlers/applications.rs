use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        applications::{ApplicationCreate, ApplicationResponse, ListApplicationsQuery},
        users::CurrentUser,
    },
    audit::AuditEvent,
    auth::permissions,
    db::{handlers::{ApplicationFilter, Applications}, models::applications::ApplicationCreateDBRequest},
    errors::Error,
    types::{ApplicationId, Operation},
};

/// Record a service application
///
/// Staff entries are attributed to the creator's branch; admins may direct
/// the record at any branch.
#[utoipa::path(
    post,
    path = "/applications",
    request_body = ApplicationCreate,
    tag = "applications",
    responses(
        (status = 201, description = "Application recorded", body = ApplicationResponse),
        (status = 400, description = "Missing vehicle number or no branch to attribute to"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_application(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<ApplicationCreate>,
) -> Result<(StatusCode, Json<ApplicationResponse>), Error> {
    if request.vehicle_number.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Vehicle number is required".to_string(),
        });
    }
    let branch_id = permissions::attribution_branch(&current_user, request.branch_id)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let created = Applications::new(&mut conn)
        .create(&ApplicationCreateDBRequest::from_api(request, branch_id, current_user.id))
        .await?;

    state.audit.emit(
        AuditEvent::new(&current_user, Operation::Create, "application")
            .entity_id(created.id)
            .branch(branch_id)
            .changes(serde_json::json!({"vehicle_number": created.vehicle_number})),
    );

    Ok((StatusCode::CREATED, Json(ApplicationResponse::from(created))))
}

/// List applications, newest first
///
/// Staff see their own branch only. Supports filtering by status and by
/// vehicle-number substring.
#[utoipa::path(
    get,
    path = "/applications",
    tag = "applications",
    params(ListApplicationsQuery),
    responses(
        (status = 200, description = "Applications visible to the caller", body = Vec<ApplicationResponse>),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_applications(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListApplicationsQuery>,
) -> Result<Json<Vec<ApplicationResponse>>, Error> {
    let branch_id = permissions::branch_scope(&current_user)?;
    let (skip, limit) = query.pagination.params();

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let applications = Applications::new(&mut conn)
        .list(&ApplicationFilter {
            branch_id,
            status_id: query.status_id,
            vehicle_number: query.vehicle_number,
            skip,
            limit,
        })
        .await?;

    Ok(Json(applications.into_iter().map(ApplicationResponse::from).collect()))
}

/// Fetch one application
#[utoipa::path(
    get,
    path = "/applications/{id}",
    tag = "applications",
    params(("id" = String, Path, format = "uuid", description = "Application id")),
    responses(
        (status = 200, description = "The application", body = ApplicationResponse),
        (status = 404, description = "Application not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_application(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<ApplicationId>,
) -> Result<Json<ApplicationResponse>, Error> {
    let branch_id = permissions::branch_scope(&current_user)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let application = Applications::new(&mut conn)
        .get_by_id(id)
        .await?
        .filter(|a| branch_id.is_none_or(|b| a.branch_id == b))
        .ok_or_else(|| Error::NotFound {
            resource: "application".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(ApplicationResponse::from(application)))
}

/// Delete an application (admin only)
#[utoipa::path(
    delete,
    path = "/applications/{id}",
    tag = "applications",
    params(("id" = String, Path, format = "uuid", description = "Application id")),
    responses(
        (status = 204, description = "Application deleted"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Application not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_application(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<ApplicationId>,
) -> Result<StatusCode, Error> {
    permissions::require_admin(&current_user, "applications")?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if !Applications::new(&mut conn).delete(id).await? {
        return Err(Error::NotFound {
            resource: "application".to_string(),
            id: id.to_string(),
        });
    }

    state
        .audit
        .emit(AuditEvent::new(&current_user, Operation::Delete, "application").entity_id(id));

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::api::models::users::Role;
    use crate::test_utils::{create_test_app, create_test_branch, create_test_user, login};
    use serde_json::json;
    use sqlx::PgPool;

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_staff_create_lands_in_own_branch(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let own = create_test_branch(&pool, "Central", "CEN").await;
        let other = create_test_branch(&pool, "North", "NOR").await;
        create_test_user(&pool, "clerk@example.com", Role::Staff, Some(own)).await;
        let cookie = login(&server, "clerk@example.com").await;

        // The requested branch is ignored for staff
        let response = server
            .post("/api/v1/applications")
            .add_header("cookie", &cookie)
            .json(&json!({"vehicle_number": "KL-01-AB-1234", "branch_id": other}))
            .await;
        assert_eq!(response.status_code(), 201);
        let created: serde_json::Value = response.json();
        assert_eq!(created["branch_id"], json!(own));
        assert_eq!(created["service_fee"], json!("0.00"));
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_lenient_fee_and_date_inputs(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let branch = create_test_branch(&pool, "Central", "CEN").await;
        create_test_user(&pool, "clerk@example.com", Role::Staff, Some(branch)).await;
        let cookie = login(&server, "clerk@example.com").await;

        let response = server
            .post("/api/v1/applications")
            .add_header("cookie", &cookie)
            .json(&json!({
                "vehicle_number": "KL-07-CD-9999",
                "service_fee": "650",
                "advance": "not a number",
                "vahan_fee": "",
                "service_date": "",
            }))
            .await;
        assert_eq!(response.status_code(), 201);
        let created: serde_json::Value = response.json();
        assert_eq!(created["service_fee"], json!("650.00"));
        assert_eq!(created["advance"], json!("0.00"));
        assert_eq!(created["vahan_fee"], json!("0.00"));
        assert_eq!(created["service_date"], json!(null));
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_branch_scoped_listing(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let central = create_test_branch(&pool, "Central", "CEN").await;
        let north = create_test_branch(&pool, "North", "NOR").await;
        create_test_user(&pool, "central@example.com", Role::Staff, Some(central)).await;
        create_test_user(&pool, "north@example.com", Role::Staff, Some(north)).await;
        create_test_user(&pool, "admin@example.com", Role::Admin, None).await;

        let central_cookie = login(&server, "central@example.com").await;
        let north_cookie = login(&server, "north@example.com").await;

        server
            .post("/api/v1/applications")
            .add_header("cookie", &central_cookie)
            .json(&json!({"vehicle_number": "KL-01-AA-0001"}))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
        server
            .post("/api/v1/applications")
            .add_header("cookie", &north_cookie)
            .json(&json!({"vehicle_number": "KL-58-BB-0002"}))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let response = server
            .get("/api/v1/applications")
            .add_header("cookie", &central_cookie)
            .await;
        let listed: Vec<serde_json::Value> = response.json();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["vehicle_number"], "KL-01-AA-0001");

        // Admins see both branches
        let admin_cookie = login(&server, "admin@example.com").await;
        let response = server
            .get("/api/v1/applications")
            .add_header("cookie", &admin_cookie)
            .await;
        let listed: Vec<serde_json::Value> = response.json();
        assert_eq!(listed.len(), 2);
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_get_respects_branch_boundary(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let central = create_test_branch(&pool, "Central", "CEN").await;
        let north = create_test_branch(&pool, "North", "NOR").await;
        create_test_user(&pool, "central@example.com", Role::Staff, Some(central)).await;
        create_test_user(&pool, "north@example.com", Role::Staff, Some(north)).await;

        let central_cookie = login(&server, "central@example.com").await;
        let response = server
            .post("/api/v1/applications")
            .add_header("cookie", &central_cookie)
            .json(&json!({"vehicle_number": "KL-01-AA-0001"}))
            .await;
        let id = response.json::<serde_json::Value>()["id"].as_str().unwrap().to_string();

        let north_cookie = login(&server, "north@example.com").await;
        let response = server
            .get(&format!("/api/v1/applications/{id}"))
            .add_header("cookie", &north_cookie)
            .await;
        assert_eq!(response.status_code(), 404);
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_delete_is_admin_only(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let branch = create_test_branch(&pool, "Central", "CEN").await;
        create_test_user(&pool, "clerk@example.com", Role::Staff, Some(branch)).await;
        create_test_user(&pool, "admin@example.com", Role::Admin, None).await;

        let clerk_cookie = login(&server, "clerk@example.com").await;
        let response = server
            .post("/api/v1/applications")
            .add_header("cookie", &clerk_cookie)
            .json(&json!({"vehicle_number": "KL-01-AA-0001"}))
            .await;
        let id = response.json::<serde_json::Value>()["id"].as_str().unwrap().to_string();

        let response = server
            .delete(&format!("/api/v1/applications/{id}"))
            .add_header("cookie", &clerk_cookie)
            .await;
        assert_eq!(response.status_code(), 403);

        let admin_cookie = login(&server, "admin@example.com").await;
        let response = server
            .delete(&format!("/api/v1/applications/{id}"))
            .add_header("cookie", &admin_cookie)
            .await;
        assert_eq!(response.status_code(), 204);
    }
}
