use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        pagination::Pagination,
        registrations::{AllotNumberRequest, RegistrationCreate, RegistrationResponse, RegistrationUpdate},
        users::CurrentUser,
    },
    audit::AuditEvent,
    auth::permissions,
    db::{
        handlers::{AllotOutcome, RegistrationFilter, Registrations},
        models::registrations::{RegistrationCreateDBRequest, RegistrationUpdateDBRequest},
    },
    errors::Error,
    types::{Operation, RegistrationId},
};

/// Record a vehicle registration awaiting number allotment
#[utoipa::path(
    post,
    path = "/registrations",
    request_body = RegistrationCreate,
    tag = "registrations",
    responses(
        (status = 201, description = "Registration recorded", body = RegistrationResponse),
        (status = 400, description = "Missing application number or no branch to attribute to"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_registration(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<RegistrationCreate>,
) -> Result<(StatusCode, Json<RegistrationResponse>), Error> {
    if request.application_number.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Application number is required".to_string(),
        });
    }
    let branch_id = permissions::attribution_branch(&current_user, request.branch_id)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let created = Registrations::new(&mut conn)
        .create(&RegistrationCreateDBRequest::from_api(request, branch_id, current_user.id))
        .await?;

    state.audit.emit(
        AuditEvent::new(&current_user, Operation::Create, "registration")
            .entity_id(created.id)
            .branch(branch_id)
            .changes(serde_json::json!({"application_number": created.application_number})),
    );

    Ok((StatusCode::CREATED, Json(RegistrationResponse::from(created))))
}

/// List registrations, newest first (staff see their own branch)
#[utoipa::path(
    get,
    path = "/registrations",
    tag = "registrations",
    params(Pagination),
    responses(
        (status = 200, description = "Registrations visible to the caller", body = Vec<RegistrationResponse>),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_registrations(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<RegistrationResponse>>, Error> {
    let branch_id = permissions::branch_scope(&current_user)?;
    let (skip, limit) = pagination.params();

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let registrations = Registrations::new(&mut conn)
        .list(&RegistrationFilter { branch_id, skip, limit })
        .await?;

    Ok(Json(registrations.into_iter().map(RegistrationResponse::from).collect()))
}

/// Fetch one registration
#[utoipa::path(
    get,
    path = "/registrations/{id}",
    tag = "registrations",
    params(("id" = String, Path, format = "uuid", description = "Registration id")),
    responses(
        (status = 200, description = "The registration", body = RegistrationResponse),
        (status = 404, description = "Registration not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_registration(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<RegistrationId>,
) -> Result<Json<RegistrationResponse>, Error> {
    let branch_id = permissions::branch_scope(&current_user)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let registration = Registrations::new(&mut conn)
        .get_by_id(id)
        .await?
        .filter(|r| branch_id.is_none_or(|b| r.branch_id == b))
        .ok_or_else(|| Error::NotFound {
            resource: "registration".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(RegistrationResponse::from(registration)))
}

/// Update contact details on a registration
#[utoipa::path(
    put,
    path = "/registrations/{id}",
    request_body = RegistrationUpdate,
    tag = "registrations",
    params(("id" = String, Path, format = "uuid", description = "Registration id")),
    responses(
        (status = 200, description = "Updated registration", body = RegistrationResponse),
        (status = 404, description = "Registration not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_registration(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<RegistrationId>,
    Json(request): Json<RegistrationUpdate>,
) -> Result<Json<RegistrationResponse>, Error> {
    let branch_id = permissions::branch_scope(&current_user)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut registrations = Registrations::new(&mut conn);

    let visible = registrations
        .get_by_id(id)
        .await?
        .filter(|r| branch_id.is_none_or(|b| r.branch_id == b));
    if visible.is_none() {
        return Err(Error::NotFound {
            resource: "registration".to_string(),
            id: id.to_string(),
        });
    }

    let updated = registrations
        .update(id, &RegistrationUpdateDBRequest::from(request))
        .await?;

    state
        .audit
        .emit(AuditEvent::new(&current_user, Operation::Update, "registration").entity_id(id));

    Ok(Json(RegistrationResponse::from(updated)))
}

/// Record the allotted number (one-shot)
///
/// The first successful call wins; later calls get 409 and the stored
/// number is never overwritten.
#[utoipa::path(
    post,
    path = "/registrations/{id}/allot",
    request_body = AllotNumberRequest,
    tag = "registrations",
    params(("id" = String, Path, format = "uuid", description = "Registration id")),
    responses(
        (status = 200, description = "Number allotted", body = RegistrationResponse),
        (status = 404, description = "Registration not found"),
        (status = 409, description = "Number already allotted"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn allot_number(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<RegistrationId>,
    Json(request): Json<AllotNumberRequest>,
) -> Result<Json<RegistrationResponse>, Error> {
    if request.allotted_number.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Allotted number is required".to_string(),
        });
    }
    let branch_id = permissions::branch_scope(&current_user)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut registrations = Registrations::new(&mut conn);

    let visible = registrations
        .get_by_id(id)
        .await?
        .filter(|r| branch_id.is_none_or(|b| r.branch_id == b));
    if visible.is_none() {
        return Err(Error::NotFound {
            resource: "registration".to_string(),
            id: id.to_string(),
        });
    }

    match registrations.allot_number(id, &request.allotted_number).await? {
        AllotOutcome::Allotted => {}
        AllotOutcome::AlreadyAllotted => {
            return Err(Error::Conflict {
                message: "A number has already been allotted to this registration".to_string(),
            });
        }
        AllotOutcome::NotFound => {
            return Err(Error::NotFound {
                resource: "registration".to_string(),
                id: id.to_string(),
            });
        }
    }

    let updated = registrations.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "registration".to_string(),
        id: id.to_string(),
    })?;

    state.audit.emit(
        AuditEvent::new(&current_user, Operation::Update, "registration")
            .entity_id(id)
            .changes(serde_json::json!({"allotted_number": request.allotted_number})),
    );

    Ok(Json(RegistrationResponse::from(updated)))
}

/// Delete a registration (admin only)
#[utoipa::path(
    delete,
    path = "/registrations/{id}",
    tag = "registrations",
    params(("id" = String, Path, format = "uuid", description = "Registration id")),
    responses(
        (status = 204, description = "Registration deleted"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Registration not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_registration(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<RegistrationId>,
) -> Result<StatusCode, Error> {
    permissions::require_admin(&current_user, "registrations")?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if !Registrations::new(&mut conn).delete(id).await? {
        return Err(Error::NotFound {
            resource: "registration".to_string(),
            id: id.to_string(),
        });
    }

    state
        .audit
        .emit(AuditEvent::new(&current_user, Operation::Delete, "registration").entity_id(id));

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::api::models::users::Role;
    use crate::test_utils::{create_test_app, create_test_branch, create_test_user, login};
    use serde_json::json;
    use sqlx::PgPool;

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_allotment_is_one_shot(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let branch = create_test_branch(&pool, "Central", "CEN").await;
        create_test_user(&pool, "clerk@example.com", Role::Staff, Some(branch)).await;
        let cookie = login(&server, "clerk@example.com").await;

        let response = server
            .post("/api/v1/registrations")
            .add_header("cookie", &cookie)
            .json(&json!({"application_number": "APP-2026-001"}))
            .await;
        assert_eq!(response.status_code(), 201);
        let id = response.json::<serde_json::Value>()["id"].as_str().unwrap().to_string();

        let response = server
            .post(&format!("/api/v1/registrations/{id}/allot"))
            .add_header("cookie", &cookie)
            .json(&json!({"allotted_number": "KL-01-CH-4001"}))
            .await;
        response.assert_status_ok();
        let allotted: serde_json::Value = response.json();
        assert_eq!(allotted["is_allotted"], json!(true));
        assert_eq!(allotted["allotted_number"], "KL-01-CH-4001");

        // Second attempt conflicts and leaves the stored number alone
        let response = server
            .post(&format!("/api/v1/registrations/{id}/allot"))
            .add_header("cookie", &cookie)
            .json(&json!({"allotted_number": "KL-01-CH-9999"}))
            .await;
        assert_eq!(response.status_code(), 409);

        let response = server
            .get(&format!("/api/v1/registrations/{id}"))
            .add_header("cookie", &cookie)
            .await;
        assert_eq!(response.json::<serde_json::Value>()["allotted_number"], "KL-01-CH-4001");
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_staff_cannot_allot_across_branches(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let central = create_test_branch(&pool, "Central", "CEN").await;
        let north = create_test_branch(&pool, "North", "NOR").await;
        create_test_user(&pool, "central@example.com", Role::Staff, Some(central)).await;
        create_test_user(&pool, "north@example.com", Role::Staff, Some(north)).await;

        let central_cookie = login(&server, "central@example.com").await;
        let response = server
            .post("/api/v1/registrations")
            .add_header("cookie", &central_cookie)
            .json(&json!({"application_number": "APP-2026-001"}))
            .await;
        let id = response.json::<serde_json::Value>()["id"].as_str().unwrap().to_string();

        let north_cookie = login(&server, "north@example.com").await;
        let response = server
            .post(&format!("/api/v1/registrations/{id}/allot"))
            .add_header("cookie", &north_cookie)
            .json(&json!({"allotted_number": "KL-58-XX-0001"}))
            .await;
        assert_eq!(response.status_code(), 404);
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_update_contact_details(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let branch = create_test_branch(&pool, "Central", "CEN").await;
        create_test_user(&pool, "clerk@example.com", Role::Staff, Some(branch)).await;
        let cookie = login(&server, "clerk@example.com").await;

        let response = server
            .post("/api/v1/registrations")
            .add_header("cookie", &cookie)
            .json(&json!({"application_number": "APP-2026-001", "vehicle_type": "Motor Car"}))
            .await;
        let id = response.json::<serde_json::Value>()["id"].as_str().unwrap().to_string();

        let response = server
            .put(&format!("/api/v1/registrations/{id}"))
            .add_header("cookie", &cookie)
            .json(&json!({"contact_number": "9400000000"}))
            .await;
        response.assert_status_ok();
        let updated: serde_json::Value = response.json();
        assert_eq!(updated["contact_number"], "9400000000");
        // Unset fields are preserved
        assert_eq!(updated["vehicle_type"], "Motor Car");
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_resubmitting_identical_update_changes_nothing(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let branch = create_test_branch(&pool, "Central", "CEN").await;
        create_test_user(&pool, "clerk@example.com", Role::Staff, Some(branch)).await;
        let cookie = login(&server, "clerk@example.com").await;

        let response = server
            .post("/api/v1/registrations")
            .add_header("cookie", &cookie)
            .json(&json!({"application_number": "APP-2026-001", "vehicle_type": "Motor Car"}))
            .await;
        let id = response.json::<serde_json::Value>()["id"].as_str().unwrap().to_string();

        let payload = json!({"vehicle_type": "Motor Cab", "contact_number": "9400000000"});
        let first = server
            .put(&format!("/api/v1/registrations/{id}"))
            .add_header("cookie", &cookie)
            .json(&payload)
            .await;
        first.assert_status_ok();
        let second = server
            .put(&format!("/api/v1/registrations/{id}"))
            .add_header("cookie", &cookie)
            .json(&payload)
            .await;
        second.assert_status_ok();

        // Only the write timestamp moves on a repeat submission
        let mut first: serde_json::Value = first.json();
        let mut second: serde_json::Value = second.json();
        first.as_object_mut().unwrap().remove("updated_at");
        second.as_object_mut().unwrap().remove("updated_at");
        assert_eq!(first, second);
    }
}
