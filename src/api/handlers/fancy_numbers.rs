use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        fancy_numbers::{AuctionResultRequest, FancyNumberCreate, FancyNumberResponse, FancyNumberUpdate},
        pagination::Pagination,
        users::CurrentUser,
    },
    audit::AuditEvent,
    auth::permissions,
    db::{
        handlers::{FancyNumberFilter, FancyNumbers, ResolveOutcome},
        models::fancy_numbers::{FancyNumberCreateDBRequest, FancyNumberUpdateDBRequest},
    },
    errors::Error,
    types::{FancyNumberId, Operation},
};

/// Record a fancy-number booking
///
/// Auction bookings start pending and await manual resolution; direct
/// bookings are confirmed immediately.
#[utoipa::path(
    post,
    path = "/fancy-numbers",
    request_body = FancyNumberCreate,
    tag = "fancy-numbers",
    responses(
        (status = 201, description = "Booking recorded", body = FancyNumberResponse),
        (status = 400, description = "Missing fancy number or no branch to attribute to"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_fancy_number(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<FancyNumberCreate>,
) -> Result<(StatusCode, Json<FancyNumberResponse>), Error> {
    if request.fancy_number.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Fancy number is required".to_string(),
        });
    }
    let branch_id = permissions::attribution_branch(&current_user, request.branch_id)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let created = FancyNumbers::new(&mut conn)
        .create(&FancyNumberCreateDBRequest::from_api(request, branch_id, current_user.id))
        .await?;

    state.audit.emit(
        AuditEvent::new(&current_user, Operation::Create, "fancy_number")
            .entity_id(created.id)
            .branch(branch_id)
            .changes(serde_json::json!({"fancy_number": created.fancy_number, "status": created.status})),
    );

    Ok((StatusCode::CREATED, Json(FancyNumberResponse::from(created))))
}

/// List bookings, newest first (staff see their own branch)
#[utoipa::path(
    get,
    path = "/fancy-numbers",
    tag = "fancy-numbers",
    params(Pagination),
    responses(
        (status = 200, description = "Bookings visible to the caller", body = Vec<FancyNumberResponse>),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_fancy_numbers(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<FancyNumberResponse>>, Error> {
    let branch_id = permissions::branch_scope(&current_user)?;
    let (skip, limit) = pagination.params();

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let bookings = FancyNumbers::new(&mut conn)
        .list(&FancyNumberFilter { branch_id, skip, limit })
        .await?;

    Ok(Json(bookings.into_iter().map(FancyNumberResponse::from).collect()))
}

/// Fetch one booking
#[utoipa::path(
    get,
    path = "/fancy-numbers/{id}",
    tag = "fancy-numbers",
    params(("id" = String, Path, format = "uuid", description = "Booking id")),
    responses(
        (status = 200, description = "The booking", body = FancyNumberResponse),
        (status = 404, description = "Booking not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_fancy_number(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<FancyNumberId>,
) -> Result<Json<FancyNumberResponse>, Error> {
    let branch_id = permissions::branch_scope(&current_user)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let booking = FancyNumbers::new(&mut conn)
        .get_by_id(id)
        .await?
        .filter(|f| branch_id.is_none_or(|b| f.branch_id == b))
        .ok_or_else(|| Error::NotFound {
            resource: "fancy number booking".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(FancyNumberResponse::from(booking)))
}

/// Update contact details on a booking
#[utoipa::path(
    put,
    path = "/fancy-numbers/{id}",
    request_body = FancyNumberUpdate,
    tag = "fancy-numbers",
    params(("id" = String, Path, format = "uuid", description = "Booking id")),
    responses(
        (status = 200, description = "Updated booking", body = FancyNumberResponse),
        (status = 404, description = "Booking not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_fancy_number(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<FancyNumberId>,
    Json(request): Json<FancyNumberUpdate>,
) -> Result<Json<FancyNumberResponse>, Error> {
    let branch_id = permissions::branch_scope(&current_user)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut bookings = FancyNumbers::new(&mut conn);

    let visible = bookings
        .get_by_id(id)
        .await?
        .filter(|f| branch_id.is_none_or(|b| f.branch_id == b));
    if visible.is_none() {
        return Err(Error::NotFound {
            resource: "fancy number booking".to_string(),
            id: id.to_string(),
        });
    }

    let updated = bookings.update(id, &FancyNumberUpdateDBRequest::from(request)).await?;

    state
        .audit
        .emit(AuditEvent::new(&current_user, Operation::Update, "fancy_number").entity_id(id));

    Ok(Json(FancyNumberResponse::from(updated)))
}

/// Record the auction result (one-shot)
///
/// Only pending auction bookings can be resolved; the status moves to
/// allotted or not_allotted and never changes again.
#[utoipa::path(
    post,
    path = "/fancy-numbers/{id}/result",
    request_body = AuctionResultRequest,
    tag = "fancy-numbers",
    params(("id" = String, Path, format = "uuid", description = "Booking id")),
    responses(
        (status = 200, description = "Auction resolved", body = FancyNumberResponse),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Booking is not pending"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn record_auction_result(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<FancyNumberId>,
    Json(request): Json<AuctionResultRequest>,
) -> Result<Json<FancyNumberResponse>, Error> {
    let branch_id = permissions::branch_scope(&current_user)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut bookings = FancyNumbers::new(&mut conn);

    let visible = bookings
        .get_by_id(id)
        .await?
        .filter(|f| branch_id.is_none_or(|b| f.branch_id == b));
    if visible.is_none() {
        return Err(Error::NotFound {
            resource: "fancy number booking".to_string(),
            id: id.to_string(),
        });
    }

    let status = request.result.into();
    match bookings.resolve_auction(id, status).await? {
        ResolveOutcome::Resolved => {}
        ResolveOutcome::NotPending => {
            return Err(Error::Conflict {
                message: "This booking has already been resolved".to_string(),
            });
        }
        ResolveOutcome::NotFound => {
            return Err(Error::NotFound {
                resource: "fancy number booking".to_string(),
                id: id.to_string(),
            });
        }
    }

    let updated = bookings.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "fancy number booking".to_string(),
        id: id.to_string(),
    })?;

    state.audit.emit(
        AuditEvent::new(&current_user, Operation::Update, "fancy_number")
            .entity_id(id)
            .changes(serde_json::json!({"status": status})),
    );

    Ok(Json(FancyNumberResponse::from(updated)))
}

/// Delete a booking (admin only)
#[utoipa::path(
    delete,
    path = "/fancy-numbers/{id}",
    tag = "fancy-numbers",
    params(("id" = String, Path, format = "uuid", description = "Booking id")),
    responses(
        (status = 204, description = "Booking deleted"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Booking not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_fancy_number(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<FancyNumberId>,
) -> Result<StatusCode, Error> {
    permissions::require_admin(&current_user, "fancy numbers")?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if !FancyNumbers::new(&mut conn).delete(id).await? {
        return Err(Error::NotFound {
            resource: "fancy number booking".to_string(),
            id: id.to_string(),
        });
    }

    state
        .audit
        .emit(AuditEvent::new(&current_user, Operation::Delete, "fancy_number").entity_id(id));

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::api::models::users::Role;
    use crate::test_utils::{create_test_app, create_test_branch, create_test_user, login};
    use serde_json::json;
    use sqlx::PgPool;

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_auction_booking_resolves_once(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let branch = create_test_branch(&pool, "Central", "CEN").await;
        create_test_user(&pool, "clerk@example.com", Role::Staff, Some(branch)).await;
        let cookie = login(&server, "clerk@example.com").await;

        let response = server
            .post("/api/v1/fancy-numbers")
            .add_header("cookie", &cookie)
            .json(&json!({"fancy_number": "KL-01-A-1", "is_for_auction": true}))
            .await;
        assert_eq!(response.status_code(), 201);
        let created: serde_json::Value = response.json();
        assert_eq!(created["status"], "pending");
        let id = created["id"].as_str().unwrap().to_string();

        let response = server
            .post(&format!("/api/v1/fancy-numbers/{id}/result"))
            .add_header("cookie", &cookie)
            .json(&json!({"result": "allotted"}))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<serde_json::Value>()["status"], "allotted");

        // Resolution is terminal
        let response = server
            .post(&format!("/api/v1/fancy-numbers/{id}/result"))
            .add_header("cookie", &cookie)
            .json(&json!({"result": "not_allotted"}))
            .await;
        assert_eq!(response.status_code(), 409);

        let response = server
            .get(&format!("/api/v1/fancy-numbers/{id}"))
            .add_header("cookie", &cookie)
            .await;
        assert_eq!(response.json::<serde_json::Value>()["status"], "allotted");
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_direct_booking_is_confirmed_and_unresolvable(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let branch = create_test_branch(&pool, "Central", "CEN").await;
        create_test_user(&pool, "clerk@example.com", Role::Staff, Some(branch)).await;
        let cookie = login(&server, "clerk@example.com").await;

        let response = server
            .post("/api/v1/fancy-numbers")
            .add_header("cookie", &cookie)
            .json(&json!({"fancy_number": "KL-01-B-7777"}))
            .await;
        let created: serde_json::Value = response.json();
        assert_eq!(created["status"], "confirmed");
        let id = created["id"].as_str().unwrap().to_string();

        let response = server
            .post(&format!("/api/v1/fancy-numbers/{id}/result"))
            .add_header("cookie", &cookie)
            .json(&json!({"result": "allotted"}))
            .await;
        assert_eq!(response.status_code(), 409);
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_branch_scoped_listing(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let central = create_test_branch(&pool, "Central", "CEN").await;
        let north = create_test_branch(&pool, "North", "NOR").await;
        create_test_user(&pool, "central@example.com", Role::Staff, Some(central)).await;
        create_test_user(&pool, "north@example.com", Role::Staff, Some(north)).await;

        let central_cookie = login(&server, "central@example.com").await;
        let north_cookie = login(&server, "north@example.com").await;

        server
            .post("/api/v1/fancy-numbers")
            .add_header("cookie", &central_cookie)
            .json(&json!({"fancy_number": "KL-01-A-1"}))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
        server
            .post("/api/v1/fancy-numbers")
            .add_header("cookie", &north_cookie)
            .json(&json!({"fancy_number": "KL-58-B-2"}))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let response = server
            .get("/api/v1/fancy-numbers")
            .add_header("cookie", &central_cookie)
            .await;
        let listed: Vec<serde_json::Value> = response.json();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["fancy_number"], "KL-01-A-1");
    }
}
