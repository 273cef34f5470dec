use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        cash_register::{CashEntryCreate, CashEntryResponse, CashEntrySaveResponse, ListCashEntriesQuery},
        users::CurrentUser,
    },
    audit::AuditEvent,
    auth::permissions,
    db::{handlers::{CashEntryFilter, CashRegister}, models::cash_register::CashEntryCreateDBRequest},
    errors::Error,
    types::{CashEntryId, Operation},
};

/// Record a cash-register entry
///
/// When the entry has a positive cash amount and an application with the
/// same vehicle number exists in the entry's branch, the newest such
/// application's advance is credited in the same transaction. The response
/// reports which application (if any) was credited.
#[utoipa::path(
    post,
    path = "/cash-register",
    request_body = CashEntryCreate,
    tag = "cash-register",
    responses(
        (status = 201, description = "Entry recorded", body = CashEntrySaveResponse),
        (status = 400, description = "Missing vehicle number or no branch to attribute to"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_cash_entry(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<CashEntryCreate>,
) -> Result<(StatusCode, Json<CashEntrySaveResponse>), Error> {
    if request.vehicle_number.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Vehicle number is required".to_string(),
        });
    }
    let branch_id = permissions::attribution_branch(&current_user, request.branch_id)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let saved = CashRegister::new(&mut conn)
        .save(&CashEntryCreateDBRequest::from_api(request, branch_id, current_user.id))
        .await?;

    state.audit.emit(
        AuditEvent::new(&current_user, Operation::Create, "cash_entry")
            .entity_id(saved.entry.id)
            .branch(branch_id)
            .changes(serde_json::json!({
                "vehicle_number": saved.entry.vehicle_number,
                "cash_received": saved.entry.cash_received,
                "credited_application_id": saved.credited_application_id,
            })),
    );

    Ok((
        StatusCode::CREATED,
        Json(CashEntrySaveResponse {
            entry: CashEntryResponse::from(saved.entry),
            credited_application_id: saved.credited_application_id,
        }),
    ))
}

/// List cash entries, newest first (staff see their own branch)
#[utoipa::path(
    get,
    path = "/cash-register",
    tag = "cash-register",
    params(ListCashEntriesQuery),
    responses(
        (status = 200, description = "Entries visible to the caller", body = Vec<CashEntryResponse>),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_cash_entries(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListCashEntriesQuery>,
) -> Result<Json<Vec<CashEntryResponse>>, Error> {
    let branch_id = permissions::branch_scope(&current_user)?;
    let (skip, limit) = query.pagination.params();

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let entries = CashRegister::new(&mut conn)
        .list(&CashEntryFilter {
            branch_id,
            entry_date: query.entry_date,
            skip,
            limit,
        })
        .await?;

    Ok(Json(entries.into_iter().map(CashEntryResponse::from).collect()))
}

/// Fetch one cash entry
#[utoipa::path(
    get,
    path = "/cash-register/{id}",
    tag = "cash-register",
    params(("id" = String, Path, format = "uuid", description = "Entry id")),
    responses(
        (status = 200, description = "The entry", body = CashEntryResponse),
        (status = 404, description = "Entry not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_cash_entry(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<CashEntryId>,
) -> Result<Json<CashEntryResponse>, Error> {
    let branch_id = permissions::branch_scope(&current_user)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let entry = CashRegister::new(&mut conn)
        .get_by_id(id)
        .await?
        .filter(|e| branch_id.is_none_or(|b| e.branch_id == b))
        .ok_or_else(|| Error::NotFound {
            resource: "cash entry".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(CashEntryResponse::from(entry)))
}

/// Delete a cash entry (admin only)
///
/// Any advance already credited to an application stays in place.
#[utoipa::path(
    delete,
    path = "/cash-register/{id}",
    tag = "cash-register",
    params(("id" = String, Path, format = "uuid", description = "Entry id")),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Entry not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_cash_entry(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<CashEntryId>,
) -> Result<StatusCode, Error> {
    permissions::require_admin(&current_user, "cash register")?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if !CashRegister::new(&mut conn).delete(id).await? {
        return Err(Error::NotFound {
            resource: "cash entry".to_string(),
            id: id.to_string(),
        });
    }

    state
        .audit
        .emit(AuditEvent::new(&current_user, Operation::Delete, "cash_entry").entity_id(id));

    Ok(StatusCode::NO_CONTENT)
}
