use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        branches::{BranchCreate, BranchResponse, BranchUpdate},
        pagination::Pagination,
        users::CurrentUser,
    },
    audit::AuditEvent,
    auth::permissions,
    db::{
        handlers::{BranchFilter, Branches, Repository},
        models::branches::{BranchCreateDBRequest, BranchUpdateDBRequest},
    },
    errors::Error,
    types::{BranchId, Operation},
};

/// List branch offices
///
/// Readable by any authenticated user; form dropdowns need the branch list.
#[utoipa::path(
    get,
    path = "/branches",
    tag = "branches",
    params(Pagination),
    responses(
        (status = 200, description = "List of branches", body = Vec<BranchResponse>),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_branches(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<BranchResponse>>, Error> {
    let (skip, limit) = pagination.params();
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let branches = Branches::new(&mut conn).list(&BranchFilter::new(skip, limit)).await?;

    Ok(Json(branches.into_iter().map(BranchResponse::from).collect()))
}

/// Create a branch office
#[utoipa::path(
    post,
    path = "/branches",
    request_body = BranchCreate,
    tag = "branches",
    responses(
        (status = 201, description = "Branch created", body = BranchResponse),
        (status = 403, description = "Admin access required"),
        (status = 409, description = "Branch code already in use"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_branch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<BranchCreate>,
) -> Result<(StatusCode, Json<BranchResponse>), Error> {
    permissions::require_admin(&current_user, "branches")?;

    if request.name.trim().is_empty() || request.code.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Branch name and code are required".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let created = Branches::new(&mut conn).create(&BranchCreateDBRequest::from(request)).await?;

    state.audit.emit(
        AuditEvent::new(&current_user, Operation::Create, "branch")
            .entity_id(created.id)
            .changes(serde_json::json!({"name": created.name, "code": created.code})),
    );

    Ok((StatusCode::CREATED, Json(BranchResponse::from(created))))
}

/// Fetch one branch office
#[utoipa::path(
    get,
    path = "/branches/{id}",
    tag = "branches",
    params(("id" = String, Path, format = "uuid", description = "Branch id")),
    responses(
        (status = 200, description = "The branch", body = BranchResponse),
        (status = 404, description = "No such branch"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_branch(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<BranchId>,
) -> Result<Json<BranchResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let branch = Branches::new(&mut conn).get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "branch".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(BranchResponse::from(branch)))
}

/// Update a branch office
///
/// The branch code is immutable; operational records reference branches by id
/// but staff recognize them by code.
#[utoipa::path(
    patch,
    path = "/branches/{id}",
    request_body = BranchUpdate,
    tag = "branches",
    params(("id" = String, Path, format = "uuid", description = "Branch id")),
    responses(
        (status = 200, description = "Updated branch", body = BranchResponse),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "No such branch"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_branch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<BranchId>,
    Json(request): Json<BranchUpdate>,
) -> Result<Json<BranchResponse>, Error> {
    permissions::require_admin(&current_user, "branches")?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let updated = Branches::new(&mut conn).update(id, &BranchUpdateDBRequest::from(request)).await?;

    state.audit.emit(AuditEvent::new(&current_user, Operation::Update, "branch").entity_id(id));

    Ok(Json(BranchResponse::from(updated)))
}

/// Delete a branch office
#[utoipa::path(
    delete,
    path = "/branches/{id}",
    tag = "branches",
    params(("id" = String, Path, format = "uuid", description = "Branch id")),
    responses(
        (status = 204, description = "Branch deleted"),
        (status = 403, description = "Superadmin access required"),
        (status = 404, description = "No such branch"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_branch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<BranchId>,
) -> Result<StatusCode, Error> {
    permissions::require_superadmin(&current_user, "branches")?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if !Branches::new(&mut conn).delete(id).await? {
        return Err(Error::NotFound {
            resource: "branch".to_string(),
            id: id.to_string(),
        });
    }

    state.audit.emit(AuditEvent::new(&current_user, Operation::Delete, "branch").entity_id(id));

    Ok(StatusCode::NO_CONTENT)
}
