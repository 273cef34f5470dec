use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::users::{CurrentUser, ListUsersQuery, Role, UserCreate, UserResponse, UserUpdate},
    audit::AuditEvent,
    auth::{password, permissions},
    db::{
        handlers::{Repository, UserFilter, Users},
        models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    },
    errors::Error,
    types::{Operation, UserId},
};

/// List user accounts
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "List of users", body = Vec<UserResponse>),
        (status = 403, description = "Admin access required"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<UserResponse>>, Error> {
    permissions::require_admin(&current_user, "users")?;

    let (skip, limit) = query.pagination.params();
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let users = Users::new(&mut conn).list(&UserFilter::new(skip, limit)).await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Create a user account
#[utoipa::path(
    post,
    path = "/users",
    request_body = UserCreate,
    tag = "users",
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Admin access required"),
        (status = 409, description = "Email already in use"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<UserCreate>,
) -> Result<(StatusCode, Json<UserResponse>), Error> {
    permissions::require_admin(&current_user, "users")?;

    // Only superadmins may mint other admins
    if request.role != Role::Staff {
        permissions::require_superadmin(&current_user, "users")?;
    }

    let password_config = &state.config.auth.password;
    if request.password.len() < password_config.min_length {
        return Err(Error::BadRequest {
            message: format!("Password must be at least {} characters", password_config.min_length),
        });
    }
    if request.password.len() > password_config.max_length {
        return Err(Error::BadRequest {
            message: format!("Password must be no more than {} characters", password_config.max_length),
        });
    }

    let params = password::Argon2Params::from(password_config);
    let raw_password = request.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || password::hash_string_with_params(&raw_password, Some(params)))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let created = Users::new(&mut conn)
        .create(&UserCreateDBRequest::from_api(request, password_hash))
        .await?;

    state.audit.emit(
        AuditEvent::new(&current_user, Operation::Create, "user")
            .entity_id(created.id)
            .changes(serde_json::json!({"email": created.email, "role": created.role})),
    );

    Ok((StatusCode::CREATED, Json(UserResponse::from(created))))
}

/// Fetch one user account
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = String, Path, format = "uuid", description = "User id")),
    responses(
        (status = 200, description = "The user", body = UserResponse),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "No such user"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<UserId>,
) -> Result<Json<UserResponse>, Error> {
    permissions::require_admin(&current_user, "users")?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let user = Users::new(&mut conn).get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "user".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(UserResponse::from(user)))
}

/// Update a user account
#[utoipa::path(
    patch,
    path = "/users/{id}",
    request_body = UserUpdate,
    tag = "users",
    params(("id" = String, Path, format = "uuid", description = "User id")),
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "No such user"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<UserId>,
    Json(request): Json<UserUpdate>,
) -> Result<Json<UserResponse>, Error> {
    permissions::require_admin(&current_user, "users")?;

    // Role changes are a superadmin action
    if request.role.is_some() {
        permissions::require_superadmin(&current_user, "users")?;
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let updated = Users::new(&mut conn).update(id, &UserUpdateDBRequest::from(request)).await?;

    state.audit.emit(AuditEvent::new(&current_user, Operation::Update, "user").entity_id(id));

    Ok(Json(UserResponse::from(updated)))
}

/// Delete a user account
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    params(("id" = String, Path, format = "uuid", description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Cannot delete own account"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "No such user"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<UserId>,
) -> Result<StatusCode, Error> {
    permissions::require_admin(&current_user, "users")?;

    if id == current_user.id {
        return Err(Error::BadRequest {
            message: "Cannot delete your own account".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if !Users::new(&mut conn).delete(id).await? {
        return Err(Error::NotFound {
            resource: "user".to_string(),
            id: id.to_string(),
        });
    }

    state.audit.emit(AuditEvent::new(&current_user, Operation::Delete, "user").entity_id(id));

    Ok(StatusCode::NO_CONTENT)
}
