use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::warn;

use crate::{
    AppState,
    api::models::{
        masters::{CategoryDescriptorResponse, MasterCategory, MasterItemCreate, MasterItemResponse, MasterItemUpdate},
        pagination::Pagination,
        users::CurrentUser,
    },
    audit::AuditEvent,
    auth::permissions,
    db::{
        handlers::{MasterItemFilter, Masters, Repository},
        models::masters::{MasterItemCreateDBRequest, MasterItemUpdateDBRequest},
    },
    errors::Error,
    types::{MasterItemId, Operation},
};

/// All master data in one shot, keyed by category then item id.
///
/// Record forms resolve their dropdowns from this payload. A category that
/// fails to load degrades to an empty map so one bad category does not blank
/// every form.
#[utoipa::path(
    get,
    path = "/masters",
    tag = "masters",
    responses(
        (status = 200, description = "Master data keyed by category and item id"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_all_masters(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> Result<Json<BTreeMap<&'static str, BTreeMap<MasterItemId, MasterItemResponse>>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut masters = Masters::new(&mut conn);

    let mut all = BTreeMap::new();
    for category in MasterCategory::ALL {
        let items = match masters.map_by_category(category).await {
            Ok(items) => items.into_iter().map(|(id, item)| (id, MasterItemResponse::from(item))).collect(),
            Err(e) => {
                warn!(category = category.as_str(), error = %e, "Failed to load master category");
                BTreeMap::new()
            }
        };
        all.insert(category.as_str(), items);
    }

    Ok(Json(all))
}

/// The category schemas the admin UI renders forms from
#[utoipa::path(
    get,
    path = "/masters/categories",
    tag = "masters",
    responses(
        (status = 200, description = "Descriptors for all seven categories", body = Vec<CategoryDescriptorResponse>),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_categories(_current_user: CurrentUser) -> Json<Vec<CategoryDescriptorResponse>> {
    let descriptors = MasterCategory::ALL
        .into_iter()
        .map(|category| {
            let descriptor = category.descriptor();
            CategoryDescriptorResponse {
                category,
                label: descriptor.label,
                fields: descriptor.fields,
            }
        })
        .collect();
    Json(descriptors)
}

/// List items in one category
#[utoipa::path(
    get,
    path = "/masters/{category}",
    tag = "masters",
    params(
        ("category" = MasterCategory, Path, description = "Master category"),
        Pagination,
    ),
    responses(
        (status = 200, description = "Items in the category", body = Vec<MasterItemResponse>),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_items(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(category): Path<MasterCategory>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<MasterItemResponse>>, Error> {
    let (skip, limit) = pagination.params();
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let items = Masters::new(&mut conn)
        .list(&MasterItemFilter { category, skip, limit })
        .await?;

    Ok(Json(items.into_iter().map(MasterItemResponse::from).collect()))
}

/// Create an item in one category
#[utoipa::path(
    post,
    path = "/masters/{category}",
    request_body = MasterItemCreate,
    tag = "masters",
    params(("category" = MasterCategory, Path, description = "Master category")),
    responses(
        (status = 201, description = "Item created", body = MasterItemResponse),
        (status = 400, description = "Fields do not match the category schema"),
        (status = 403, description = "Admin access required"),
        (status = 409, description = "Code already in use within the category"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(category): Path<MasterCategory>,
    Json(request): Json<MasterItemCreate>,
) -> Result<(StatusCode, Json<MasterItemResponse>), Error> {
    permissions::require_admin(&current_user, "masters")?;

    if request.code.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Item code is required".to_string(),
        });
    }
    category.descriptor().validate(&request.fields)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let created = Masters::new(&mut conn)
        .create(&MasterItemCreateDBRequest::from_api(category, request))
        .await?;

    state.audit.emit(
        AuditEvent::new(&current_user, Operation::Create, "master_item")
            .entity_id(created.id)
            .changes(serde_json::json!({"category": category.as_str(), "code": created.code})),
    );

    Ok((StatusCode::CREATED, Json(MasterItemResponse::from(created))))
}

/// Update an item
#[utoipa::path(
    patch,
    path = "/masters/{category}/{id}",
    request_body = MasterItemUpdate,
    tag = "masters",
    params(
        ("category" = MasterCategory, Path, description = "Master category"),
        ("id" = String, Path, format = "uuid", description = "Item id"),
    ),
    responses(
        (status = 200, description = "Updated item", body = MasterItemResponse),
        (status = 400, description = "Fields do not match the category schema"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "No such item in this category"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((category, id)): Path<(MasterCategory, MasterItemId)>,
    Json(request): Json<MasterItemUpdate>,
) -> Result<Json<MasterItemResponse>, Error> {
    permissions::require_admin(&current_user, "masters")?;

    if let Some(fields) = &request.fields {
        category.descriptor().validate(fields)?;
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut masters = Masters::new(&mut conn);

    // The path category must match the stored one
    let existing = masters.get_by_id(id).await?.filter(|item| item.category == category);
    if existing.is_none() {
        return Err(Error::NotFound {
            resource: "master item".to_string(),
            id: id.to_string(),
        });
    }

    let updated = masters.update(id, &MasterItemUpdateDBRequest::from(request)).await?;

    state.audit.emit(
        AuditEvent::new(&current_user, Operation::Update, "master_item")
            .entity_id(id)
            .changes(serde_json::json!({"category": category.as_str()})),
    );

    Ok(Json(MasterItemResponse::from(updated)))
}

/// Delete an item
#[utoipa::path(
    delete,
    path = "/masters/{category}/{id}",
    tag = "masters",
    params(
        ("category" = MasterCategory, Path, description = "Master category"),
        ("id" = String, Path, format = "uuid", description = "Item id"),
    ),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "No such item in this category"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((category, id)): Path<(MasterCategory, MasterItemId)>,
) -> Result<StatusCode, Error> {
    permissions::require_admin(&current_user, "masters")?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut masters = Masters::new(&mut conn);

    let existing = masters.get_by_id(id).await?.filter(|item| item.category == category);
    if existing.is_none() {
        return Err(Error::NotFound {
            resource: "master item".to_string(),
            id: id.to_string(),
        });
    }
    masters.delete(id).await?;

    state.audit.emit(
        AuditEvent::new(&current_user, Operation::Delete, "master_item")
            .entity_id(id)
            .changes(serde_json::json!({"category": category.as_str()})),
    );

    Ok(StatusCode::NO_CONTENT)
}
