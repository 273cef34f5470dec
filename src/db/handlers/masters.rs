//! Database repository for master-data items.
//!
//! Master items live in a single table keyed by category, with their
//! category-specific attributes stored as a JSONB map.

use std::collections::BTreeMap;

use crate::api::models::masters::MasterCategory;
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::masters::{MasterItemCreateDBRequest, MasterItemDBResponse, MasterItemUpdateDBRequest},
};
use crate::types::{MasterItemId, abbrev_uuid};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, types::Json};
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing master items within one category
#[derive(Debug, Clone)]
pub struct MasterItemFilter {
    pub category: MasterCategory,
    pub skip: i64,
    pub limit: i64,
}

/// Raw row; the JSONB fields column needs a wrapper before it becomes a map.
#[derive(Debug, FromRow)]
struct MasterItemRow {
    id: MasterItemId,
    category: MasterCategory,
    code: String,
    fields: Json<BTreeMap<String, String>>,
    created_at: DateTime<Utc>,
}

impl From<MasterItemRow> for MasterItemDBResponse {
    fn from(row: MasterItemRow) -> Self {
        Self {
            id: row.id,
            category: row.category,
            code: row.code,
            fields: row.fields.0,
            created_at: row.created_at,
        }
    }
}

pub struct Masters<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Masters<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Every item in one category, keyed by id. Used for the bulk
    /// master-data endpoint that seeds form dropdowns.
    #[instrument(skip(self), fields(category = %category.as_str()), err)]
    pub async fn map_by_category(
        &mut self,
        category: MasterCategory,
    ) -> Result<BTreeMap<MasterItemId, MasterItemDBResponse>> {
        let rows = sqlx::query_as::<_, MasterItemRow>(
            "SELECT id, category, code, fields, created_at FROM master_items \
             WHERE category = $1 ORDER BY code ASC",
        )
        .bind(category)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| (row.id, MasterItemDBResponse::from(row)))
            .collect())
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Masters<'c> {
    type CreateRequest = MasterItemCreateDBRequest;
    type UpdateRequest = MasterItemUpdateDBRequest;
    type Response = MasterItemDBResponse;
    type Id = MasterItemId;
    type Filter = MasterItemFilter;

    #[instrument(skip(self, request), fields(category = %request.category.as_str(), code = %request.code), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let row = sqlx::query_as::<_, MasterItemRow>(
            "INSERT INTO master_items (id, category, code, fields) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, category, code, fields, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(request.category)
        .bind(&request.code)
        .bind(Json(&request.fields))
        .fetch_one(&mut *self.db)
        .await?;
        Ok(row.into())
    }

    #[instrument(skip(self), fields(item_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let row = sqlx::query_as::<_, MasterItemRow>(
            "SELECT id, category, code, fields, created_at FROM master_items WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;
        Ok(row.map(Into::into))
    }

    #[instrument(skip(self, filter), fields(category = %filter.category.as_str()), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let rows = sqlx::query_as::<_, MasterItemRow>(
            "SELECT id, category, code, fields, created_at FROM master_items \
             WHERE category = $1 ORDER BY code ASC OFFSET $2 LIMIT $3",
        )
        .bind(filter.category)
        .bind(filter.skip)
        .bind(filter.limit)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self), fields(item_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM master_items WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(item_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let row = sqlx::query_as::<_, MasterItemRow>(
            "UPDATE master_items SET \
                 code = COALESCE($2, code), \
                 fields = COALESCE($3, fields) \
             WHERE id = $1 \
             RETURNING id, category, code, fields, created_at",
        )
        .bind(id)
        .bind(&request.code)
        .bind(request.fields.as_ref().map(Json))
        .fetch_optional(&mut *self.db)
        .await?;
        row.map(Into::into).ok_or(DbError::NotFound)
    }
}
