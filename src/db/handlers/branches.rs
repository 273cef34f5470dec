//! Database repository for branch offices.

use crate::types::{BranchId, abbrev_uuid};
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::branches::{BranchCreateDBRequest, BranchDBResponse, BranchUpdateDBRequest},
};
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing branches
#[derive(Debug, Clone, Default)]
pub struct BranchFilter {
    pub skip: i64,
    pub limit: i64,
}

impl BranchFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit }
    }
}

pub struct Branches<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Branches<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Count all branches (dashboard totals).
    pub async fn count(&mut self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM branches")
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Branches<'c> {
    type CreateRequest = BranchCreateDBRequest;
    type UpdateRequest = BranchUpdateDBRequest;
    type Response = BranchDBResponse;
    type Id = BranchId;
    type Filter = BranchFilter;

    #[instrument(skip(self, request), fields(code = %request.code), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let branch = sqlx::query_as::<_, BranchDBResponse>(
            "INSERT INTO branches (id, name, code, address) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, name, code, address, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(&request.code)
        .bind(&request.address)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(branch)
    }

    #[instrument(skip(self), fields(branch_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let branch = sqlx::query_as::<_, BranchDBResponse>(
            "SELECT id, name, code, address, created_at FROM branches WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;
        Ok(branch)
    }

    #[instrument(skip(self), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let branches = sqlx::query_as::<_, BranchDBResponse>(
            "SELECT id, name, code, address, created_at FROM branches \
             ORDER BY name ASC OFFSET $1 LIMIT $2",
        )
        .bind(filter.skip)
        .bind(filter.limit)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(branches)
    }

    #[instrument(skip(self), fields(branch_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM branches WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(branch_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let branch = sqlx::query_as::<_, BranchDBResponse>(
            "UPDATE branches SET \
                 name = COALESCE($2, name), \
                 address = COALESCE($3, address) \
             WHERE id = $1 \
             RETURNING id, name, code, address, created_at",
        )
        .bind(id)
        .bind(&request.name)
        .bind(&request.address)
        .fetch_optional(&mut *self.db)
        .await?;
        branch.ok_or(DbError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    fn create_request(name: &str, code: &str) -> BranchCreateDBRequest {
        BranchCreateDBRequest {
            name: name.to_string(),
            code: code.to_string(),
            address: Some("1 Main Road".to_string()),
        }
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_create_and_list_branches(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut branches = Branches::new(&mut conn);

        branches.create(&create_request("North Office", "NOR")).await.unwrap();
        branches.create(&create_request("Central Office", "CEN")).await.unwrap();

        let listed = branches.list(&BranchFilter::new(0, 50)).await.unwrap();
        assert_eq!(listed.len(), 2);
        // Listing is alphabetical
        assert_eq!(listed[0].name, "Central Office");
        assert_eq!(listed[1].name, "North Office");
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_duplicate_code_rejected(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut branches = Branches::new(&mut conn);

        branches.create(&create_request("North Office", "NOR")).await.unwrap();
        let err = branches.create(&create_request("Other Office", "NOR")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_update_keeps_code(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut branches = Branches::new(&mut conn);

        let created = branches.create(&create_request("North Office", "NOR")).await.unwrap();
        let updated = branches
            .update(
                created.id,
                &BranchUpdateDBRequest {
                    name: Some("North Regional Office".to_string()),
                    address: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "North Regional Office");
        assert_eq!(updated.code, "NOR");
        assert_eq!(updated.address.as_deref(), Some("1 Main Road"));
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_update_missing_branch(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut branches = Branches::new(&mut conn);

        let err = branches
            .update(Uuid::new_v4(), &BranchUpdateDBRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }
}
