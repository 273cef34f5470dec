//! Database repository for users.

use crate::types::{UserId, abbrev_uuid};
use crate::{
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
    },
};
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing users
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub skip: i64,
    pub limit: i64,
}

impl UserFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit }
    }
}

/// Shared select list; branch names are resolved through a left join so
/// dangling branch references surface as NULL rather than an error.
const USER_SELECT: &str = "SELECT u.id, u.email, u.display_name, u.role, u.branch_id, b.name AS branch_name, \
     u.password_hash, u.created_at, u.updated_at, u.last_login \
     FROM users u LEFT JOIN branches b ON u.branch_id = b.id";

pub struct Users<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Fetch a user by email (for login).
    #[instrument(skip(self), fields(email = %email), err)]
    pub async fn get_by_email(&mut self, email: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, UserDBResponse>(&format!("{USER_SELECT} WHERE u.email = $1"))
            .bind(email)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(user)
    }

    /// Stamp the last-login timestamp.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    pub async fn touch_last_login(&mut self, id: UserId) -> Result<()> {
        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(())
    }

    /// Count all users (dashboard totals).
    pub async fn count(&mut self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type CreateRequest = UserCreateDBRequest;
    type UpdateRequest = UserUpdateDBRequest;
    type Response = UserDBResponse;
    type Id = UserId;
    type Filter = UserFilter;

    #[instrument(skip(self, request), fields(email = %request.email), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let user_id = Uuid::new_v4();

        sqlx::query(
            "INSERT INTO users (id, email, display_name, role, branch_id, password_hash) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user_id)
        .bind(&request.email)
        .bind(&request.display_name)
        .bind(request.role)
        .bind(request.branch_id)
        .bind(&request.password_hash)
        .execute(&mut *self.db)
        .await?;

        // Re-select to resolve the branch name
        self.get_by_id(user_id).await?.ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let user = sqlx::query_as::<_, UserDBResponse>(&format!("{USER_SELECT} WHERE u.id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(user)
    }

    #[instrument(skip(self), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let users = sqlx::query_as::<_, UserDBResponse>(&format!("{USER_SELECT} ORDER BY u.created_at DESC OFFSET $1 LIMIT $2"))
            .bind(filter.skip)
            .bind(filter.limit)
            .fetch_all(&mut *self.db)
            .await?;
        Ok(users)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let set_branch = request.branch_id.is_some();
        let branch_value = request.branch_id.clone().flatten();

        let result = sqlx::query(
            "UPDATE users SET \
                 display_name = COALESCE($2, display_name), \
                 role = COALESCE($3, role), \
                 branch_id = CASE WHEN $4 THEN $5 ELSE branch_id END, \
                 password_hash = COALESCE($6, password_hash), \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&request.display_name)
        .bind(request.role)
        .bind(set_branch)
        .bind(branch_value)
        .bind(&request.password_hash)
        .execute(&mut *self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        self.get_by_id(id).await?.ok_or(DbError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use sqlx::PgPool;

    fn create_request(email: &str, role: Role) -> UserCreateDBRequest {
        UserCreateDBRequest {
            email: email.to_string(),
            display_name: "Test User".to_string(),
            role,
            branch_id: None,
            password_hash: "not-a-real-hash".to_string(),
        }
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_create_and_fetch_user(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);

        let created = users.create(&create_request("staff@example.com", Role::Staff)).await.unwrap();
        assert_eq!(created.email, "staff@example.com");
        assert_eq!(created.role, Role::Staff);
        assert_eq!(created.branch_name, None);
        assert!(created.last_login.is_none());

        let by_email = users.get_by_email("staff@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_duplicate_email_rejected(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);

        users.create(&create_request("dupe@example.com", Role::Staff)).await.unwrap();
        let err = users.create(&create_request("dupe@example.com", Role::Admin)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_update_preserves_unset_fields(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);

        let created = users.create(&create_request("keep@example.com", Role::Staff)).await.unwrap();

        let updated = users
            .update(
                created.id,
                &UserUpdateDBRequest {
                    display_name: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.display_name, "Renamed");
        assert_eq!(updated.role, Role::Staff);
        assert_eq!(updated.email, "keep@example.com");
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_branch_clear_with_explicit_null(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();

        let branch_id = Uuid::new_v4();
        sqlx::query("INSERT INTO branches (id, name, code) VALUES ($1, 'Central', 'CEN')")
            .bind(branch_id)
            .execute(&mut *conn)
            .await
            .unwrap();

        let mut users = Users::new(&mut conn);
        let mut request = create_request("branchy@example.com", Role::Staff);
        request.branch_id = Some(branch_id);
        let created = users.create(&request).await.unwrap();
        assert_eq!(created.branch_name.as_deref(), Some("Central"));

        // Outer None leaves the branch alone
        let untouched = users.update(created.id, &UserUpdateDBRequest::default()).await.unwrap();
        assert_eq!(untouched.branch_id, Some(branch_id));

        // Some(None) clears it
        let cleared = users
            .update(
                created.id,
                &UserUpdateDBRequest {
                    branch_id: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.branch_id, None);
        assert_eq!(cleared.branch_name, None);
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_delete_user(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);

        let created = users.create(&create_request("gone@example.com", Role::Staff)).await.unwrap();
        assert!(users.delete(created.id).await.unwrap());
        assert!(users.get_by_id(created.id).await.unwrap().is_none());
        assert!(!users.delete(created.id).await.unwrap());
    }
}
