//! Database models for users.

use crate::api::models::users::{Role, UserCreate, UserUpdate};
use crate::types::{BranchId, UserId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database request for creating a new user
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub branch_id: Option<BranchId>,
    pub password_hash: String,
}

impl UserCreateDBRequest {
    /// Build from the API request plus the already-computed password hash.
    pub fn from_api(api: UserCreate, password_hash: String) -> Self {
        Self {
            email: api.email,
            display_name: api.display_name,
            role: api.role,
            branch_id: api.branch_id,
            password_hash,
        }
    }
}

/// Database request for updating a user
#[derive(Debug, Clone, Default)]
pub struct UserUpdateDBRequest {
    pub display_name: Option<String>,
    pub role: Option<Role>,
    /// Outer None leaves the branch unchanged, Some(None) clears it
    pub branch_id: Option<Option<BranchId>>,
    pub password_hash: Option<String>,
}

impl From<UserUpdate> for UserUpdateDBRequest {
    fn from(update: UserUpdate) -> Self {
        Self {
            display_name: update.display_name,
            role: update.role,
            branch_id: update.branch_id,
            password_hash: None, // Regular updates don't include password changes
        }
    }
}

/// Database response for a user
#[derive(Debug, Clone, FromRow)]
pub struct UserDBResponse {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub branch_id: Option<BranchId>,
    /// Resolved from the branches table; None when unassigned or dangling
    pub branch_name: Option<String>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}
