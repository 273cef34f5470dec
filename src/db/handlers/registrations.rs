//! Database repository for vehicle registrations.
//!
//! Registrations track a number-allotment workflow. Allotment is guarded at
//! the statement level so a registration can only be allotted once.

use crate::db::{
    errors::{DbError, Result},
    models::registrations::{RegistrationCreateDBRequest, RegistrationDBResponse, RegistrationUpdateDBRequest},
};
use crate::types::{BranchId, RegistrationId, abbrev_uuid};
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing registrations
#[derive(Debug, Clone, Default)]
pub struct RegistrationFilter {
    /// None lists across all branches
    pub branch_id: Option<BranchId>,
    pub skip: i64,
    pub limit: i64,
}

const REGISTRATION_COLUMNS: &str = "id, application_number, vehicle_type, contact_number, is_allotted, \
     allotted_number, branch_id, created_by, created_at, updated_at";

/// Outcome of an allotment attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllotOutcome {
    Allotted,
    AlreadyAllotted,
    NotFound,
}

pub struct Registrations<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Registrations<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(application_number = %request.application_number), err)]
    pub async fn create(&mut self, request: &RegistrationCreateDBRequest) -> Result<RegistrationDBResponse> {
        let registration = sqlx::query_as::<_, RegistrationDBResponse>(&format!(
            "INSERT INTO registrations (id, application_number, vehicle_type, contact_number, branch_id, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {REGISTRATION_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&request.application_number)
        .bind(&request.vehicle_type)
        .bind(&request.contact_number)
        .bind(request.branch_id)
        .bind(request.created_by)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(registration)
    }

    #[instrument(skip(self), fields(registration_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: RegistrationId) -> Result<Option<RegistrationDBResponse>> {
        let registration = sqlx::query_as::<_, RegistrationDBResponse>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;
        Ok(registration)
    }

    #[instrument(skip(self, filter), err)]
    pub async fn list(&mut self, filter: &RegistrationFilter) -> Result<Vec<RegistrationDBResponse>> {
        let registrations = sqlx::query_as::<_, RegistrationDBResponse>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations \
             WHERE ($1::uuid IS NULL OR branch_id = $1) \
             ORDER BY created_at DESC, id DESC \
             OFFSET $2 LIMIT $3"
        ))
        .bind(filter.branch_id)
        .bind(filter.skip)
        .bind(filter.limit)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(registrations)
    }

    #[instrument(skip(self, request), fields(registration_id = %abbrev_uuid(&id)), err)]
    pub async fn update(&mut self, id: RegistrationId, request: &RegistrationUpdateDBRequest) -> Result<RegistrationDBResponse> {
        let registration = sqlx::query_as::<_, RegistrationDBResponse>(&format!(
            "UPDATE registrations SET \
                 vehicle_type = COALESCE($2, vehicle_type), \
                 contact_number = COALESCE($3, contact_number), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {REGISTRATION_COLUMNS}"
        ))
        .bind(id)
        .bind(&request.vehicle_type)
        .bind(&request.contact_number)
        .fetch_optional(&mut *self.db)
        .await?;
        registration.ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), fields(registration_id = %abbrev_uuid(&id)), err)]
    pub async fn delete(&mut self, id: RegistrationId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM registrations WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record the allotted number. The predicate makes the transition
    /// first-writer-wins: a second attempt matches zero rows and is reported
    /// as already allotted.
    #[instrument(skip(self), fields(registration_id = %abbrev_uuid(&id)), err)]
    pub async fn allot_number(&mut self, id: RegistrationId, allotted_number: &str) -> Result<AllotOutcome> {
        let result = sqlx::query(
            "UPDATE registrations SET is_allotted = TRUE, allotted_number = $2, updated_at = NOW() \
             WHERE id = $1 AND NOT is_allotted",
        )
        .bind(id)
        .bind(allotted_number)
        .execute(&mut *self.db)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(AllotOutcome::Allotted);
        }
        match self.get_by_id(id).await? {
            Some(_) => Ok(AllotOutcome::AlreadyAllotted),
            None => Ok(AllotOutcome::NotFound),
        }
    }

    /// Registrations still waiting for a number, optionally scoped to a branch.
    pub async fn count_pending(&mut self, branch_id: Option<BranchId>) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM registrations \
             WHERE NOT is_allotted AND ($1::uuid IS NULL OR branch_id = $1)",
        )
        .bind(branch_id)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(count)
    }
}
