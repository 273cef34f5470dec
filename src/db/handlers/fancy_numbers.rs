//! Database repository for fancy-number bookings.
//!
//! Auction outcomes are a one-way transition from pending. The status
//! predicate lives in the UPDATE itself so two concurrent resolutions
//! cannot both succeed.

use crate::api::models::fancy_numbers::FancyNumberStatus;
use crate::db::{
    errors::{DbError, Result},
    models::fancy_numbers::{FancyNumberCreateDBRequest, FancyNumberDBResponse, FancyNumberUpdateDBRequest},
};
use crate::types::{BranchId, FancyNumberId, abbrev_uuid};
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing fancy-number bookings
#[derive(Debug, Clone, Default)]
pub struct FancyNumberFilter {
    /// None lists across all branches
    pub branch_id: Option<BranchId>,
    pub skip: i64,
    pub limit: i64,
}

const FANCY_NUMBER_COLUMNS: &str = "id, fancy_number, is_for_auction, application_number, temp_expiry_date, \
     contact_number, contact_person, remarks, status, branch_id, created_by, created_at, updated_at";

/// Outcome of an auction resolution attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    Resolved,
    NotPending,
    NotFound,
}

pub struct FancyNumbers<'c> {
    db: &'c mut PgConnection,
}

impl<'c> FancyNumbers<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(fancy_number = %request.fancy_number), err)]
    pub async fn create(&mut self, request: &FancyNumberCreateDBRequest) -> Result<FancyNumberDBResponse> {
        let booking = sqlx::query_as::<_, FancyNumberDBResponse>(&format!(
            "INSERT INTO fancy_numbers (id, fancy_number, is_for_auction, application_number, \
                 temp_expiry_date, contact_number, contact_person, remarks, status, branch_id, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {FANCY_NUMBER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&request.fancy_number)
        .bind(request.is_for_auction)
        .bind(&request.application_number)
        .bind(request.temp_expiry_date)
        .bind(&request.contact_number)
        .bind(&request.contact_person)
        .bind(&request.remarks)
        .bind(request.status)
        .bind(request.branch_id)
        .bind(request.created_by)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(booking)
    }

    #[instrument(skip(self), fields(booking_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: FancyNumberId) -> Result<Option<FancyNumberDBResponse>> {
        let booking = sqlx::query_as::<_, FancyNumberDBResponse>(&format!(
            "SELECT {FANCY_NUMBER_COLUMNS} FROM fancy_numbers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;
        Ok(booking)
    }

    #[instrument(skip(self, filter), err)]
    pub async fn list(&mut self, filter: &FancyNumberFilter) -> Result<Vec<FancyNumberDBResponse>> {
        let bookings = sqlx::query_as::<_, FancyNumberDBResponse>(&format!(
            "SELECT {FANCY_NUMBER_COLUMNS} FROM fancy_numbers \
             WHERE ($1::uuid IS NULL OR branch_id = $1) \
             ORDER BY created_at DESC, id DESC \
             OFFSET $2 LIMIT $3"
        ))
        .bind(filter.branch_id)
        .bind(filter.skip)
        .bind(filter.limit)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(bookings)
    }

    #[instrument(skip(self, request), fields(booking_id = %abbrev_uuid(&id)), err)]
    pub async fn update(&mut self, id: FancyNumberId, request: &FancyNumberUpdateDBRequest) -> Result<FancyNumberDBResponse> {
        let booking = sqlx::query_as::<_, FancyNumberDBResponse>(&format!(
            "UPDATE fancy_numbers SET \
                 application_number = COALESCE($2, application_number), \
                 temp_expiry_date = COALESCE($3, temp_expiry_date), \
                 contact_number = COALESCE($4, contact_number), \
                 contact_person = COALESCE($5, contact_person), \
                 remarks = COALESCE($6, remarks), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {FANCY_NUMBER_COLUMNS}"
        ))
        .bind(id)
        .bind(&request.application_number)
        .bind(request.temp_expiry_date)
        .bind(&request.contact_number)
        .bind(&request.contact_person)
        .bind(&request.remarks)
        .fetch_optional(&mut *self.db)
        .await?;
        booking.ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), fields(booking_id = %abbrev_uuid(&id)), err)]
    pub async fn delete(&mut self, id: FancyNumberId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM fancy_numbers WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record the auction outcome for a pending booking.
    #[instrument(skip(self), fields(booking_id = %abbrev_uuid(&id), status = ?status), err)]
    pub async fn resolve_auction(&mut self, id: FancyNumberId, status: FancyNumberStatus) -> Result<ResolveOutcome> {
        let result = sqlx::query(
            "UPDATE fancy_numbers SET status = $2, updated_at = NOW() \
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .bind(status)
        .execute(&mut *self.db)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(ResolveOutcome::Resolved);
        }
        match self.get_by_id(id).await? {
            Some(_) => Ok(ResolveOutcome::NotPending),
            None => Ok(ResolveOutcome::NotFound),
        }
    }

    /// Pending auction bookings, optionally scoped to a branch.
    pub async fn count_pending(&mut self, branch_id: Option<BranchId>) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM fancy_numbers \
             WHERE status = 'pending' AND ($1::uuid IS NULL OR branch_id = $1)",
        )
        .bind(branch_id)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(count)
    }
}
