//! Database repository for service applications.
//!
//! Applications are workflow entities: they are created and listed through
//! the normal surface, but their advance balance only moves through
//! [`Applications::credit_advance`], which the cash register calls inside
//! its own transaction. There is no free-form update.

use crate::db::{
    errors::Result,
    models::applications::{ApplicationCreateDBRequest, ApplicationDBResponse},
};
use crate::types::{ApplicationId, BranchId, MasterItemId, abbrev_uuid};
use rust_decimal::Decimal;
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing applications
#[derive(Debug, Clone, Default)]
pub struct ApplicationFilter {
    /// None lists across all branches
    pub branch_id: Option<BranchId>,
    pub status_id: Option<MasterItemId>,
    /// Substring match on the vehicle number
    pub vehicle_number: Option<String>,
    pub skip: i64,
    pub limit: i64,
}

const APPLICATION_COLUMNS: &str = "id, vehicle_number, chassis_no, application_no, service_date, agent_id, \
     contact_no, mvd_office_id, vehicle_class_id, status_id, rto_service_id, \
     vehicle_kind, cf_expiry_date, tax_exp_date, permit_exp_date, \
     service_fee, advance, vahan_fee, office_exp, payment_mode_id, payment_date, \
     branch_id, created_by, created_at, updated_at";

pub struct Applications<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Applications<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(vehicle_number = %request.vehicle_number), err)]
    pub async fn create(&mut self, request: &ApplicationCreateDBRequest) -> Result<ApplicationDBResponse> {
        let application = sqlx::query_as::<_, ApplicationDBResponse>(&format!(
            "INSERT INTO applications (id, vehicle_number, chassis_no, application_no, service_date, \
                 agent_id, contact_no, mvd_office_id, vehicle_class_id, status_id, rto_service_id, \
                 vehicle_kind, cf_expiry_date, tax_exp_date, permit_exp_date, \
                 service_fee, advance, vahan_fee, office_exp, payment_mode_id, payment_date, \
                 branch_id, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, \
                 $16, $17, $18, $19, $20, $21, $22, $23) \
             RETURNING {APPLICATION_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&request.vehicle_number)
        .bind(&request.chassis_no)
        .bind(&request.application_no)
        .bind(request.service_date)
        .bind(request.agent_id)
        .bind(&request.contact_no)
        .bind(request.mvd_office_id)
        .bind(request.vehicle_class_id)
        .bind(request.status_id)
        .bind(request.rto_service_id)
        .bind(request.vehicle_kind)
        .bind(request.cf_expiry_date)
        .bind(request.tax_exp_date)
        .bind(request.permit_exp_date)
        .bind(request.service_fee)
        .bind(request.advance)
        .bind(request.vahan_fee)
        .bind(request.office_exp)
        .bind(request.payment_mode_id)
        .bind(request.payment_date)
        .bind(request.branch_id)
        .bind(request.created_by)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(application)
    }

    #[instrument(skip(self), fields(application_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: ApplicationId) -> Result<Option<ApplicationDBResponse>> {
        let application = sqlx::query_as::<_, ApplicationDBResponse>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;
        Ok(application)
    }

    /// Newest first. Optional filters are passed as NULLable binds so the
    /// statement text stays stable.
    #[instrument(skip(self, filter), err)]
    pub async fn list(&mut self, filter: &ApplicationFilter) -> Result<Vec<ApplicationDBResponse>> {
        let pattern = filter.vehicle_number.as_ref().map(|v| format!("%{v}%"));
        let applications = sqlx::query_as::<_, ApplicationDBResponse>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications \
             WHERE ($1::uuid IS NULL OR branch_id = $1) \
               AND ($2::uuid IS NULL OR status_id = $2) \
               AND ($3::text IS NULL OR vehicle_number ILIKE $3) \
             ORDER BY created_at DESC, id DESC \
             OFFSET $4 LIMIT $5"
        ))
        .bind(filter.branch_id)
        .bind(filter.status_id)
        .bind(pattern)
        .bind(filter.skip)
        .bind(filter.limit)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(applications)
    }

    #[instrument(skip(self), fields(application_id = %abbrev_uuid(&id)), err)]
    pub async fn delete(&mut self, id: ApplicationId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM applications WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Credit a cash amount against the newest application for a vehicle in
    /// a branch. The target is selected and incremented in one statement so
    /// concurrent credits never read a stale balance. Returns the credited
    /// application id, or None when the vehicle has no application in the
    /// branch.
    #[instrument(skip(self), fields(vehicle_number = %vehicle_number, branch_id = %abbrev_uuid(&branch_id)), err)]
    pub async fn credit_advance(
        &mut self,
        vehicle_number: &str,
        branch_id: BranchId,
        amount: Decimal,
    ) -> Result<Option<ApplicationId>> {
        let credited = sqlx::query_scalar::<_, ApplicationId>(
            "UPDATE applications SET advance = advance + $1, updated_at = NOW() \
             WHERE id = ( \
                 SELECT id FROM applications \
                 WHERE vehicle_number = $2 AND branch_id = $3 \
                 ORDER BY created_at DESC, id DESC LIMIT 1 \
             ) \
             RETURNING id",
        )
        .bind(amount)
        .bind(vehicle_number)
        .bind(branch_id)
        .fetch_optional(&mut *self.db)
        .await?;
        Ok(credited)
    }

    /// Applications created today, optionally scoped to a branch. The UTC
    /// calendar day, independent of the session timezone.
    pub async fn count_today(&mut self, branch_id: Option<BranchId>) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM applications \
             WHERE (created_at AT TIME ZONE 'UTC')::date = (NOW() AT TIME ZONE 'UTC')::date \
               AND ($1::uuid IS NULL OR branch_id = $1)",
        )
        .bind(branch_id)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(count)
    }

    /// Total application count (dashboard totals).
    pub async fn count(&mut self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM applications")
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }
}
