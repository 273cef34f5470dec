//! Database models for service applications.

use crate::api::models::applications::{ApplicationCreate, VehicleKind};
use crate::types::{ApplicationId, BranchId, MasterItemId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

/// Database request for creating an application.
///
/// Branch and creator attribution is resolved at the API layer; the
/// temporary-vehicle dates are already blanked here when the vehicle kind
/// is not `tv`.
#[derive(Debug, Clone)]
pub struct ApplicationCreateDBRequest {
    pub vehicle_number: String,
    pub chassis_no: Option<String>,
    pub application_no: Option<String>,
    pub service_date: Option<NaiveDate>,
    pub agent_id: Option<MasterItemId>,
    pub contact_no: Option<String>,
    pub mvd_office_id: Option<MasterItemId>,
    pub vehicle_class_id: Option<MasterItemId>,
    pub status_id: Option<MasterItemId>,
    pub rto_service_id: Option<MasterItemId>,
    pub vehicle_kind: VehicleKind,
    pub cf_expiry_date: Option<NaiveDate>,
    pub tax_exp_date: Option<NaiveDate>,
    pub permit_exp_date: Option<NaiveDate>,
    pub service_fee: Decimal,
    pub advance: Decimal,
    pub vahan_fee: Decimal,
    pub office_exp: Decimal,
    pub payment_mode_id: Option<MasterItemId>,
    pub payment_date: Option<NaiveDate>,
    pub branch_id: BranchId,
    pub created_by: UserId,
}

impl ApplicationCreateDBRequest {
    /// Build from the API request plus resolved attribution. Temporary-vehicle
    /// sub-dates are only kept when the governing flag is set.
    pub fn from_api(api: ApplicationCreate, branch_id: BranchId, created_by: UserId) -> Self {
        let is_tv = api.vehicle_kind == VehicleKind::Tv;
        Self {
            vehicle_number: api.vehicle_number,
            chassis_no: api.chassis_no,
            application_no: api.application_no,
            service_date: api.service_date,
            agent_id: api.agent_id,
            contact_no: api.contact_no,
            mvd_office_id: api.mvd_office_id,
            vehicle_class_id: api.vehicle_class_id,
            status_id: api.status_id,
            rto_service_id: api.rto_service_id,
            vehicle_kind: api.vehicle_kind,
            cf_expiry_date: api.cf_expiry_date.filter(|_| is_tv),
            tax_exp_date: api.tax_exp_date.filter(|_| is_tv),
            permit_exp_date: api.permit_exp_date.filter(|_| is_tv),
            service_fee: api.service_fee,
            advance: api.advance,
            vahan_fee: api.vahan_fee,
            office_exp: api.office_exp,
            payment_mode_id: api.payment_mode_id,
            payment_date: api.payment_date,
            branch_id,
            created_by,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ApplicationDBResponse {
    pub id: ApplicationId,
    pub vehicle_number: String,
    pub chassis_no: Option<String>,
    pub application_no: Option<String>,
    pub service_date: Option<NaiveDate>,
    pub agent_id: Option<MasterItemId>,
    pub contact_no: Option<String>,
    pub mvd_office_id: Option<MasterItemId>,
    pub vehicle_class_id: Option<MasterItemId>,
    pub status_id: Option<MasterItemId>,
    pub rto_service_id: Option<MasterItemId>,
    pub vehicle_kind: VehicleKind,
    pub cf_expiry_date: Option<NaiveDate>,
    pub tax_exp_date: Option<NaiveDate>,
    pub permit_exp_date: Option<NaiveDate>,
    pub service_fee: Decimal,
    pub advance: Decimal,
    pub vahan_fee: Decimal,
    pub office_exp: Decimal,
    pub payment_mode_id: Option<MasterItemId>,
    pub payment_date: Option<NaiveDate>,
    pub branch_id: BranchId,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
