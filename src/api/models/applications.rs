//! API request/response models for service applications.

use crate::db::models::applications::ApplicationDBResponse;
use crate::types::{ApplicationId, BranchId, MasterItemId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::pagination::Pagination;
use super::{lenient_date, lenient_decimal};

/// Temporary vehicle ("TV") or regular ("NTV").
///
/// The permit/tax/insurance expiry dates are only stored for temporary
/// vehicles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "vehicle_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VehicleKind {
    Tv,
    Ntv,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ApplicationCreate {
    pub vehicle_number: String,
    pub chassis_no: Option<String>,
    pub application_no: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    #[schema(value_type = Option<String>, format = "date")]
    pub service_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub agent_id: Option<MasterItemId>,
    pub contact_no: Option<String>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub mvd_office_id: Option<MasterItemId>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub vehicle_class_id: Option<MasterItemId>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub status_id: Option<MasterItemId>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub rto_service_id: Option<MasterItemId>,
    #[serde(default = "default_vehicle_kind")]
    pub vehicle_kind: VehicleKind,
    #[serde(default, deserialize_with = "lenient_date")]
    #[schema(value_type = Option<String>, format = "date")]
    pub cf_expiry_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date")]
    #[schema(value_type = Option<String>, format = "date")]
    pub tax_exp_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date")]
    #[schema(value_type = Option<String>, format = "date")]
    pub permit_exp_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    #[schema(value_type = f64)]
    pub service_fee: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    #[schema(value_type = f64)]
    pub advance: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    #[schema(value_type = f64)]
    pub vahan_fee: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    #[schema(value_type = f64)]
    pub office_exp: Decimal,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub payment_mode_id: Option<MasterItemId>,
    #[serde(default, deserialize_with = "lenient_date")]
    #[schema(value_type = Option<String>, format = "date")]
    pub payment_date: Option<NaiveDate>,
    /// Only honored for admin callers; staff entries take the creator's branch
    #[schema(value_type = Option<String>, format = "uuid")]
    pub branch_id: Option<BranchId>,
}

fn default_vehicle_kind() -> VehicleKind {
    VehicleKind::Ntv
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApplicationResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ApplicationId,
    pub vehicle_number: String,
    pub chassis_no: Option<String>,
    pub application_no: Option<String>,
    #[schema(value_type = Option<String>, format = "date")]
    pub service_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub agent_id: Option<MasterItemId>,
    pub contact_no: Option<String>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub mvd_office_id: Option<MasterItemId>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub vehicle_class_id: Option<MasterItemId>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub status_id: Option<MasterItemId>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub rto_service_id: Option<MasterItemId>,
    pub vehicle_kind: VehicleKind,
    #[schema(value_type = Option<String>, format = "date")]
    pub cf_expiry_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = "date")]
    pub tax_exp_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = "date")]
    pub permit_exp_date: Option<NaiveDate>,
    #[schema(value_type = f64)]
    pub service_fee: Decimal,
    #[schema(value_type = f64)]
    pub advance: Decimal,
    #[schema(value_type = f64)]
    pub vahan_fee: Decimal,
    #[schema(value_type = f64)]
    pub office_exp: Decimal,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub payment_mode_id: Option<MasterItemId>,
    #[schema(value_type = Option<String>, format = "date")]
    pub payment_date: Option<NaiveDate>,
    #[schema(value_type = String, format = "uuid")]
    pub branch_id: BranchId,
    #[schema(value_type = String, format = "uuid")]
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Query parameters for listing applications
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListApplicationsQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Filter by application status master item
    #[param(value_type = Option<String>, format = "uuid")]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub status_id: Option<MasterItemId>,

    /// Filter by vehicle number (substring match)
    pub vehicle_number: Option<String>,
}

impl From<ApplicationDBResponse> for ApplicationResponse {
    fn from(db: ApplicationDBResponse) -> Self {
        Self {
            id: db.id,
            vehicle_number: db.vehicle_number,
            chassis_no: db.chassis_no,
            application_no: db.application_no,
            service_date: db.service_date,
            agent_id: db.agent_id,
            contact_no: db.contact_no,
            mvd_office_id: db.mvd_office_id,
            vehicle_class_id: db.vehicle_class_id,
            status_id: db.status_id,
            rto_service_id: db.rto_service_id,
            vehicle_kind: db.vehicle_kind,
            cf_expiry_date: db.cf_expiry_date,
            tax_exp_date: db.tax_exp_date,
            permit_exp_date: db.permit_exp_date,
            service_fee: db.service_fee,
            advance: db.advance,
            vahan_fee: db.vahan_fee,
            office_exp: db.office_exp,
            payment_mode_id: db.payment_mode_id,
            payment_date: db.payment_date,
            branch_id: db.branch_id,
            created_by: db.created_by,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
