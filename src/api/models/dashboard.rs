//! Dashboard statistics models.

use serde::Serialize;
use utoipa::ToSchema;

/// Branch-scoped counts shown on the staff dashboard. For admin callers the
/// scope is the whole portfolio and `totals` is populated as well.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardResponse {
    /// Applications created today (UTC calendar day)
    pub todays_applications: i64,
    /// Registrations still awaiting number allotment
    pub pending_registrations: i64,
    /// Sum of cash received today (UTC calendar day)
    #[schema(value_type = f64)]
    pub todays_cash: rust_decimal::Decimal,
    /// Auction bookings still pending resolution
    pub pending_fancy_numbers: i64,
    /// Portfolio-wide totals, admin callers only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<DashboardTotals>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardTotals {
    pub applications: i64,
    pub users: i64,
    pub branches: i64,
}
