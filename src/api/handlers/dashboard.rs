use axum::{Json, extract::State};

use crate::{
    AppState,
    api::models::{
        dashboard::{DashboardResponse, DashboardTotals},
        users::{CurrentUser, Role},
    },
    auth::permissions,
    db::handlers::{Applications, Branches, CashRegister, FancyNumbers, Registrations, Users},
    errors::Error,
};

/// Dashboard statistics for the landing page
///
/// Staff see counts for their own branch; admins see all branches plus
/// portfolio-wide totals.
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "dashboard",
    responses(
        (status = 200, description = "Counts scoped to the caller", body = DashboardResponse),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_dashboard(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<DashboardResponse>, Error> {
    let branch_id = permissions::branch_scope(&current_user)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let todays_applications = Applications::new(&mut conn).count_today(branch_id).await?;
    let pending_registrations = Registrations::new(&mut conn).count_pending(branch_id).await?;
    let todays_cash = CashRegister::new(&mut conn).total_received_today(branch_id).await?;
    let pending_fancy_numbers = FancyNumbers::new(&mut conn).count_pending(branch_id).await?;

    let totals = match current_user.role {
        Role::Superadmin | Role::Admin => Some(DashboardTotals {
            applications: Applications::new(&mut conn).count().await?,
            users: Users::new(&mut conn).count().await?,
            branches: Branches::new(&mut conn).count().await?,
        }),
        Role::Staff => None,
    };

    Ok(Json(DashboardResponse {
        todays_applications,
        pending_registrations,
        todays_cash,
        pending_fancy_numbers,
        totals,
    }))
}
