//! OpenAPI documentation for the portal API at `/api/v1/*`.
//!
//! The generated document is served interactively at `/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::api;

/// Session-cookie security scheme.
///
/// The cookie name here must match `auth.cookie_name` in the server config;
/// this is the default.
struct SessionCookieAddon;

impl Modify for SessionCookieAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "session_token".to_string(),
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "mvdesk_session",
                    "JWT session cookie issued by `POST /api/v1/auth/login`.",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MVDesk API",
        description = "Back office API for regional motor vehicle department service agencies: \
                       service applications, vehicle registrations, fancy-number bookings, \
                       cash register, master data, and user administration.",
    ),
    servers(
        (url = "/api/v1", description = "Portal API")
    ),
    paths(
        api::handlers::auth::login,
        api::handlers::auth::logout,
        api::handlers::auth::me,
        api::handlers::auth::change_password,
        api::handlers::users::list_users,
        api::handlers::users::create_user,
        api::handlers::users::get_user,
        api::handlers::users::update_user,
        api::handlers::users::delete_user,
        api::handlers::branches::list_branches,
        api::handlers::branches::create_branch,
        api::handlers::branches::get_branch,
        api::handlers::branches::update_branch,
        api::handlers::branches::delete_branch,
        api::handlers::masters::get_all_masters,
        api::handlers::masters::list_categories,
        api::handlers::masters::list_items,
        api::handlers::masters::create_item,
        api::handlers::masters::update_item,
        api::handlers::masters::delete_item,
        api::handlers::applications::create_application,
        api::handlers::applications::list_applications,
        api::handlers::applications::get_application,
        api::handlers::applications::delete_application,
        api::handlers::registrations::create_registration,
        api::handlers::registrations::list_registrations,
        api::handlers::registrations::get_registration,
        api::handlers::registrations::update_registration,
        api::handlers::registrations::allot_number,
        api::handlers::registrations::delete_registration,
        api::handlers::fancy_numbers::create_fancy_number,
        api::handlers::fancy_numbers::list_fancy_numbers,
        api::handlers::fancy_numbers::get_fancy_number,
        api::handlers::fancy_numbers::update_fancy_number,
        api::handlers::fancy_numbers::record_auction_result,
        api::handlers::fancy_numbers::delete_fancy_number,
        api::handlers::cash_register::create_cash_entry,
        api::handlers::cash_register::list_cash_entries,
        api::handlers::cash_register::get_cash_entry,
        api::handlers::cash_register::delete_cash_entry,
        api::handlers::dashboard::get_dashboard,
        api::handlers::activity_logs::list_activity_logs,
    ),
    components(schemas(
        api::models::auth::LoginRequest,
        api::models::auth::AuthResponse,
        api::models::auth::ChangePasswordRequest,
        api::models::auth::MessageResponse,
        api::models::users::Role,
        api::models::users::CurrentUser,
        api::models::users::UserCreate,
        api::models::users::UserUpdate,
        api::models::users::UserResponse,
        api::models::branches::BranchCreate,
        api::models::branches::BranchUpdate,
        api::models::branches::BranchResponse,
        api::models::masters::MasterCategory,
        api::models::masters::FieldSpec,
        api::models::masters::CategoryDescriptorResponse,
        api::models::masters::MasterItemCreate,
        api::models::masters::MasterItemUpdate,
        api::models::masters::MasterItemResponse,
        api::models::applications::VehicleKind,
        api::models::applications::ApplicationCreate,
        api::models::applications::ApplicationResponse,
        api::models::registrations::RegistrationCreate,
        api::models::registrations::RegistrationUpdate,
        api::models::registrations::AllotNumberRequest,
        api::models::registrations::RegistrationResponse,
        api::models::fancy_numbers::FancyNumberStatus,
        api::models::fancy_numbers::FancyNumberCreate,
        api::models::fancy_numbers::FancyNumberUpdate,
        api::models::fancy_numbers::AuctionResult,
        api::models::fancy_numbers::AuctionResultRequest,
        api::models::fancy_numbers::FancyNumberResponse,
        api::models::cash_register::CashEntryCreate,
        api::models::cash_register::CashEntryResponse,
        api::models::cash_register::CashEntrySaveResponse,
        api::models::dashboard::DashboardResponse,
        api::models::dashboard::DashboardTotals,
        api::models::activity_logs::ActivityLogResponse,
    )),
    modifiers(&SessionCookieAddon),
    tags(
        (name = "auth", description = "Session management"),
        (name = "users", description = "Staff and admin accounts"),
        (name = "branches", description = "Branch master records"),
        (name = "masters", description = "Master data across the seven categories"),
        (name = "applications", description = "Service applications"),
        (name = "registrations", description = "Vehicle registrations and number allotment"),
        (name = "fancy-numbers", description = "Fancy-number bookings and auctions"),
        (name = "cash-register", description = "Cash register and reconciliation"),
        (name = "dashboard", description = "Landing-page statistics"),
        (name = "activity-logs", description = "Audit trail"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_builds_and_covers_every_surface() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for prefix in [
            "/auth/login",
            "/users",
            "/branches",
            "/masters",
            "/applications",
            "/registrations",
            "/fancy-numbers",
            "/cash-register",
            "/dashboard",
            "/activity-logs",
        ] {
            assert!(
                paths.iter().any(|p| p.starts_with(prefix)),
                "missing {prefix} in {paths:?}"
            );
        }
    }

    #[test]
    fn test_session_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("session_token"));
    }
}
