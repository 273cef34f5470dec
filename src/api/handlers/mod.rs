//! Axum route handlers for the management API.
//!
//! Handlers are grouped by resource. Each handler authenticates via the
//! [`CurrentUser`](crate::api::models::users::CurrentUser) extractor, applies
//! role and branch checks from [`crate::auth::permissions`], and talks to the
//! database through the repositories in [`crate::db::handlers`].

pub mod activity_logs;
pub mod applications;
pub mod auth;
pub mod branches;
pub mod cash_register;
pub mod dashboard;
pub mod fancy_numbers;
pub mod masters;
pub mod registrations;
pub mod users;
