//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! The API is divided into several functional areas:
//!
//! - **Authentication** (`/api/v1/auth/*`): Login, logout, profile, password change
//! - **Users** (`/api/v1/users/*`): Staff account administration
//! - **Branches** (`/api/v1/branches/*`): Branch office master records
//! - **Masters** (`/api/v1/masters/*`): Reference data across the seven categories
//! - **Applications** (`/api/v1/applications/*`): Service application records
//! - **Registrations** (`/api/v1/registrations/*`): Registrations and number allotment
//! - **Fancy numbers** (`/api/v1/fancy-numbers/*`): Bookings and auction outcomes
//! - **Cash register** (`/api/v1/cash-register/*`): Daily cash entries
//! - **Dashboard** (`/api/v1/dashboard`): Branch-scoped daily counters
//! - **Activity logs** (`/api/v1/activity-logs`): Audit trail, admin only
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`.
//! API documentation is available at `/docs` when the server is running.

pub mod handlers;
pub mod models;
