//! Authentication and authorization.
//!
//! This module provides:
//! - Email/password authentication with Argon2 hashing
//! - JWT session tokens carried in an HTTP-only cookie
//! - The [`current_user`] extractor resolving the session to a user profile
//! - Role allow-list checks in [`permissions`]
//!
//! # Authentication Flow
//!
//! Users log in via `/api/v1/auth/login` with email/password. On success a
//! signed JWT is set as a session cookie; every subsequent request resolves
//! the cookie through the [`CurrentUser`](crate::api::models::users::CurrentUser)
//! extractor, which re-reads the user record so role or branch changes take
//! effect immediately and deleted accounts lose access.
//!
//! # Authorization
//!
//! Access control is role-based: `superadmin`, `admin`, and `staff`. Route
//! handlers call the helpers in [`permissions`] before touching data, and
//! branch scoping is applied in the repository filters.
//!
//! # Modules
//!
//! - [`current_user`]: Extractor for the authenticated user in handlers
//! - [`password`]: Password hashing and verification using Argon2
//! - [`permissions`]: Role allow-list checks
//! - [`session`]: JWT session token creation and verification

pub mod current_user;
pub mod password;
pub mod permissions;
pub mod session;
