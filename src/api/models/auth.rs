//! Login and password management payloads.

use axum::{
    Json,
    http::header::SET_COOKIE,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::users::CurrentUser;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: CurrentUser,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    /// Current password, required for re-authentication
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Successful login payload plus the session cookie to set.
#[derive(Debug)]
pub struct LoginResponse {
    pub auth_response: AuthResponse,
    pub cookie: String,
}

impl IntoResponse for LoginResponse {
    fn into_response(self) -> Response {
        ([(SET_COOKIE, self.cookie)], Json(self.auth_response)).into_response()
    }
}

/// Logout acknowledgement plus the expired cookie that clears the session.
#[derive(Debug)]
pub struct LogoutResponse {
    pub message: MessageResponse,
    pub cookie: String,
}

impl IntoResponse for LogoutResponse {
    fn into_response(self) -> Response {
        ([(SET_COOKIE, self.cookie)], Json(self.message)).into_response()
    }
}
