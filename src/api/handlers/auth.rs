use axum::{Json, extract::State};

use crate::{
    AppState,
    api::models::{
        auth::{AuthResponse, ChangePasswordRequest, LoginRequest, LoginResponse, LogoutResponse, MessageResponse},
        users::CurrentUser,
    },
    auth::{password, session},
    db::{
        handlers::{Repository, Users},
        models::users::UserUpdateDBRequest,
    },
    errors::Error,
};

/// Login with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    tag = "auth",
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<LoginResponse, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    let user = users.get_by_email(&request.email).await?.ok_or_else(|| Error::Unauthenticated {
        message: Some("Invalid email or password".to_string()),
    })?;

    // Verify password on a blocking thread to avoid stalling the runtime
    let password = request.password;
    let hash = user.password_hash.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_string(&password, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Err(Error::Unauthenticated {
            message: Some("Invalid email or password".to_string()),
        });
    }

    users.touch_last_login(user.id).await?;

    let token = session::create_session_token(user.id, &user.email, &state.config)?;
    let cookie = create_session_cookie(&token, &state.config);

    Ok(LoginResponse {
        auth_response: AuthResponse {
            user: CurrentUser::from(user),
        },
        cookie,
    })
}

/// Logout (clear session)
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logout successful", body = MessageResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn logout(State(state): State<AppState>) -> Result<LogoutResponse, Error> {
    // Expired cookie clears the session on the client
    let cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite={}; Max-Age=0",
        state.config.auth.session.cookie_name, state.config.auth.session.cookie_same_site
    );

    Ok(LogoutResponse {
        message: MessageResponse {
            message: "Logout successful".to_string(),
        },
        cookie,
    })
}

/// The authenticated user's profile
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user profile", body = CurrentUser),
        (status = 401, description = "Not authenticated"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn me(current_user: CurrentUser) -> Json<CurrentUser> {
    Json(current_user)
}

/// Change the authenticated user's password
#[utoipa::path(
    post,
    path = "/auth/password-change",
    request_body = ChangePasswordRequest,
    tag = "auth",
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Password does not meet requirements"),
        (status = 401, description = "Current password is incorrect"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn change_password(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, Error> {
    let password_config = &state.config.auth.password;
    if request.new_password.len() < password_config.min_length {
        return Err(Error::BadRequest {
            message: format!("Password must be at least {} characters", password_config.min_length),
        });
    }
    if request.new_password.len() > password_config.max_length {
        return Err(Error::BadRequest {
            message: format!("Password must be no more than {} characters", password_config.max_length),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    let user = users.get_by_email(&current_user.email).await?.ok_or(Error::Unauthenticated {
        message: Some("Account no longer exists".to_string()),
    })?;

    // Re-authenticate with the current password before changing it
    let current_password = request.current_password;
    let hash = user.password_hash.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_string(&current_password, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Err(Error::Unauthenticated {
            message: Some("Current password is incorrect".to_string()),
        });
    }

    let params = password::Argon2Params::from(password_config);
    let new_password = request.new_password;
    let new_password_hash = tokio::task::spawn_blocking(move || password::hash_string_with_params(&new_password, Some(params)))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    users
        .update(
            user.id,
            &UserUpdateDBRequest {
                password_hash: Some(new_password_hash),
                ..Default::default()
            },
        )
        .await?;

    Ok(Json(MessageResponse {
        message: "Password changed successfully".to_string(),
    }))
}

/// Helper to format the session cookie
fn create_session_cookie(token: &str, config: &crate::config::Config) -> String {
    let session = &config.auth.session;
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite={}; Max-Age={}",
        session.cookie_name,
        token,
        session.cookie_same_site,
        session.timeout.as_secs()
    );
    if session.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use crate::api::models::users::Role;
    use crate::test_utils::{TEST_PASSWORD, create_test_app, create_test_user, login};
    use serde_json::json;
    use sqlx::PgPool;

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_login_success_sets_cookie(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        create_test_user(&pool, "clerk@example.com", Role::Staff, None).await;

        let response = server
            .post("/api/v1/auth/login")
            .json(&json!({"email": "clerk@example.com", "password": TEST_PASSWORD}))
            .await;

        response.assert_status_ok();
        let cookie = response.headers().get("set-cookie").unwrap().to_str().unwrap();
        assert!(cookie.starts_with("mvdesk_session="));
        assert!(cookie.contains("HttpOnly"));

        let body: serde_json::Value = response.json();
        assert_eq!(body["user"]["email"], "clerk@example.com");
        assert_eq!(body["user"]["role"], "staff");
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_login_wrong_password(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        create_test_user(&pool, "clerk@example.com", Role::Staff, None).await;

        let response = server
            .post("/api/v1/auth/login")
            .json(&json!({"email": "clerk@example.com", "password": "wrong-password"}))
            .await;
        assert_eq!(response.status_code(), 401);
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_login_unknown_email(pool: PgPool) {
        let server = create_test_app(pool).await;

        let response = server
            .post("/api/v1/auth/login")
            .json(&json!({"email": "nobody@example.com", "password": TEST_PASSWORD}))
            .await;
        assert_eq!(response.status_code(), 401);
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_login_rejected_for_passwordless_seeded_account(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        crate::create_initial_superadmin("root@example.com", None, &pool).await.unwrap();

        // No configured password means no credentials can match, never a 500
        let response = server
            .post("/api/v1/auth/login")
            .json(&json!({"email": "root@example.com", "password": ""}))
            .await;
        assert_eq!(response.status_code(), 401);
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_login_stamps_last_login(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool, "clerk@example.com", Role::Staff, None).await;
        assert!(user.last_login.is_none());

        login(&server, "clerk@example.com").await;

        let last_login: Option<chrono::DateTime<chrono::Utc>> =
            sqlx::query_scalar("SELECT last_login FROM users WHERE id = $1")
                .bind(user.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert!(last_login.is_some());
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_me_round_trip(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        create_test_user(&pool, "clerk@example.com", Role::Staff, None).await;
        let cookie = login(&server, "clerk@example.com").await;

        let response = server.get("/api/v1/auth/me").add_header("cookie", &cookie).await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["email"], "clerk@example.com");
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_change_password(pool: PgPool) {
        let server = create_test_app(pool.clone()).await;
        create_test_user(&pool, "clerk@example.com", Role::Staff, None).await;
        let cookie = login(&server, "clerk@example.com").await;

        // Wrong current password is rejected
        let response = server
            .post("/api/v1/auth/password-change")
            .add_header("cookie", &cookie)
            .json(&json!({"current_password": "wrong", "new_password": "a-new-password-1"}))
            .await;
        assert_eq!(response.status_code(), 401);

        // Too-short replacement is rejected
        let response = server
            .post("/api/v1/auth/password-change")
            .add_header("cookie", &cookie)
            .json(&json!({"current_password": TEST_PASSWORD, "new_password": "short"}))
            .await;
        assert_eq!(response.status_code(), 400);

        let response = server
            .post("/api/v1/auth/password-change")
            .add_header("cookie", &cookie)
            .json(&json!({"current_password": TEST_PASSWORD, "new_password": "a-new-password-1"}))
            .await;
        response.assert_status_ok();

        // Old password no longer works, new one does
        let response = server
            .post("/api/v1/auth/login")
            .json(&json!({"email": "clerk@example.com", "password": TEST_PASSWORD}))
            .await;
        assert_eq!(response.status_code(), 401);

        let response = server
            .post("/api/v1/auth/login")
            .json(&json!({"email": "clerk@example.com", "password": "a-new-password-1"}))
            .await;
        response.assert_status_ok();
    }
}
