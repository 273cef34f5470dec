//! Shared helpers for handler integration tests.

use crate::api::models::users::Role;
use crate::audit::AuditLogger;
use crate::auth::password;
use crate::db::handlers::{Branches, Repository, Users};
use crate::db::models::branches::BranchCreateDBRequest;
use crate::db::models::users::{UserCreateDBRequest, UserDBResponse};
use crate::types::BranchId;
use crate::{AppState, Config, build_router};
use axum_test::TestServer;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// Password every test user is created with.
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Spin up the full router against the given pool.
///
/// The audit writer runs on a detached task; it drains and exits on its own
/// when the server (and with it the event sender) is dropped.
pub async fn create_test_app(pool: PgPool) -> TestServer {
    let config = Config {
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        ..Default::default()
    };

    let (audit, audit_rx) = AuditLogger::channel(config.audit.queue_capacity);
    crate::audit::spawn_audit_writer(pool.clone(), audit_rx, CancellationToken::new());

    let state = AppState::builder().db(pool).config(config).audit(audit).build();
    let router = build_router(state).expect("Failed to build router");

    TestServer::new(router).expect("Failed to start test server")
}

pub async fn create_test_branch(pool: &PgPool, name: &str, code: &str) -> BranchId {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut branches = Branches::new(&mut conn);
    let branch = branches
        .create(&BranchCreateDBRequest {
            name: name.to_string(),
            code: code.to_string(),
            address: None,
        })
        .await
        .expect("Failed to create test branch");
    branch.id
}

/// Create a user with [`TEST_PASSWORD`] and the email doubling as display name.
pub async fn create_test_user(pool: &PgPool, email: &str, role: Role, branch_id: Option<BranchId>) -> UserDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut users = Users::new(&mut conn);
    users
        .create(&UserCreateDBRequest {
            email: email.to_string(),
            display_name: email.to_string(),
            role,
            branch_id,
            password_hash: password::hash_string(TEST_PASSWORD).expect("Failed to hash test password"),
        })
        .await
        .expect("Failed to create test user")
}

/// Log in through the API and return the session cookie pair
/// (`mvdesk_session=<token>`) ready for a `cookie` request header.
pub async fn login(server: &TestServer, email: &str) -> String {
    let response = server
        .post("/api/v1/auth/login")
        .json(&serde_json::json!({"email": email, "password": TEST_PASSWORD}))
        .await;
    response.assert_status_ok();

    let set_cookie = response
        .headers()
        .get("set-cookie")
        .expect("Login should set a session cookie")
        .to_str()
        .expect("Cookie header should be valid UTF-8")
        .to_string();

    // Keep only the name=value pair, drop the attributes
    set_cookie
        .split(';')
        .next()
        .expect("Cookie header should not be empty")
        .to_string()
}
