//! # mvdesk: Back office for motor vehicle department service agencies
//!
//! `mvdesk` is the server behind a multi-branch MVD service agency portal.
//! Staff at each branch record the day's work: service applications,
//! vehicle registrations awaiting number allotment, fancy-number bookings,
//! and cash-register entries. Admins manage master data (RTO services,
//! agents, vehicle classes, offices, statuses, bank accounts, payment
//! modes), branches, and user accounts.
//!
//! ## Architecture
//!
//! The HTTP layer is [Axum](https://github.com/tokio-rs/axum) with all
//! persistence in PostgreSQL. Requests authenticate via a JWT session
//! cookie resolved by the `CurrentUser` extractor; role allow-lists
//! (superadmin / admin / staff) gate each route, and staff reads are
//! scoped to the acting user's branch in the repository filters.
//!
//! Two behaviors deserve a note:
//!
//! - **Cash reconciliation**: saving a cash-register entry credits the
//!   matching application's advance with a single conditional SQL UPDATE
//!   inside the entry's insert transaction, so concurrent entries never
//!   lose increments.
//! - **Audit trail**: mutating handlers emit events onto a bounded
//!   channel; a background writer persists them to `activity_logs`.
//!   Audit failures are logged and swallowed, never surfaced to the
//!   request that produced them.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use mvdesk::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = mvdesk::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     mvdesk::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! The application requires a PostgreSQL database and runs migrations on
//! startup:
//!
//! ```no_run
//! # use sqlx::PgPool;
//! # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
//! mvdesk::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod audit;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
mod types;

#[cfg(test)]
pub mod test_utils;

use crate::{
    api::models::users::Role,
    audit::AuditLogger,
    auth::password,
    db::handlers::{Repository, Users},
    db::models::users::UserCreateDBRequest,
    openapi::ApiDoc,
};
use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, patch, post, put},
};
use bon::Builder;
pub use config::Config;
use sqlx::PgPool;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{
    ActivityLogId, ApplicationId, BranchId, CashEntryId, FancyNumberId, MasterItemId, RegistrationId, UserId,
};

/// Application state shared across all request handlers.
///
/// # Fields
///
/// - `db`: PostgreSQL connection pool
/// - `config`: Application configuration loaded from file/environment
/// - `audit`: Handle for emitting fire-and-forget audit events
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub audit: AuditLogger,
}

/// Get the mvdesk database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial superadmin user if it doesn't exist.
///
/// Idempotent: a missing user is created, an existing one gets its password
/// updated when one is supplied. Called on every startup so a fresh install
/// always has a way in.
#[instrument(skip_all)]
pub async fn create_initial_superadmin(email: &str, password: Option<&str>, db: &PgPool) -> Result<UserId, anyhow::Error> {
    let password_hash = match password {
        Some(pwd) => password::hash_string(pwd).map_err(|e| anyhow::anyhow!("Failed to hash superadmin password: {e}"))?,
        // An empty hash never verifies; the account stays locked until a
        // password is configured
        None => String::new(),
    };

    let mut tx = db.begin().await?;
    let mut users = Users::new(&mut tx);

    if let Some(existing) = users.get_by_email(email).await? {
        if !password_hash.is_empty() {
            sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE email = $2")
                .bind(&password_hash)
                .bind(email)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        return Ok(existing.id);
    }

    let created = users
        .create(&UserCreateDBRequest {
            email: email.to_string(),
            display_name: email.to_string(),
            role: Role::Superadmin,
            branch_id: None,
            password_hash,
        })
        .await?;

    tx.commit().await?;
    info!(email, "Created initial superadmin user");
    Ok(created.id)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.auth.cors;

    let mut cors = CorsLayer::new().allow_credentials(cors_config.allow_credentials);
    if cors_config.allowed_origins.iter().any(|origin| origin == "*") {
        cors = cors.allow_origin(tower_http::cors::Any);
    } else {
        let mut origins = Vec::new();
        for origin in &cors_config.allowed_origins {
            origins.push(origin.parse::<HeaderValue>()?);
        }
        cors = cors.allow_origin(origins);
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
///
/// The portal API lives under `/api/v1`; interactive docs are served at
/// `/docs` and a liveness probe at `/healthz`.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let api_routes = Router::new()
        // Session management
        .route("/auth/login", post(api::handlers::auth::login))
        .route("/auth/logout", post(api::handlers::auth::logout))
        .route("/auth/me", get(api::handlers::auth::me))
        .route("/auth/password-change", post(api::handlers::auth::change_password))
        // User management
        .route("/users", get(api::handlers::users::list_users))
        .route("/users", post(api::handlers::users::create_user))
        .route("/users/{id}", get(api::handlers::users::get_user))
        .route("/users/{id}", patch(api::handlers::users::update_user))
        .route("/users/{id}", delete(api::handlers::users::delete_user))
        // Branches
        .route("/branches", get(api::handlers::branches::list_branches))
        .route("/branches", post(api::handlers::branches::create_branch))
        .route("/branches/{id}", get(api::handlers::branches::get_branch))
        .route("/branches/{id}", patch(api::handlers::branches::update_branch))
        .route("/branches/{id}", delete(api::handlers::branches::delete_branch))
        // Master data
        .route("/masters", get(api::handlers::masters::get_all_masters))
        .route("/masters/categories", get(api::handlers::masters::list_categories))
        .route("/masters/{category}", get(api::handlers::masters::list_items))
        .route("/masters/{category}", post(api::handlers::masters::create_item))
        .route("/masters/{category}/{id}", patch(api::handlers::masters::update_item))
        .route("/masters/{category}/{id}", delete(api::handlers::masters::delete_item))
        // Service applications
        .route("/applications", get(api::handlers::applications::list_applications))
        .route("/applications", post(api::handlers::applications::create_application))
        .route("/applications/{id}", get(api::handlers::applications::get_application))
        .route("/applications/{id}", delete(api::handlers::applications::delete_application))
        // Registrations and number allotment
        .route("/registrations", get(api::handlers::registrations::list_registrations))
        .route("/registrations", post(api::handlers::registrations::create_registration))
        .route("/registrations/{id}", get(api::handlers::registrations::get_registration))
        .route("/registrations/{id}", put(api::handlers::registrations::update_registration))
        .route("/registrations/{id}", delete(api::handlers::registrations::delete_registration))
        .route("/registrations/{id}/allot", post(api::handlers::registrations::allot_number))
        // Fancy numbers and auction resolution
        .route("/fancy-numbers", get(api::handlers::fancy_numbers::list_fancy_numbers))
        .route("/fancy-numbers", post(api::handlers::fancy_numbers::create_fancy_number))
        .route("/fancy-numbers/{id}", get(api::handlers::fancy_numbers::get_fancy_number))
        .route("/fancy-numbers/{id}", put(api::handlers::fancy_numbers::update_fancy_number))
        .route("/fancy-numbers/{id}", delete(api::handlers::fancy_numbers::delete_fancy_number))
        .route("/fancy-numbers/{id}/result", post(api::handlers::fancy_numbers::record_auction_result))
        // Cash register
        .route("/cash-register", get(api::handlers::cash_register::list_cash_entries))
        .route("/cash-register", post(api::handlers::cash_register::create_cash_entry))
        .route("/cash-register/{id}", get(api::handlers::cash_register::get_cash_entry))
        .route("/cash-register/{id}", delete(api::handlers::cash_register::delete_cash_entry))
        // Dashboard and audit trail
        .route("/dashboard", get(api::handlers::dashboard::get_dashboard))
        .route("/activity-logs", get(api::handlers::activity_logs::list_activity_logs))
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .nest("/api/v1", api_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    let cors_layer = create_cors_layer(&state.config)?;

    let router = router.layer(cors_layer).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns all resources and lifecycle.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] connects to the database, runs
///    migrations, ensures the initial superadmin exists, and starts the
///    audit writer task
/// 2. **Serve**: [`Application::serve`] binds the listener and handles
///    requests until the shutdown future resolves
/// 3. **Shutdown**: the audit queue is flushed and connections closed
///    before exit
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
    audit_writer: tokio::task::JoinHandle<()>,
    shutdown_token: tokio_util::sync::CancellationToken,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting mvdesk with configuration: {:#?}", config);

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.database.pool.max_connections)
            .min_connections(config.database.pool.min_connections)
            .acquire_timeout(Duration::from_secs(config.database.pool.acquire_timeout_secs))
            .connect(&config.database.url)
            .await?;
        migrator().run(&pool).await?;

        create_initial_superadmin(&config.superadmin_email, config.superadmin_password.as_deref(), &pool).await?;

        let shutdown_token = tokio_util::sync::CancellationToken::new();
        let (audit, audit_rx) = AuditLogger::channel(config.audit.queue_capacity);
        let audit_writer = audit::spawn_audit_writer(pool.clone(), audit_rx, shutdown_token.clone());

        let state = AppState::builder().db(pool.clone()).config(config.clone()).audit(audit).build();
        let router = build_router(state)?;

        Ok(Self {
            router,
            config,
            pool,
            audit_writer,
            shutdown_token,
        })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("mvdesk listening on http://{bind_addr}");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        // Flush the audit queue before closing the pool
        self.shutdown_token.cancel();
        let _ = self.audit_writer.await;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::create_initial_superadmin;
    use crate::api::models::users::Role;
    use crate::auth::password;
    use crate::db::handlers::Users;
    use sqlx::PgPool;

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_initial_superadmin_is_idempotent(pool: PgPool) {
        let first = create_initial_superadmin("boss@example.com", Some("first-password"), &pool)
            .await
            .unwrap();
        let second = create_initial_superadmin("boss@example.com", Some("second-password"), &pool)
            .await
            .unwrap();
        assert_eq!(first, second);

        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);
        let user = users.get_by_email("boss@example.com").await.unwrap().unwrap();
        assert_eq!(user.role, Role::Superadmin);

        // The second call rotated the password
        assert!(password::verify_string("second-password", &user.password_hash).unwrap());
    }
}
