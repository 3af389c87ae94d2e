//! # parkctl: Control Layer for Parking Facilities
//!
//! `parkctl` is a control plane for parking facilities: administrators manage
//! a catalog of lots with fixed spot counts and hourly prices, end users book
//! and release spots, and the system tracks occupancy and bills by elapsed
//! time.
//!
//! ## Overview
//!
//! The heart of the system is a small invariant-bearing state machine. Every
//! spot cycles `available -> occupied -> available`; every reservation is
//! opened once and closed exactly once, recording its leaving time and cost
//! in the same step. The rules that matter - no double-booking a spot, at
//! most one active reservation per user, a lot can never shrink below or be
//! deleted under its occupied spots, and cost equals hourly price times
//! elapsed hours at the lot's price when the car leaves - are enforced in one
//! place, inside transactions, and backed by database constraints.
//!
//! ### Request Flow
//!
//! A request passes through the authentication extractor (session cookie or
//! bearer token), reaches a handler, and the handler drives one repository or
//! the allocation orchestrator inside a single transaction. Nothing commits
//! halfway: a failed booking leaves no occupied spot behind, a failed release
//! leaves the reservation open.
//!
//! ### Core Components
//!
//! The **API layer** ([`api`]) exposes a JSON REST interface: lot
//! administration for admins, booking/release/history for users, and
//! dashboard aggregates (occupancy per lot, total revenue).
//!
//! The **authentication layer** ([`auth`]) handles Argon2 password hashing
//! and stateless JWT sessions, delivered as a cookie for browsers or a bearer
//! token for API clients.
//!
//! The **database layer** ([`db`]) uses the repository pattern over SQLite.
//! The lot catalog and user accounts are plain CRUD repositories; the spot
//! registry and the reservation ledger expose compare-and-set transitions
//! whose affected-row counts decide races.
//!
//! The **allocation service** ([`allocation`]) is the only code that touches
//! spots and reservations together, and does so atomically.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use parkctl::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Parse CLI arguments and load configuration
//!     let args = parkctl::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     // Initialize telemetry (structured logging)
//!     parkctl::telemetry::init_telemetry()?;
//!
//!     // Create and start the application
//!     let app = Application::new(config).await?;
//!
//!     // Run with graceful shutdown on Ctrl+C
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     }).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! The application uses a single SQLite database and automatically runs
//! migrations on startup:
//!
//! ```no_run
//! # use sqlx::SqlitePool;
//! # async fn example(pool: SqlitePool) -> Result<(), sqlx::Error> {
//! parkctl::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod allocation;
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod openapi;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub mod test_utils;

use crate::{
    db::{
        handlers::{Repository, Users},
        models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    },
    errors::Error,
    openapi::ApiDoc,
};
use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, patch, post},
};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::str::FromStr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use config::Config;
pub use types::{LotId, ReservationId, SpotId, UserId};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
}

/// Get the parkctl database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial admin user if it doesn't exist.
///
/// This function is idempotent - it will create a new admin user if one
/// doesn't exist, or update the password if the user already exists. It is
/// called during application startup so an admin account is always
/// available.
#[instrument(skip(password, db))]
pub async fn create_initial_admin_user(username: &str, password: Option<&str>, db: &SqlitePool) -> errors::Result<UserId> {
    let password_hash = password.map(auth::password::hash_password).transpose()?;

    let mut tx = db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut tx);

    if let Some(existing_user) = user_repo.get_by_username(username).await? {
        if password_hash.is_some() {
            user_repo.update(existing_user.id, &UserUpdateDBRequest { password_hash }).await?;
        }
        tx.commit().await.map_err(|e| Error::Database(e.into()))?;
        return Ok(existing_user.id);
    }

    let created_user = user_repo
        .create(&UserCreateDBRequest {
            username: username.to_string(),
            password_hash,
            is_admin: true,
        })
        .await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;
    info!(username, "created initial admin user");

    Ok(created_user.id)
}

/// Open the connection pool, run migrations, and seed the admin account.
async fn setup_database(config: &Config) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
        .connect_with(options)
        .await?;

    migrator().run(&pool).await?;

    create_initial_admin_user(&config.admin_username, config.admin_password.as_deref(), &pool).await?;

    Ok(pool)
}

fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    if config.cors.allowed_origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }

    let origins = config
        .cors
        .allowed_origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}

/// Assemble the full router: authentication, the versioned API, health, and docs.
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    // Authentication routes at root level
    let auth_routes = Router::new()
        .route("/authentication/register", post(api::handlers::auth::register))
        .route("/authentication/login", post(api::handlers::auth::login))
        .route("/authentication/logout", post(api::handlers::auth::logout))
        .with_state(state.clone());

    // API routes
    let api_routes = Router::new()
        // Lot catalog (admin only for write operations)
        .route("/lots", get(api::handlers::lots::list_lots))
        .route("/lots", post(api::handlers::lots::create_lot))
        .route("/lots/{id}", get(api::handlers::lots::get_lot))
        .route("/lots/{id}", patch(api::handlers::lots::update_lot))
        .route("/lots/{id}", delete(api::handlers::lots::delete_lot))
        .route("/lots/{id}/spots", get(api::handlers::lots::list_lot_spots))
        // Booking into a lot
        .route("/lots/{id}/reservations", post(api::handlers::reservations::book_spot))
        // Reservation lifecycle and history
        .route("/reservations", get(api::handlers::reservations::list_history))
        .route("/reservations/active", get(api::handlers::reservations::get_active))
        .route("/reservations/usage", get(api::handlers::reservations::usage_counts))
        .route("/reservations/{id}/release", post(api::handlers::reservations::release_spot))
        // Dashboards
        .route("/analytics/occupancy", get(api::handlers::analytics::occupancy_summary))
        .route("/analytics/revenue", get(api::handlers::analytics::total_revenue))
        // User administration
        .route("/users", get(api::handlers::users::list_users))
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { axum::Json(ApiDoc::openapi()) }))
        .merge(auth_routes)
        .nest("/api/v1", api_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    // Create CORS layer from config
    let cors_layer = create_cors_layer(&state.config)?;

    // Add tracing layer
    let router = router.layer(cors_layer).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// The assembled application: router, state, and database pool.
pub struct Application {
    router: Router,
    config: Config,
    pool: SqlitePool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting parking control layer with configuration: {:#?}", config);

        let pool = setup_database(&config).await?;

        let state = AppState {
            db: pool.clone(),
            config: config.clone(),
        };
        let router = build_router(state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Parking control layer listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        // Run the server with graceful shutdown
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        // Close database connections
        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
