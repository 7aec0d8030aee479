/// Application state and router builder
///
/// Defines the shared application state and builds the Axum router with
/// all routes and middleware.

use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Config;
use crate::middleware::session::session_auth;
use crate::routes;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; uses Arc
/// internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets the JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// ├── /auth/
/// │   ├── POST /login                  # Public
/// │   ├── GET  /logout                 # Authenticated
/// │   └── GET  /check                  # Authenticated
/// ├── /users/
/// │   ├── POST  /                      # Registration (public)
/// │   ├── PATCH /password              # Authenticated
/// │   └── GET   /search                # Authenticated
/// ├── /projects/...                    # Authenticated
/// ├── /modules/...                     # Authenticated
/// ├── /columns/...                     # Authenticated
/// └── /tasks/...                       # Authenticated
/// ```
///
/// Every route outside the public set sits behind the session cookie
/// middleware, which injects `CurrentUser` and slides the session expiry.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/auth/login", post(routes::auth::login))
        .route("/users", post(routes::users::register));

    let protected_routes = Router::new()
        .route("/auth/logout", get(routes::auth::logout))
        .route("/auth/check", get(routes::auth::check))
        .route("/users/password", patch(routes::users::change_password))
        .route("/users/search", get(routes::users::search))
        .route(
            "/projects",
            get(routes::projects::list).post(routes::projects::create),
        )
        .route(
            "/projects/:id",
            get(routes::projects::show)
                .put(routes::projects::update)
                .delete(routes::projects::remove),
        )
        .route(
            "/projects/:id/members",
            get(routes::projects::list_members).post(routes::projects::add_member),
        )
        .route(
            "/projects/:id/members/:user_id",
            delete(routes::projects::remove_member),
        )
        .route("/projects/:id/modules", get(routes::modules::list))
        .route("/modules", post(routes::modules::create))
        .route(
            "/modules/:id",
            get(routes::modules::show)
                .put(routes::modules::update)
                .delete(routes::modules::remove),
        )
        .route(
            "/modules/:id/columns",
            get(routes::columns::list).post(routes::columns::create),
        )
        .route(
            "/modules/:id/columns/reorder",
            patch(routes::columns::reorder),
        )
        .route(
            "/columns/:id",
            put(routes::columns::rename).delete(routes::columns::remove),
        )
        .route("/modules/:id/tasks", get(routes::tasks::list))
        .route("/tasks", post(routes::tasks::create))
        .route("/tasks/reorder", patch(routes::tasks::reorder))
        .route(
            "/tasks/:id",
            put(routes::tasks::update).delete(routes::tasks::remove),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_auth,
        ));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
