/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup
/// - Test user and session creation
/// - Session cookie helpers
/// - API client helpers

use trellis_api::app::{build_router, AppState};
use trellis_api::config::Config;
use trellis_shared::auth::{jwt, password};
use trellis_shared::models::project::{CreateProject, Project};
use trellis_shared::models::session::Session;
use trellis_shared::models::user::{CreateUser, User};
use sqlx::PgPool;
use uuid::Uuid;

/// Password assigned to every user created by the test harness
pub const TEST_PASSWORD: &str = "correct horse battery staple";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub token: String,
}

impl TestContext {
    /// Creates a new test context with a fresh user and live session
    pub async fn new() -> anyhow::Result<Self> {
        // Load test configuration
        let config = Config::from_env()?;

        // Connect to database
        let db = PgPool::connect(&config.database.url).await?;

        // Run migrations (path relative to Cargo.toml, not this file)
        sqlx::migrate!("../trellis-shared/migrations").run(&db).await?;

        // Create test user
        let user = User::create(
            &db,
            CreateUser {
                email: format!("test-{}@example.com", Uuid::new_v4()),
                full_name: "Test User".to_string(),
                password_hash: password::hash_password(TEST_PASSWORD)?,
            },
        )
        .await?;

        // Allocate a session and sign its id into a token
        let session = Session::allocate(&db, user.id).await?;
        let token = jwt::issue_token(session.id, &config.jwt.secret)?;

        // Build app
        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            token,
        })
    }

    /// Returns the session cookie header value
    pub fn cookie_header(&self) -> String {
        format!("jwt={}", self.token)
    }

    /// Creates a second user with a live session, for access-control tests
    pub async fn other_user(&self) -> anyhow::Result<(User, String)> {
        let user = User::create(
            &self.db,
            CreateUser {
                email: format!("test-{}@example.com", Uuid::new_v4()),
                full_name: "Other User".to_string(),
                password_hash: password::hash_password(TEST_PASSWORD)?,
            },
        )
        .await?;

        let session = Session::allocate(&self.db, user.id).await?;
        let token = jwt::issue_token(session.id, &self.config.jwt.secret)?;
        Ok((user, token))
    }

    /// Cleans up test data
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        // Deleting a project cascades to memberships, modules, columns, and
        // tasks; project ownership itself does not cascade from users.
        sqlx::query(
            "DELETE FROM projects WHERE owner_id IN \
             (SELECT id FROM users WHERE email LIKE 'test-%@example.com')",
        )
        .execute(&self.db)
        .await?;
        sqlx::query("DELETE FROM users WHERE email LIKE 'test-%@example.com'")
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

/// Helper to create a project owned by the context's user
pub async fn create_test_project(ctx: &TestContext, name: &str) -> anyhow::Result<Project> {
    let project = Project::create(
        &ctx.db,
        CreateProject {
            name: name.to_string(),
            description: None,
            owner_id: ctx.user.id,
        },
    )
    .await?;
    Ok(project)
}

/// Parses a response body as the `{ok, data?, message?}` envelope
pub async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&body).expect("Response body was not valid JSON")
}
