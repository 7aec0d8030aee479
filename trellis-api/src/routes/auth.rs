/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/login` - Verify credentials, open a session, set cookie
/// - `GET /auth/logout` - Revoke the session, clear the cookie
/// - `GET /auth/check` - Return the authenticated user

use axum::{extract::State, Extension, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use validator::Validate;

use trellis_shared::auth::session;
use trellis_shared::models::user::UserSummary;

use crate::{
    app::AppState,
    error::{validation_failed, ApiResult, Envelope},
    middleware::session::{removal_cookie, session_cookie, CurrentUser},
};

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

fn summary(user: &trellis_shared::models::user::User) -> UserSummary {
    UserSummary {
        id: user.id,
        email: user.email.clone(),
        full_name: user.full_name.clone(),
    }
}

/// Login handler
///
/// Verifies credentials and issues the session cookie. Wrong email and
/// wrong password both come back as the same 400, and no cookie is set
/// on failure.
///
/// # Endpoint
///
/// ```text
/// POST /auth/login
/// Content-Type: application/json
///
/// { "email": "user@example.com", "password": "secret1" }
/// ```
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> ApiResult<(CookieJar, Json<Envelope<UserSummary>>)> {
    req.validate().map_err(validation_failed)?;

    let (user, token) =
        session::authenticate(&state.db, &req.email, &req.password, state.jwt_secret()).await?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok((
        jar.add(session_cookie(token)),
        Json(Envelope::data(summary(&user))),
    ))
}

/// Logout handler
///
/// Revokes the current session and clears the cookie. Every other copy
/// of the token dies with the session row.
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Json<Envelope<()>>)> {
    session::revoke(&state.db, current.session_id).await?;

    tracing::info!(user_id = %current.user.id, "User logged out");

    Ok((
        jar.add(removal_cookie()),
        Json(Envelope::message("Logged out")),
    ))
}

/// Session check handler
///
/// Returns the authenticated user; reaching this handler at all proves
/// the session is alive, and the middleware has already slid the expiry.
pub async fn check(
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<Envelope<UserSummary>>> {
    Ok(Json(Envelope::data(summary(&current.user))))
}
