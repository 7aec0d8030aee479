/// User endpoints
///
/// # Endpoints
///
/// - `POST /users` - Register a new account
/// - `PATCH /users/password` - Change password, revoking the session
/// - `GET /users/search?email=` - Find users to invite to a project

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use validator::Validate;

use trellis_shared::auth::{password, session};
use trellis_shared::models::user::{CreateUser, User, UserSummary};

use crate::{
    app::AppState,
    error::{validation_failed, ApiError, ApiResult, Envelope},
    middleware::session::{removal_cookie, CurrentUser},
};

/// Registration request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Email address
    #[validate(
        email(message = "email must be a valid address"),
        length(max = 255, message = "email must be at most 255 characters")
    )]
    pub email: String,

    /// Display name
    #[validate(length(min = 2, max = 255, message = "full name must be 2-255 characters"))]
    pub full_name: String,

    /// Password
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
}

/// Password change request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// Current password, re-verified before the change
    #[validate(length(min = 1, message = "old password is required"))]
    pub old_password: String,

    /// Replacement password
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub new_password: String,
}

/// User search query parameters
///
/// `email` is optional at the extractor level so a missing parameter gets
/// the same enveloped rejection as a too-short one.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Email fragment, at least 2 characters
    pub email: Option<String>,
}

/// Registration handler
///
/// Creates the account; the user logs in separately afterwards.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<Envelope<UserSummary>>)> {
    req.validate().map_err(validation_failed)?;

    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::BadRequest("email is already in use".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            full_name: req.full_name,
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(Envelope::data(UserSummary {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
        })),
    ))
}

/// Password change handler
///
/// Re-verifies the old password, writes the new hash, then revokes the
/// current session and clears the cookie so the user logs in again.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<(CookieJar, Json<Envelope<()>>)> {
    req.validate().map_err(validation_failed)?;

    if !password::verify_password(&req.old_password, &current.user.password_hash)? {
        return Err(ApiError::BadRequest("old password is incorrect".to_string()));
    }

    let new_hash = password::hash_password(&req.new_password)?;
    User::update_password(&state.db, current.user.id, &new_hash).await?;

    session::revoke(&state.db, current.session_id).await?;

    tracing::info!(user_id = %current.user.id, "User changed password");

    Ok((
        jar.add(removal_cookie()),
        Json(Envelope::message("Password changed, please log in again")),
    ))
}

/// User search handler
///
/// Finds up to 5 users whose email contains the fragment, excluding the
/// caller. Backs the member-invite picker.
pub async fn search(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Envelope<Vec<UserSummary>>>> {
    let fragment = query.email.as_deref().unwrap_or("").trim();
    if fragment.len() < 2 {
        return Err(ApiError::BadRequest(
            "search query must be at least 2 characters".to_string(),
        ));
    }

    let matches = User::search_by_email(&state.db, fragment, current.user.id).await?;

    Ok(Json(Envelope::data(matches)))
}
