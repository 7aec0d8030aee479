/// Session cookie authentication middleware
///
/// The session token travels in an HTTP-only cookie named `jwt`. For every
/// protected request this middleware:
///
/// 1. Reads the cookie and resolves it to a user via the session service
/// 2. Injects [`CurrentUser`] into request extensions for handlers
/// 3. After the handler runs, replaces the cookie with the freshly issued
///    token, so every authenticated request slides the expiry forward
///
/// Any resolution failure (missing cookie, bad signature, expired token,
/// revoked session) responds 401 and clears the cookie, so stale clients
/// stop re-presenting a dead token.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use uuid::Uuid;

use trellis_shared::auth::session::{self, AuthError};
use trellis_shared::models::user::User;

use crate::{app::AppState, error::ApiError};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "jwt";

/// Authenticated identity for the current request
///
/// Present in request extensions on every route behind [`session_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// The authenticated user
    pub user: User,

    /// Session backing this request; logout revokes it
    pub session_id: Uuid,
}

/// Builds the session cookie carrying a token
pub fn session_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(time::Duration::hours(24));
    cookie
}

/// Builds a cookie that instructs the client to drop the session cookie
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(time::Duration::ZERO);
    cookie
}

/// Appends a Set-Cookie header to a response
pub fn set_cookie(response: &mut Response, cookie: Cookie<'static>) {
    if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
}

/// Session authentication middleware
///
/// Applied with `axum::middleware::from_fn_with_state` to every protected
/// router.
pub async fn session_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let token = match jar.get(SESSION_COOKIE) {
        Some(cookie) => cookie.value().to_string(),
        None => return auth_failure(AuthError::MissingToken),
    };

    let resolved = match session::resolve(&state.db, &token, state.jwt_secret()).await {
        Ok(resolved) => resolved,
        Err(err) => return auth_failure(err),
    };

    let fresh_token = resolved.token.clone();
    req.extensions_mut().insert(CurrentUser {
        user: resolved.user,
        session_id: resolved.session_id,
    });

    let mut response = next.run(req).await;

    // Sliding expiry: hand the client a token with a full window, unless
    // the handler already rewrote the cookie (logout, password change)
    let handler_set_cookie = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .any(|value| {
            value
                .to_str()
                .map(|s| s.starts_with(SESSION_COOKIE))
                .unwrap_or(false)
        });

    if !handler_set_cookie {
        set_cookie(&mut response, session_cookie(fresh_token));
    }

    response
}

fn auth_failure(err: AuthError) -> Response {
    tracing::debug!("Session resolution failed: {}", err);

    let mut response = ApiError::from(err).into_response();
    set_cookie(&mut response, removal_cookie());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("token-value".to_string());
        assert_eq!(cookie.name(), "jwt");
        assert_eq!(cookie.value(), "token-value");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::hours(24)));
    }

    #[test]
    fn test_removal_cookie_is_immediate() {
        let cookie = removal_cookie();
        assert_eq!(cookie.name(), "jwt");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
