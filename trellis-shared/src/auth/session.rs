/// Session lifecycle: login, per-request resolution, logout
///
/// Every login allocates a server-side session row and hands the client a
/// signed token whose subject is the session id. Resolution looks the
/// session back up on every request; a missing row means the session was
/// revoked, regardless of how much lifetime the token has left. Resolution
/// also re-issues a fresh token so an active client's expiry keeps sliding
/// forward.

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::jwt::{self, JwtError};
use crate::auth::password::{self, PasswordError};
use crate::models::session::Session;
use crate::models::user::User;

/// Error type for session operations
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Email unknown or password wrong; deliberately indistinguishable
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Request carried no token
    #[error("Authentication token missing")]
    MissingToken,

    /// Token failed signature or format checks
    #[error("Authentication token invalid")]
    TokenInvalid,

    /// Token expired
    #[error("Authentication token expired")]
    TokenExpired,

    /// Token was valid but the session has been revoked
    #[error("Session expired")]
    SessionExpired,

    /// Failed to sign a token
    #[error("Failed to issue token: {0}")]
    TokenIssue(String),

    /// Underlying password hashing failure
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Underlying database failure
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// Failure inside a model operation
    #[error(transparent)]
    Model(#[from] crate::models::ModelError),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::TokenExpired,
            JwtError::Invalid(_) => AuthError::TokenInvalid,
            JwtError::CreateError(msg) => AuthError::TokenIssue(msg),
        }
    }
}

/// Outcome of resolving an incoming token
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    /// User the session belongs to
    pub user: User,

    /// Session backing the token
    pub session_id: Uuid,

    /// Fresh token with a full 24-hour window; the caller sends this
    /// back to the client in place of the one it presented
    pub token: String,
}

/// Verifies credentials and opens a session
///
/// Returns the user together with a signed token for the new session.
/// Unknown emails and wrong passwords produce the same error.
pub async fn authenticate(
    pool: &PgPool,
    email: &str,
    password: &str,
    secret: &str,
) -> Result<(User, String), AuthError> {
    let user = User::find_by_email(pool, email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !password::verify_password(password, &user.password_hash)? {
        return Err(AuthError::InvalidCredentials);
    }

    let session = Session::allocate(pool, user.id).await?;
    let token = jwt::issue_token(session.id, secret)?;

    Ok((user, token))
}

/// Resolves an incoming token to its user and a fresh replacement token
///
/// Fails with `TokenExpired` or `TokenInvalid` when the token itself is
/// bad, and with `SessionExpired` when the token verifies but its session
/// row no longer exists.
pub async fn resolve(pool: &PgPool, token: &str, secret: &str) -> Result<ResolvedSession, AuthError> {
    let claims = jwt::validate_token(token, secret)?;

    let user = Session::find_user(pool, claims.sub)
        .await?
        .ok_or(AuthError::SessionExpired)?;

    let fresh = jwt::issue_token(claims.sub, secret)?;

    Ok(ResolvedSession {
        user,
        session_id: claims.sub,
        token: fresh,
    })
}

/// Revokes a session
///
/// Idempotent: revoking an already-revoked session is not an error.
pub async fn revoke(pool: &PgPool, session_id: Uuid) -> Result<(), AuthError> {
    Session::revoke(pool, session_id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_error_mapping() {
        assert!(matches!(
            AuthError::from(JwtError::Expired),
            AuthError::TokenExpired
        ));
        assert!(matches!(
            AuthError::from(JwtError::Invalid("bad".into())),
            AuthError::TokenInvalid
        ));
        assert!(matches!(
            AuthError::from(JwtError::CreateError("oops".into())),
            AuthError::TokenIssue(_)
        ));
    }

    #[test]
    fn test_invalid_credentials_message_is_generic() {
        // The message must not reveal whether the email or the password
        // was wrong.
        let msg = AuthError::InvalidCredentials.to_string();
        assert!(!msg.to_lowercase().contains("email not found"));
        assert_eq!(msg, "Invalid email or password");
    }
}
