/// JWT token generation and validation module
///
/// Tokens are signed using HS256 (HMAC-SHA256). The subject is a *session*
/// id rather than a user id: possession of the token proves nothing unless
/// the matching session row still exists, so logout revokes every copy of
/// the token at once. A fresh token is issued on every authenticated
/// request, giving each active client a sliding 24-hour window.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: 24 hours from issuance
/// - **Validation**: signature, expiration, issuer, and nbf checks
/// - **Secret Management**: secrets should be at least 32 bytes (256 bits)
///
/// # Example
///
/// ```
/// use trellis_shared::auth::jwt::{issue_token, validate_token};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let session_id = Uuid::new_v4();
/// let secret = "your-secret-key-at-least-32-bytes!!";
///
/// let token = issue_token(session_id, secret)?;
/// let claims = validate_token(&token, secret)?;
/// assert_eq!(claims.sub, session_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const ISSUER: &str = "trellis";

/// Token lifetime from issuance
pub const TOKEN_LIFETIME_HOURS: i64 = 24;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token failed signature, issuer, or format checks
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// JWT claims structure
///
/// # Claims
///
/// - `sub`: Subject (session ID)
/// - `iss`: Issuer (always "trellis")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
/// - `nbf`: Not before timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - Session ID
    pub sub: Uuid,

    /// Issuer - Always "trellis"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates claims for a session, expiring 24 hours from now
    pub fn new(session_id: Uuid) -> Self {
        Self::with_expiration(session_id, Duration::hours(TOKEN_LIFETIME_HOURS))
    }

    /// Creates claims with a custom expiration duration
    pub fn with_expiration(session_id: Uuid, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: session_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs a fresh token for a session
///
/// The secret should be at least 32 bytes, randomly generated, and stored
/// outside the repository.
pub fn issue_token(session_id: Uuid, secret: &str) -> Result<String, JwtError> {
    let claims = Claims::new(session_id);
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, &claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a token and extracts its claims
///
/// Verifies the signature, expiration, issuer, and nbf. Expiration is
/// reported as `JwtError::Expired` so callers can distinguish a stale
/// token from a forged one.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::Invalid(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let session_id = Uuid::new_v4();
        let claims = Claims::new(session_id);

        assert_eq!(claims.sub, session_id);
        assert_eq!(claims.iss, "trellis");
        assert!(!claims.is_expired());
        assert_eq!(claims.exp - claims.iat, TOKEN_LIFETIME_HOURS * 3600);
    }

    #[test]
    fn test_issue_and_validate_token() {
        let session_id = Uuid::new_v4();

        let token = issue_token(session_id, SECRET).expect("Should create token");
        let validated = validate_token(&token, SECRET).expect("Should validate token");

        assert_eq!(validated.sub, session_id);
        assert_eq!(validated.iss, "trellis");
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let token = issue_token(Uuid::new_v4(), SECRET).expect("Should create token");

        let result = validate_token(&token, "a-different-secret-also-32-bytes-xx");
        assert!(matches!(result, Err(JwtError::Invalid(_))));
    }

    #[test]
    fn test_validate_expired_token() {
        let claims = Claims::with_expiration(Uuid::new_v4(), Duration::seconds(-3600));
        assert!(claims.is_expired());

        let header = Header::new(Algorithm::HS256);
        let key = EncodingKey::from_secret(SECRET.as_bytes());
        let token = encode(&header, &claims, &key).expect("Should encode");

        let result = validate_token(&token, SECRET);
        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_validate_garbage_token() {
        let result = validate_token("not.a.token", SECRET);
        assert!(matches!(result, Err(JwtError::Invalid(_))));
    }

    #[test]
    fn test_reissued_tokens_share_subject() {
        let session_id = Uuid::new_v4();

        let first = issue_token(session_id, SECRET).expect("Should create token");
        let second = issue_token(session_id, SECRET).expect("Should create token");

        let a = validate_token(&first, SECRET).expect("Should validate");
        let b = validate_token(&second, SECRET).expect("Should validate");
        assert_eq!(a.sub, b.sub);
    }
}
