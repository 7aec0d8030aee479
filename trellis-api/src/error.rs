/// Error handling and response envelope for the API server
///
/// All handlers return `Result<T, ApiError>`, which converts into the
/// uniform `{ok, data?, message?}` envelope. Three failure classes exist:
///
/// - `BadRequest` (400): malformed input, business-rule violations, and
///   references to records that do not exist
/// - `Unauthorized` (401): missing/invalid/expired session, or a valid
///   session lacking the required membership or ownership
/// - `Internal` (500): everything else; the detail is logged server-side
///   and never leaked to the client
///
/// # Example
///
/// ```ignore
/// async fn handler() -> ApiResult<Json<Envelope<Project>>> {
///     let project = fetch_project().await?;
///     Ok(Json(Envelope::data(project)))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

use trellis_shared::auth::access::AccessError;
use trellis_shared::auth::password::PasswordError;
use trellis_shared::auth::session::AuthError;
use trellis_shared::models::ModelError;
use trellis_shared::ordering::OrderingError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Uniform response envelope
///
/// Every response body, success or failure, takes this shape.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    /// Whether the request succeeded
    pub ok: bool,

    /// Payload, present on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Human-readable message, present on failure or bare acknowledgements
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> Envelope<T> {
    /// Success envelope carrying a payload
    pub fn data(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            message: None,
        }
    }
}

impl Envelope<()> {
    /// Success envelope with a message and no payload
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400): validation failures and missing records
    BadRequest(String),

    /// Unauthorized (401): session or permission failures
    Unauthorized(String),

    /// Internal server error (500)
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Internal(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(Envelope::<()> {
            ok: false,
            data: None,
            message: Some(message),
        });

        (status, body).into_response()
    }
}

/// Joins schema-validation failures into one 400 message
pub fn validation_failed(errors: validator::ValidationErrors) -> ApiError {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect();
    messages.sort();
    ApiError::BadRequest(messages.join(", "))
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Validation { .. } | ModelError::NotFound(_) => {
                ApiError::BadRequest(err.to_string())
            }
            ModelError::Database(e) => ApiError::Internal(format!("Database error: {}", e)),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::BadRequest(err.to_string()),
            AuthError::MissingToken
            | AuthError::TokenInvalid
            | AuthError::TokenExpired
            | AuthError::SessionExpired => ApiError::Unauthorized(err.to_string()),
            AuthError::TokenIssue(msg) => ApiError::Internal(msg),
            AuthError::Password(e) => ApiError::Internal(e.to_string()),
            AuthError::Database(e) => ApiError::Internal(format!("Database error: {}", e)),
            AuthError::Model(e) => ApiError::from(e),
        }
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Denied => ApiError::Unauthorized(err.to_string()),
            AccessError::NotFound(_) => ApiError::BadRequest(err.to_string()),
            AccessError::Database(e) => ApiError::Internal(format!("Database error: {}", e)),
            AccessError::Model(e) => ApiError::from(e),
        }
    }
}

impl From<OrderingError> for ApiError {
    fn from(err: OrderingError) -> Self {
        match err {
            OrderingError::DuplicateId(_) | OrderingError::UnknownId(_) => {
                ApiError::BadRequest(err.to_string())
            }
            OrderingError::Database(e) => ApiError::Internal(format!("Database error: {}", e)),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(format!("Password operation failed: {}", err))
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Internal(format!("Database error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::Unauthorized("Session expired".to_string());
        assert_eq!(err.to_string(), "Unauthorized: Session expired");
    }

    #[test]
    fn test_envelope_data_shape() {
        let envelope = Envelope::data(42);
        let json = serde_json::to_value(&envelope).expect("serializes");
        assert_eq!(json, serde_json::json!({ "ok": true, "data": 42 }));
    }

    #[test]
    fn test_envelope_message_shape() {
        let envelope = Envelope::message("Logged out");
        let json = serde_json::to_value(&envelope).expect("serializes");
        assert_eq!(json, serde_json::json!({ "ok": true, "message": "Logged out" }));
    }

    #[test]
    fn test_model_error_mapping() {
        let err: ApiError = ModelError::NotFound("project").into();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err: ApiError = ModelError::validation("name", "name must be at least 3 characters").into();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_auth_error_mapping() {
        let err: ApiError = AuthError::SessionExpired.into();
        assert!(matches!(err, ApiError::Unauthorized(_)));

        let err: ApiError = AuthError::InvalidCredentials.into();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_access_error_mapping() {
        let err: ApiError = AccessError::Denied.into();
        assert!(matches!(err, ApiError::Unauthorized(_)));

        let err: ApiError = AccessError::NotFound("module").into();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
