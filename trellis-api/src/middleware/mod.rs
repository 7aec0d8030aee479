/// HTTP middleware
///
/// - `session`: cookie-based session authentication with sliding expiry

pub mod session;

pub use session::{session_auth, CurrentUser};
