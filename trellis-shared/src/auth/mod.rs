/// Authentication and access control
///
/// - `password`: Argon2id hashing and verification
/// - `jwt`: signed session tokens (HS256)
/// - `session`: login, per-request session resolution, logout
/// - `access`: project and module access predicates
pub mod access;
pub mod jwt;
pub mod password;
pub mod session;

pub use access::{AccessError, ModuleAccess};
pub use jwt::{issue_token, validate_token, Claims, JwtError};
pub use password::{hash_password, verify_password, PasswordError};
pub use session::{AuthError, ResolvedSession};
