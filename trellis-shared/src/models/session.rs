/// Session model and database operations
///
/// A session row correlates an opaque identifier with a user. The identifier
/// is embedded in the signed client token; deleting the row revokes the
/// session regardless of the token's remaining lifetime.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE sessions (
///     id UUID PRIMARY KEY,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::{user::User, ModelResult};

/// Server-side session record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    /// Opaque session identifier carried inside the signed token
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// When the session was opened
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Allocates a fresh session for a user
    ///
    /// Generates identifiers until one is confirmed unused against the
    /// store, then inserts it. The collision probability of a v4 UUID is
    /// negligible, but the contract is check-and-retry, not
    /// generate-and-trust.
    pub async fn allocate(pool: &PgPool, user_id: Uuid) -> ModelResult<Self> {
        let id = loop {
            let candidate = Uuid::new_v4();
            if Self::find_by_id(pool, candidate).await?.is_none() {
                break candidate;
            }
        };

        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (id, user_id)
            VALUES ($1, $2)
            RETURNING id, user_id, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(session)
    }

    /// Finds a session by its identifier
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> ModelResult<Option<Self>> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_id, created_at
            FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(session)
    }

    /// Finds the user owning a session, if the session still exists
    ///
    /// `None` means the session was revoked (e.g. by logout): the caller
    /// must treat a well-formed token whose session is gone as expired.
    pub async fn find_user(pool: &PgPool, session_id: Uuid) -> ModelResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.email, u.full_name, u.password_hash, u.system_role,
                   u.created_at, u.updated_at
            FROM users u
            JOIN sessions s ON s.user_id = u.id
            WHERE s.id = $1
            "#,
        )
        .bind(session_id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Deletes a session, revoking it
    ///
    /// Returns true if a row was deleted. Revoking an already-gone session
    /// is not an error; logout must be idempotent.
    pub async fn revoke(pool: &PgPool, session_id: Uuid) -> ModelResult<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(session_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
