/// User model and database operations
///
/// Users authenticate with an email and an Argon2id password hash, carry a
/// system-wide role, and participate in projects through the membership
/// model.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE system_role AS ENUM ('USER', 'ADMIN');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email VARCHAR(255) NOT NULL UNIQUE,
///     full_name VARCHAR(255) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     system_role system_role NOT NULL DEFAULT 'USER',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::{ModelError, ModelResult};

/// System-wide role of a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "system_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum SystemRole {
    /// Regular account
    User,

    /// Administrative account
    Admin,
}

/// User model representing an account
///
/// Passwords are stored as Argon2id hashes, never in plaintext. The hash is
/// never serialized into API responses.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Email address, unique across all users
    pub email: String,

    /// Display name (2-255 characters)
    pub full_name: String,

    /// Argon2id password hash
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// System-wide role
    pub system_role: SystemRole,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Reduced user projection returned by email search
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address
    pub email: String,

    /// Display name
    pub full_name: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,
}

impl CreateUser {
    /// Checks the entity invariants before insert
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Validation`] naming the offending field if:
    /// - the email is empty, lacks `@`, or exceeds 255 characters
    /// - the full name is shorter than 2 or longer than 255 characters
    /// - the password hash is empty
    pub fn validate(&self) -> ModelResult<()> {
        if self.email.is_empty() || !self.email.contains('@') || self.email.len() > 255 {
            return Err(ModelError::validation("email", "invalid email address"));
        }
        if self.full_name.len() < 2 || self.full_name.len() > 255 {
            return Err(ModelError::validation(
                "full_name",
                "must be 2-255 characters",
            ));
        }
        if self.password_hash.is_empty() {
            return Err(ModelError::validation("password_hash", "must not be empty"));
        }
        Ok(())
    }
}

impl User {
    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, the email is already taken
    /// (unique constraint), or the database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateUser) -> ModelResult<Self> {
        data.validate()?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, full_name, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, full_name, password_hash, system_role, created_at, updated_at
            "#,
        )
        .bind(data.email)
        .bind(data.full_name)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> ModelResult<Option<Self>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, full_name, password_hash, system_role, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address
    pub async fn find_by_email(pool: &PgPool, email: &str) -> ModelResult<Option<Self>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, full_name, password_hash, system_role, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Searches users by email fragment, excluding the caller
    ///
    /// Returns at most 5 matches as reduced summaries. Used by the member
    /// invitation flow.
    pub async fn search_by_email(
        pool: &PgPool,
        fragment: &str,
        exclude_user_id: Uuid,
    ) -> ModelResult<Vec<UserSummary>> {
        let users = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT id, email, full_name
            FROM users
            WHERE email LIKE $1 AND id != $2
            LIMIT 5
            "#,
        )
        .bind(format!("%{}%", fragment))
        .bind(exclude_user_id)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Replaces the stored password hash
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotFound`] if no user has the given id.
    pub async fn update_password(pool: &PgPool, id: Uuid, new_hash: &str) -> ModelResult<()> {
        if new_hash.is_empty() {
            return Err(ModelError::validation("password_hash", "must not be empty"));
        }

        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(new_hash)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ModelError::NotFound("user"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> CreateUser {
        CreateUser {
            email: "a@x.com".to_string(),
            full_name: "Ada Lovelace".to_string(),
            password_hash: "$argon2id$v=19$m=65536,t=3,p=4$salt$hash".to_string(),
        }
    }

    #[test]
    fn test_valid_user_passes() {
        assert!(valid_input().validate().is_ok());
    }

    #[test]
    fn test_email_without_at_rejected() {
        let mut input = valid_input();
        input.email = "not-an-email".to_string();
        let err = input.validate().unwrap_err();
        assert!(matches!(err, ModelError::Validation { field: "email", .. }));
    }

    #[test]
    fn test_email_too_long_rejected() {
        let mut input = valid_input();
        input.email = format!("{}@x.com", "a".repeat(255));
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_short_full_name_rejected() {
        let mut input = valid_input();
        input.full_name = "A".to_string();
        let err = input.validate().unwrap_err();
        assert!(matches!(
            err,
            ModelError::Validation {
                field: "full_name",
                ..
            }
        ));
    }

    #[test]
    fn test_empty_password_hash_rejected() {
        let mut input = valid_input();
        input.password_hash = String::new();
        assert!(input.validate().is_err());
    }

    // Database-backed tests live in tests/store_tests.rs
}
