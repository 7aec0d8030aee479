/// Project membership model and database operations
///
/// A membership row links a user to a project with a per-project role. At
/// most one row exists per (project, user) pair. The owner's PROJECT_MANAGER
/// row is written when the project is created; the project owner is also
/// implicitly authorized even if the row is missing, and task creation
/// re-provisions it on demand in that case.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE project_role AS ENUM ('PROJECT_MANAGER', 'DEVELOPER', 'STAKEHOLDER');
///
/// CREATE TABLE project_members (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     project_role project_role NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (project_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::{ModelError, ModelResult};

/// Per-project role of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectRole {
    /// Manages the board; assigned to the owner automatically
    ProjectManager,

    /// Works on tasks
    Developer,

    /// Observes progress
    Stakeholder,
}

/// Membership row linking a user to a project
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectMember {
    /// Membership ID (referenced by tasks as reporter/assignee)
    pub id: Uuid,

    /// Project
    pub project_id: Uuid,

    /// User
    pub user_id: Uuid,

    /// Role within the project
    pub project_role: ProjectRole,

    /// When the membership was created
    pub created_at: DateTime<Utc>,
}

/// Membership joined with user details, for the members screen
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MemberDetails {
    pub id: Uuid,
    pub user_id: Uuid,
    pub project_role: ProjectRole,
    pub full_name: String,
    pub email: String,
}

/// Input for creating a membership
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMember {
    /// Project
    pub project_id: Uuid,

    /// User to add
    pub user_id: Uuid,

    /// Role to assign
    pub project_role: ProjectRole,
}

impl ProjectMember {
    /// Creates a membership (adds a user to a project)
    ///
    /// Duplicate prevention for the (project, user) pair is enforced at the
    /// route layer before calling this; the unique constraint is the
    /// backstop.
    pub async fn create(pool: &PgPool, data: CreateMember) -> ModelResult<Self> {
        let member = sqlx::query_as::<_, ProjectMember>(
            r#"
            INSERT INTO project_members (project_id, user_id, project_role)
            VALUES ($1, $2, $3)
            RETURNING id, project_id, user_id, project_role, created_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.user_id)
        .bind(data.project_role)
        .fetch_one(pool)
        .await?;

        Ok(member)
    }

    /// Finds the membership for a (project, user) pair
    pub async fn find_by_project_and_user(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> ModelResult<Option<Self>> {
        let member = sqlx::query_as::<_, ProjectMember>(
            r#"
            SELECT id, project_id, user_id, project_role, created_at
            FROM project_members
            WHERE project_id = $1 AND user_id = $2
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(member)
    }

    /// Lists all members of a project with their user details
    pub async fn list_details(pool: &PgPool, project_id: Uuid) -> ModelResult<Vec<MemberDetails>> {
        let members = sqlx::query_as::<_, MemberDetails>(
            r#"
            SELECT pm.id, pm.user_id, pm.project_role, u.full_name, u.email
            FROM project_members pm
            JOIN users u ON pm.user_id = u.id
            WHERE pm.project_id = $1
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }

    /// Removes a user's membership from a project
    ///
    /// The route layer guards against removing the owner before calling
    /// this. Tasks reported by the member are deleted by cascade.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotFound`] if no membership row was affected.
    pub async fn delete(pool: &PgPool, project_id: Uuid, user_id: Uuid) -> ModelResult<()> {
        let result =
            sqlx::query("DELETE FROM project_members WHERE project_id = $1 AND user_id = $2")
                .bind(project_id)
                .bind(user_id)
                .execute(pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(ModelError::NotFound("project member"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_role_serde_names() {
        let json = serde_json::to_string(&ProjectRole::ProjectManager).unwrap();
        assert_eq!(json, "\"PROJECT_MANAGER\"");

        let role: ProjectRole = serde_json::from_str("\"STAKEHOLDER\"").unwrap();
        assert_eq!(role, ProjectRole::Stakeholder);
    }
}
