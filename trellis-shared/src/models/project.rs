/// Project model and database operations
///
/// Projects are the top of the kanban hierarchy. Every module, column, and
/// task transitively belongs to exactly one project, and all access checks
/// resolve up to a membership test against it. The owner is implicitly the
/// highest-privilege member; deleting a project cascades to its modules,
/// columns, tasks, and memberships by foreign-key policy.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     description TEXT,
///     owner_id UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::{ModelError, ModelResult};

const DESCRIPTION_MAX: usize = 1000;

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    /// Name (3-255 characters)
    pub name: String,

    /// Optional description (up to 1000 characters)
    pub description: Option<String>,

    /// Owning user
    pub owner_id: Uuid,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    /// Name (3-255 characters)
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Owning user
    pub owner_id: Uuid,
}

/// Input for renaming a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProject {
    /// New name
    pub name: String,

    /// New description (None clears it)
    pub description: Option<String>,
}

fn validate_fields(name: &str, description: Option<&str>) -> ModelResult<()> {
    if name.len() < 3 || name.len() > 255 {
        return Err(ModelError::validation("name", "must be 3-255 characters"));
    }
    if let Some(desc) = description {
        if desc.len() > DESCRIPTION_MAX {
            return Err(ModelError::validation(
                "description",
                "must be at most 1000 characters",
            ));
        }
    }
    Ok(())
}

impl CreateProject {
    /// Checks the entity invariants before insert
    pub fn validate(&self) -> ModelResult<()> {
        validate_fields(&self.name, self.description.as_deref())
    }
}

impl UpdateProject {
    /// Checks the entity invariants before update
    pub fn validate(&self) -> ModelResult<()> {
        validate_fields(&self.name, self.description.as_deref())
    }
}

impl Project {
    /// Creates a new project and records the owner's membership
    ///
    /// The owner gets a PROJECT_MANAGER membership row in the same
    /// transaction, so they appear in the members list from the start.
    pub async fn create(pool: &PgPool, data: CreateProject) -> ModelResult<Self> {
        data.validate()?;

        let mut tx = pool.begin().await?;

        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, description, owner_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, owner_id, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.owner_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO project_members (project_id, user_id, project_role)
            VALUES ($1, $2, 'PROJECT_MANAGER')
            "#,
        )
        .bind(project.id)
        .bind(project.owner_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> ModelResult<Option<Self>> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, owner_id, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists all projects a user can see: owned, or joined as a member
    ///
    /// Newest first.
    pub async fn find_all_for_user(pool: &PgPool, user_id: Uuid) -> ModelResult<Vec<Self>> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT DISTINCT p.id, p.name, p.description, p.owner_id, p.created_at, p.updated_at
            FROM projects p
            LEFT JOIN project_members pm ON p.id = pm.project_id
            WHERE p.owner_id = $1 OR pm.user_id = $1
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Updates name and description
    ///
    /// Owner and timestamps are immutable post-insert; only the mutable
    /// fields are written.
    pub async fn update(pool: &PgPool, id: Uuid, data: UpdateProject) -> ModelResult<Self> {
        data.validate()?;

        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET name = $2, description = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, owner_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.description)
        .fetch_optional(pool)
        .await?
        .ok_or(ModelError::NotFound("project"))?;

        Ok(project)
    }

    /// Deletes a project
    ///
    /// Cascades to modules, columns, tasks, and memberships.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotFound`] if no row was affected.
    pub async fn delete(pool: &PgPool, id: Uuid) -> ModelResult<()> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ModelError::NotFound("project"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_length_bounds() {
        let owner_id = Uuid::new_v4();

        let too_short = CreateProject {
            name: "ab".to_string(),
            description: None,
            owner_id,
        };
        assert!(too_short.validate().is_err());

        let minimum = CreateProject {
            name: "abc".to_string(),
            description: None,
            owner_id,
        };
        assert!(minimum.validate().is_ok());

        let maximum = CreateProject {
            name: "a".repeat(255),
            description: None,
            owner_id,
        };
        assert!(maximum.validate().is_ok());

        let too_long = CreateProject {
            name: "a".repeat(256),
            description: None,
            owner_id,
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_description_limit() {
        let ok = CreateProject {
            name: "Demo".to_string(),
            description: Some("d".repeat(1000)),
            owner_id: Uuid::new_v4(),
        };
        assert!(ok.validate().is_ok());

        let too_long = CreateProject {
            name: "Demo".to_string(),
            description: Some("d".repeat(1001)),
            owner_id: Uuid::new_v4(),
        };
        let err = too_long.validate().unwrap_err();
        assert!(matches!(
            err,
            ModelError::Validation {
                field: "description",
                ..
            }
        ));
    }
}
