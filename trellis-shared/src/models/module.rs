/// Module model and database operations
///
/// A module is a task list within a project: the container for kanban
/// columns and tasks. Access to columns and tasks is always checked against
/// the module's parent project.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE modules (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     description TEXT,
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     start_date DATE,
///     end_date DATE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::{ModelError, ModelResult};

/// Module model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Module {
    /// Unique module ID
    pub id: Uuid,

    /// Name (1-255 characters)
    pub name: String,

    /// Optional description (up to 1000 characters)
    pub description: Option<String>,

    /// Parent project
    pub project_id: Uuid,

    /// Optional planned start date
    pub start_date: Option<NaiveDate>,

    /// Optional planned end date
    pub end_date: Option<NaiveDate>,

    /// When the module was created
    pub created_at: DateTime<Utc>,

    /// When the module was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a module
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateModule {
    pub name: String,
    pub description: Option<String>,
    pub project_id: Uuid,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Input for updating a module
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateModule {
    pub name: String,
    pub description: Option<String>,
}

fn validate_fields(name: &str, description: Option<&str>) -> ModelResult<()> {
    if name.is_empty() || name.len() > 255 {
        return Err(ModelError::validation("name", "must be 1-255 characters"));
    }
    if let Some(desc) = description {
        if desc.len() > 1000 {
            return Err(ModelError::validation(
                "description",
                "must be at most 1000 characters",
            ));
        }
    }
    Ok(())
}

impl CreateModule {
    /// Checks the entity invariants before insert
    pub fn validate(&self) -> ModelResult<()> {
        validate_fields(&self.name, self.description.as_deref())
    }
}

impl UpdateModule {
    /// Checks the entity invariants before update
    pub fn validate(&self) -> ModelResult<()> {
        validate_fields(&self.name, self.description.as_deref())
    }
}

impl Module {
    /// Creates a new module
    pub async fn create(pool: &PgPool, data: CreateModule) -> ModelResult<Self> {
        data.validate()?;

        let module = sqlx::query_as::<_, Module>(
            r#"
            INSERT INTO modules (name, description, project_id, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, project_id, start_date, end_date,
                      created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.project_id)
        .bind(data.start_date)
        .bind(data.end_date)
        .fetch_one(pool)
        .await?;

        Ok(module)
    }

    /// Finds a module by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> ModelResult<Option<Self>> {
        let module = sqlx::query_as::<_, Module>(
            r#"
            SELECT id, name, description, project_id, start_date, end_date,
                   created_at, updated_at
            FROM modules
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(module)
    }

    /// Lists all modules of a project, oldest first
    pub async fn find_all_for_project(pool: &PgPool, project_id: Uuid) -> ModelResult<Vec<Self>> {
        let modules = sqlx::query_as::<_, Module>(
            r#"
            SELECT id, name, description, project_id, start_date, end_date,
                   created_at, updated_at
            FROM modules
            WHERE project_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(modules)
    }

    /// Updates name and description
    pub async fn update(pool: &PgPool, id: Uuid, data: UpdateModule) -> ModelResult<Self> {
        data.validate()?;

        let module = sqlx::query_as::<_, Module>(
            r#"
            UPDATE modules
            SET name = $2, description = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, project_id, start_date, end_date,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.description)
        .fetch_optional(pool)
        .await?
        .ok_or(ModelError::NotFound("module"))?;

        Ok(module)
    }

    /// Deletes a module
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotFound`] if no row was affected.
    pub async fn delete(pool: &PgPool, id: Uuid) -> ModelResult<()> {
        let result = sqlx::query("DELETE FROM modules WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ModelError::NotFound("module"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_name_rejected() {
        let input = CreateModule {
            name: String::new(),
            description: None,
            project_id: Uuid::new_v4(),
            start_date: None,
            end_date: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_single_char_name_allowed() {
        let input = CreateModule {
            name: "B".to_string(),
            description: None,
            project_id: Uuid::new_v4(),
            start_date: None,
            end_date: None,
        };
        assert!(input.validate().is_ok());
    }
}
