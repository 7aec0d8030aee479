/// Task model and database operations
///
/// Tasks belong to exactly one module and one column within it.
/// `task_order_index` is the ordering key within the column, with the same
/// semantics as column ordering: compared, never displayed, gaps allowed.
/// The reporter is the project membership row of the user who created the
/// task.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_priority AS ENUM ('LOW', 'MEDIUM', 'HIGH', 'CRITICAL');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     module_id UUID NOT NULL REFERENCES modules(id) ON DELETE CASCADE,
///     column_id UUID NOT NULL REFERENCES kanban_columns(id) ON DELETE CASCADE,
///     assignee_id UUID REFERENCES project_members(id) ON DELETE SET NULL,
///     reporter_id UUID NOT NULL REFERENCES project_members(id) ON DELETE CASCADE,
///     priority task_priority NOT NULL DEFAULT 'MEDIUM',
///     task_order_index INT NOT NULL DEFAULT 0,
///     due_date DATE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::{ModelError, ModelResult};

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Title (required, at least 1 character)
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Parent module
    pub module_id: Uuid,

    /// Column the task currently sits in
    pub column_id: Uuid,

    /// Optional assignee (project membership id)
    pub assignee_id: Option<Uuid>,

    /// Reporter (project membership id of the creator)
    pub reporter_id: Uuid,

    /// Priority, defaults to MEDIUM
    pub priority: TaskPriority,

    /// Ordering key within the column
    pub task_order_index: i32,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub module_id: Uuid,
    pub column_id: Uuid,
    pub reporter_id: Uuid,
    pub priority: TaskPriority,

    /// Explicit ordering key; the sentinel 0 appends after the current
    /// maximum index in the column
    pub task_order_index: i32,

    pub due_date: Option<NaiveDate>,
}

/// Input for updating a task; only non-None fields are written
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<TaskPriority>,
}

impl CreateTask {
    /// Checks the entity invariants before insert
    pub fn validate(&self) -> ModelResult<()> {
        if self.title.is_empty() || self.title.len() > 255 {
            return Err(ModelError::validation("title", "must be 1-255 characters"));
        }
        Ok(())
    }
}

impl Task {
    /// Creates a new task
    ///
    /// With the sentinel index 0 the task is appended after the highest
    /// existing index in its column (an empty column yields 0). Max-lookup
    /// and insert run in one transaction.
    pub async fn create(pool: &PgPool, data: CreateTask) -> ModelResult<Self> {
        data.validate()?;

        let mut tx = pool.begin().await?;

        let task_order_index = if data.task_order_index == 0 {
            let (max,): (Option<i32>,) =
                sqlx::query_as("SELECT MAX(task_order_index) FROM tasks WHERE column_id = $1")
                    .bind(data.column_id)
                    .fetch_one(&mut *tx)
                    .await?;
            max.unwrap_or(-1) + 1
        } else {
            data.task_order_index
        };

        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, module_id, column_id, reporter_id,
                               priority, task_order_index, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, title, description, module_id, column_id, assignee_id,
                      reporter_id, priority, task_order_index, due_date,
                      created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.module_id)
        .bind(data.column_id)
        .bind(data.reporter_id)
        .bind(data.priority)
        .bind(task_order_index)
        .bind(data.due_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> ModelResult<Option<Self>> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, module_id, column_id, assignee_id,
                   reporter_id, priority, task_order_index, due_date,
                   created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists all tasks of a module ordered by their ordering key
    pub async fn find_all_by_module(pool: &PgPool, module_id: Uuid) -> ModelResult<Vec<Self>> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, module_id, column_id, assignee_id,
                   reporter_id, priority, task_order_index, due_date,
                   created_at, updated_at
            FROM tasks
            WHERE module_id = $1
            ORDER BY task_order_index ASC
            "#,
        )
        .bind(module_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Updates mutable task fields
    ///
    /// Parent references and ordering are changed through the ordering
    /// engine, not here.
    pub async fn update(pool: &PgPool, id: Uuid, data: UpdateTask) -> ModelResult<Self> {
        if let Some(ref title) = data.title {
            if title.is_empty() || title.len() > 255 {
                return Err(ModelError::validation("title", "must be 1-255 characters"));
            }
        }

        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, title, description, module_id, column_id, \
             assignee_id, reporter_id, priority, task_order_index, due_date, \
             created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }

        let task = q
            .fetch_optional(pool)
            .await?
            .ok_or(ModelError::NotFound("task"))?;

        Ok(task)
    }

    /// Deletes a task
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotFound`] if no row was affected.
    pub async fn delete(pool: &PgPool, id: Uuid) -> ModelResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ModelError::NotFound("task"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_defaults_to_medium() {
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
    }

    #[test]
    fn test_priority_serde_names() {
        let json = serde_json::to_string(&TaskPriority::Critical).unwrap();
        assert_eq!(json, "\"CRITICAL\"");

        let priority: TaskPriority = serde_json::from_str("\"LOW\"").unwrap();
        assert_eq!(priority, TaskPriority::Low);
    }

    #[test]
    fn test_empty_title_rejected() {
        let input = CreateTask {
            title: String::new(),
            description: None,
            module_id: Uuid::new_v4(),
            column_id: Uuid::new_v4(),
            reporter_id: Uuid::new_v4(),
            priority: TaskPriority::default(),
            task_order_index: 0,
            due_date: None,
        };
        let err = input.validate().unwrap_err();
        assert!(matches!(err, ModelError::Validation { field: "title", .. }));
    }

    #[test]
    fn test_update_task_default_is_noop_payload() {
        let update = UpdateTask::default();
        assert!(update.title.is_none());
        assert!(update.description.is_none());
        assert!(update.priority.is_none());
    }
}
