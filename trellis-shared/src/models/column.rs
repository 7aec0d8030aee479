/// Kanban column model and database operations
///
/// Columns are the lanes of a module's board. `order_index` is the ordering
/// key within the module: only its relative magnitude matters, values are
/// allowed to have gaps, and indices may repeat across different modules.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE kanban_columns (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(100) NOT NULL,
///     module_id UUID NOT NULL REFERENCES modules(id) ON DELETE CASCADE,
///     order_index INT NOT NULL DEFAULT 0,
///     is_done_column BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::{ModelError, ModelResult};

/// Kanban column model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Column {
    /// Unique column ID
    pub id: Uuid,

    /// Name (1-100 characters)
    pub name: String,

    /// Parent module
    pub module_id: Uuid,

    /// Ordering key within the module; compared, never displayed
    pub order_index: i32,

    /// Marks the terminal lane of the board
    pub is_done_column: bool,

    /// When the column was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateColumn {
    /// Name (1-100 characters)
    pub name: String,

    /// Parent module
    pub module_id: Uuid,

    /// Explicit ordering key; the sentinel 0 appends after the current
    /// maximum sibling index
    pub order_index: i32,

    /// Whether this is the terminal lane
    pub is_done_column: bool,
}

impl CreateColumn {
    /// Checks the entity invariants before insert
    pub fn validate(&self) -> ModelResult<()> {
        if self.name.is_empty() || self.name.len() > 100 {
            return Err(ModelError::validation("name", "must be 1-100 characters"));
        }
        Ok(())
    }
}

impl Column {
    /// Creates a new column
    ///
    /// When `order_index` is the sentinel 0, the column is appended after
    /// the highest existing sibling index (an empty module yields 0). The
    /// max-lookup and the insert run in one transaction so concurrent
    /// creations cannot both claim the same slot.
    pub async fn create(pool: &PgPool, data: CreateColumn) -> ModelResult<Self> {
        data.validate()?;

        let mut tx = pool.begin().await?;

        let order_index = if data.order_index == 0 {
            let (max,): (Option<i32>,) = sqlx::query_as(
                "SELECT MAX(order_index) FROM kanban_columns WHERE module_id = $1",
            )
            .bind(data.module_id)
            .fetch_one(&mut *tx)
            .await?;
            max.unwrap_or(-1) + 1
        } else {
            data.order_index
        };

        let column = sqlx::query_as::<_, Column>(
            r#"
            INSERT INTO kanban_columns (name, module_id, order_index, is_done_column)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, module_id, order_index, is_done_column, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.module_id)
        .bind(order_index)
        .bind(data.is_done_column)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(column)
    }

    /// Finds a column by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> ModelResult<Option<Self>> {
        let column = sqlx::query_as::<_, Column>(
            r#"
            SELECT id, name, module_id, order_index, is_done_column, created_at
            FROM kanban_columns
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(column)
    }

    /// Lists the columns of a module in display order
    pub async fn find_all_by_module(pool: &PgPool, module_id: Uuid) -> ModelResult<Vec<Self>> {
        let columns = sqlx::query_as::<_, Column>(
            r#"
            SELECT id, name, module_id, order_index, is_done_column, created_at
            FROM kanban_columns
            WHERE module_id = $1
            ORDER BY order_index ASC
            "#,
        )
        .bind(module_id)
        .fetch_all(pool)
        .await?;

        Ok(columns)
    }

    /// Renames a column
    pub async fn rename(pool: &PgPool, id: Uuid, name: &str) -> ModelResult<Self> {
        if name.is_empty() || name.len() > 100 {
            return Err(ModelError::validation("name", "must be 1-100 characters"));
        }

        let column = sqlx::query_as::<_, Column>(
            r#"
            UPDATE kanban_columns
            SET name = $2
            WHERE id = $1
            RETURNING id, name, module_id, order_index, is_done_column, created_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(pool)
        .await?
        .ok_or(ModelError::NotFound("column"))?;

        Ok(column)
    }

    /// Deletes a column
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotFound`] if no row was affected.
    pub async fn delete(pool: &PgPool, id: Uuid) -> ModelResult<()> {
        let result = sqlx::query("DELETE FROM kanban_columns WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ModelError::NotFound("column"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_bounds() {
        let base = CreateColumn {
            name: "To Do".to_string(),
            module_id: Uuid::new_v4(),
            order_index: 0,
            is_done_column: false,
        };
        assert!(base.validate().is_ok());

        let empty = CreateColumn {
            name: String::new(),
            ..base.clone()
        };
        assert!(empty.validate().is_err());

        let max = CreateColumn {
            name: "c".repeat(100),
            ..base.clone()
        };
        assert!(max.validate().is_ok());

        let too_long = CreateColumn {
            name: "c".repeat(101),
            ..base
        };
        assert!(too_long.validate().is_err());
    }
}
