/// Ordered-collection reordering engine
///
/// Translates a client-submitted target sequence of sibling items into
/// persisted order keys. Two sibling scopes exist: the columns of one
/// module, and the tasks of one column. A task batch may also move tasks
/// across columns; each entry then carries the destination column.
///
/// # Contract
///
/// After a reorder completes, reading the siblings back sorted by their
/// order key reproduces the submitted sequence exactly. No gap compaction
/// is performed and absolute key values carry no meaning.
///
/// Each batch is applied inside a single transaction: a failure partway
/// through rolls back every update, so readers never observe a half-applied
/// ordering. The engine does not verify that a destination column belongs
/// to the task's module; callers gate access on the *module* before
/// invoking it.

use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

/// Target position of one column within its module
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ColumnPosition {
    /// Column to move
    pub id: Uuid,

    /// New ordering key
    pub order_index: i32,
}

/// Target position of one task, possibly in a different column
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TaskPosition {
    /// Task to move
    pub id: Uuid,

    /// Destination column
    pub column_id: Uuid,

    /// New ordering key within the destination column
    pub order_index: i32,
}

/// Error type for reorder batches
#[derive(Debug, thiserror::Error)]
pub enum OrderingError {
    /// The same item appears twice in one batch
    #[error("duplicate item {0} in reorder batch")]
    DuplicateId(Uuid),

    /// An item in the batch does not exist
    #[error("unknown item {0} in reorder batch")]
    UnknownId(Uuid),

    /// Underlying database failure
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

fn check_unique(ids: impl Iterator<Item = Uuid>) -> Result<(), OrderingError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(OrderingError::DuplicateId(id));
        }
    }
    Ok(())
}

/// Persists new order keys for a set of sibling columns
///
/// Applying the same batch twice is idempotent: the second application
/// writes the same keys and the observable order is unchanged.
pub async fn reorder_columns(
    pool: &PgPool,
    positions: &[ColumnPosition],
) -> Result<(), OrderingError> {
    check_unique(positions.iter().map(|p| p.id))?;

    let mut tx = pool.begin().await?;

    for position in positions {
        let result = sqlx::query("UPDATE kanban_columns SET order_index = $2 WHERE id = $1")
            .bind(position.id)
            .bind(position.order_index)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(OrderingError::UnknownId(position.id));
        }
    }

    tx.commit().await?;

    Ok(())
}

/// Persists new positions for a set of tasks
///
/// Each entry updates both the destination column and the ordering key,
/// covering plain reordering and cross-column moves with one mechanism.
pub async fn reorder_tasks(pool: &PgPool, positions: &[TaskPosition]) -> Result<(), OrderingError> {
    check_unique(positions.iter().map(|p| p.id))?;

    let mut tx = pool.begin().await?;

    for position in positions {
        let result =
            sqlx::query("UPDATE tasks SET column_id = $2, task_order_index = $3 WHERE id = $1")
                .bind(position.id)
                .bind(position.column_id)
                .bind(position.order_index)
                .execute(&mut *tx)
                .await?;

        if result.rows_affected() == 0 {
            return Err(OrderingError::UnknownId(position.id));
        }
    }

    tx.commit().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_batch_accepted() {
        let ids = vec![Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        assert!(check_unique(ids.into_iter()).is_ok());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let id = Uuid::new_v4();
        let err = check_unique(vec![id, Uuid::new_v4(), id].into_iter()).unwrap_err();
        match err {
            OrderingError::DuplicateId(dup) => assert_eq!(dup, id),
            other => panic!("expected DuplicateId, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_batch_is_valid() {
        assert!(check_unique(std::iter::empty()).is_ok());
    }
}
