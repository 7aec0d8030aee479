/// Kanban column endpoints
///
/// Columns are reached through their module, which carries the access
/// check for the whole board.
///
/// # Endpoints
///
/// - `GET /modules/:id/columns` - List columns in display order
/// - `POST /modules/:id/columns` - Append a column
/// - `PUT /columns/:id` - Rename a column
/// - `DELETE /columns/:id` - Delete a column
/// - `PATCH /modules/:id/columns/reorder` - Persist a new column order

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use trellis_shared::auth::access;
use trellis_shared::models::column::{Column, CreateColumn};
use trellis_shared::ordering::{self, ColumnPosition};

use crate::{
    app::AppState,
    error::{validation_failed, ApiError, ApiResult, Envelope},
    middleware::session::CurrentUser,
};

/// Column creation request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateColumnRequest {
    /// Column name
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,

    /// Marks a terminal lane
    #[serde(default)]
    pub is_done_column: bool,
}

/// Column rename request
#[derive(Debug, Deserialize, Validate)]
pub struct RenameColumnRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
}

/// One entry of a column reorder batch
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnPositionRequest {
    pub id: Uuid,
    pub order_index: i32,
}

/// Column reorder request
#[derive(Debug, Deserialize)]
pub struct ReorderColumnsRequest {
    /// Target positions, typically the full sibling set
    pub columns: Vec<ColumnPositionRequest>,
}

/// Lists a module's columns sorted by order key
pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(module_id): Path<Uuid>,
) -> ApiResult<Json<Envelope<Vec<Column>>>> {
    access::resolve_module_access(&state.db, module_id, current.user.id).await?;

    let columns = Column::find_all_by_module(&state.db, module_id).await?;
    Ok(Json(Envelope::data(columns)))
}

/// Creates a column at the end of the board
pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(module_id): Path<Uuid>,
    Json(req): Json<CreateColumnRequest>,
) -> ApiResult<Json<Envelope<Column>>> {
    req.validate().map_err(validation_failed)?;

    access::resolve_module_access(&state.db, module_id, current.user.id).await?;

    let column = Column::create(
        &state.db,
        CreateColumn {
            name: req.name,
            module_id,
            order_index: 0,
            is_done_column: req.is_done_column,
        },
    )
    .await?;

    tracing::info!(column_id = %column.id, module_id = %module_id, "Column created");

    Ok(Json(Envelope::data(column)))
}

/// Renames a column
pub async fn rename(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<RenameColumnRequest>,
) -> ApiResult<Json<Envelope<Column>>> {
    req.validate().map_err(validation_failed)?;

    let column = Column::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::BadRequest("column not found".to_string()))?;

    access::resolve_module_access(&state.db, column.module_id, current.user.id).await?;

    let column = Column::rename(&state.db, id, &req.name).await?;
    Ok(Json(Envelope::data(column)))
}

/// Deletes a column; cascades to its tasks
pub async fn remove(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Envelope<()>>> {
    let column = Column::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::BadRequest("column not found".to_string()))?;

    access::resolve_module_access(&state.db, column.module_id, current.user.id).await?;

    Column::delete(&state.db, id).await?;

    tracing::info!(column_id = %id, "Column deleted");

    Ok(Json(Envelope::message("Column deleted")))
}

/// Applies a column reorder batch for one module
pub async fn reorder(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(module_id): Path<Uuid>,
    Json(req): Json<ReorderColumnsRequest>,
) -> ApiResult<Json<Envelope<()>>> {
    access::resolve_module_access(&state.db, module_id, current.user.id).await?;

    let positions: Vec<ColumnPosition> = req
        .columns
        .into_iter()
        .map(|p| ColumnPosition {
            id: p.id,
            order_index: p.order_index,
        })
        .collect();

    ordering::reorder_columns(&state.db, &positions).await?;

    Ok(Json(Envelope::message("Columns reordered")))
}
