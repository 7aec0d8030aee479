/// Task endpoints
///
/// Tasks live in a column of a module's board. Access is gated on the
/// module throughout, including reorder batches that move tasks between
/// columns.
///
/// # Endpoints
///
/// - `GET /modules/:id/tasks` - List a module's tasks
/// - `POST /tasks` - Create a task
/// - `PUT /tasks/:id` - Update title/description/priority
/// - `DELETE /tasks/:id` - Delete a task
/// - `PATCH /tasks/reorder` - Persist new task positions, including moves

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use trellis_shared::auth::access;
use trellis_shared::models::column::Column;
use trellis_shared::models::member::{CreateMember, ProjectMember, ProjectRole};
use trellis_shared::models::project::Project;
use trellis_shared::models::task::{CreateTask, Task, TaskPriority, UpdateTask};
use trellis_shared::ordering::{self, TaskPosition};

use crate::{
    app::AppState,
    error::{validation_failed, ApiError, ApiResult, Envelope},
    middleware::session::CurrentUser,
};

/// Task creation request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Module the task belongs to
    pub module_id: Uuid,

    /// Column the task starts in
    pub column_id: Uuid,

    /// Priority, defaults to MEDIUM
    #[serde(default)]
    pub priority: TaskPriority,

    /// Optional due date
    pub due_date: Option<NaiveDate>,
}

/// Distinguishes an absent field from an explicit null
///
/// Absent leaves the field untouched; `"description": null` clears it.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// Task update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub title: Option<String>,

    /// `Some(None)` clears the description
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    pub priority: Option<TaskPriority>,
}

/// One entry of a task reorder batch
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPositionRequest {
    pub id: Uuid,
    pub column_id: Uuid,
    pub order_index: i32,
}

/// Task reorder request
///
/// The module id carries the access check; entries may move tasks across
/// that module's columns.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderTasksRequest {
    pub module_id: Uuid,
    pub updates: Vec<TaskPositionRequest>,
}

/// Lists a module's tasks sorted by order key
pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(module_id): Path<Uuid>,
) -> ApiResult<Json<Envelope<Vec<Task>>>> {
    access::resolve_module_access(&state.db, module_id, current.user.id).await?;

    let tasks = Task::find_all_by_module(&state.db, module_id).await?;
    Ok(Json(Envelope::data(tasks)))
}

/// Creates a task at the end of its column
///
/// The reporter is the acting user's membership row. The owner's row is
/// normally written at project creation; if it is missing anyway, this is
/// the only operation that re-provisions it, with role PROJECT_MANAGER.
pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Json<Envelope<Task>>> {
    req.validate().map_err(validation_failed)?;

    let resolved = access::resolve_module_access(&state.db, req.module_id, current.user.id).await?;

    let column = Column::find_by_id(&state.db, req.column_id)
        .await?
        .ok_or_else(|| ApiError::BadRequest("column not found".to_string()))?;
    if column.module_id != req.module_id {
        return Err(ApiError::BadRequest(
            "column does not belong to this module".to_string(),
        ));
    }

    let reporter = match ProjectMember::find_by_project_and_user(
        &state.db,
        resolved.project_id,
        current.user.id,
    )
    .await?
    {
        Some(member) => member,
        None => {
            // Access already passed, so a user without a membership row
            // must be the project owner.
            let project = Project::find_by_id(&state.db, resolved.project_id)
                .await?
                .ok_or_else(|| ApiError::BadRequest("project not found".to_string()))?;
            if project.owner_id != current.user.id {
                return Err(ApiError::Unauthorized(
                    "Not authorized to access this resource".to_string(),
                ));
            }

            tracing::info!(
                project_id = %resolved.project_id,
                user_id = %current.user.id,
                "Re-provisioning missing owner membership on task create"
            );

            ProjectMember::create(
                &state.db,
                CreateMember {
                    project_id: resolved.project_id,
                    user_id: current.user.id,
                    project_role: ProjectRole::ProjectManager,
                },
            )
            .await?
        }
    };

    let task = Task::create(
        &state.db,
        CreateTask {
            title: req.title,
            description: req.description,
            module_id: req.module_id,
            column_id: req.column_id,
            reporter_id: reporter.id,
            priority: req.priority,
            task_order_index: 0,
            due_date: req.due_date,
        },
    )
    .await?;

    tracing::info!(task_id = %task.id, module_id = %req.module_id, "Task created");

    Ok(Json(Envelope::data(task)))
}

/// Updates a task's title, description, or priority
pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Envelope<Task>>> {
    req.validate().map_err(validation_failed)?;

    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::BadRequest("task not found".to_string()))?;

    access::resolve_module_access(&state.db, task.module_id, current.user.id).await?;

    let task = Task::update(
        &state.db,
        id,
        UpdateTask {
            title: req.title,
            description: req.description,
            priority: req.priority,
        },
    )
    .await?;

    Ok(Json(Envelope::data(task)))
}

/// Deletes a task
pub async fn remove(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Envelope<()>>> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::BadRequest("task not found".to_string()))?;

    access::resolve_module_access(&state.db, task.module_id, current.user.id).await?;

    Task::delete(&state.db, id).await?;

    tracing::info!(task_id = %id, "Task deleted");

    Ok(Json(Envelope::message("Task deleted")))
}

/// Applies a task reorder batch for one module
pub async fn reorder(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<ReorderTasksRequest>,
) -> ApiResult<Json<Envelope<()>>> {
    access::resolve_module_access(&state.db, req.module_id, current.user.id).await?;

    let positions: Vec<TaskPosition> = req
        .updates
        .into_iter()
        .map(|p| TaskPosition {
            id: p.id,
            column_id: p.column_id,
            order_index: p.order_index,
        })
        .collect();

    ordering::reorder_tasks(&state.db, &positions).await?;

    Ok(Json(Envelope::message("Tasks reordered")))
}
