/// Module endpoints
///
/// A module is a task list inside a project and the access boundary for
/// its Kanban board. Any project member may create, update, or delete
/// modules.
///
/// # Endpoints
///
/// - `POST /modules` - Create a module in a project
/// - `GET /projects/:id/modules` - List a project's modules
/// - `GET /modules/:id` - Read one module
/// - `PUT /modules/:id` - Update name/description
/// - `DELETE /modules/:id` - Delete with cascade

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use trellis_shared::auth::access;
use trellis_shared::models::module::{CreateModule, Module, UpdateModule};

use crate::{
    app::AppState,
    error::{validation_failed, ApiResult, Envelope},
    middleware::session::CurrentUser,
};

/// Module creation request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateModuleRequest {
    /// Module name
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,

    /// Optional description
    #[validate(length(max = 1000, message = "description must be at most 1000 characters"))]
    pub description: Option<String>,

    /// Project the module belongs to
    pub project_id: Uuid,

    /// Optional start date
    pub start_date: Option<NaiveDate>,

    /// Optional end date
    pub end_date: Option<NaiveDate>,
}

/// Module update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateModuleRequest {
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,

    #[validate(length(max = 1000, message = "description must be at most 1000 characters"))]
    pub description: Option<String>,
}

/// Creates a module in a project the caller can access
pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CreateModuleRequest>,
) -> ApiResult<(StatusCode, Json<Envelope<Module>>)> {
    req.validate().map_err(validation_failed)?;

    access::require_project_access(&state.db, req.project_id, current.user.id).await?;

    let module = Module::create(
        &state.db,
        CreateModule {
            name: req.name,
            description: req.description,
            project_id: req.project_id,
            start_date: req.start_date,
            end_date: req.end_date,
        },
    )
    .await?;

    tracing::info!(module_id = %module.id, project_id = %req.project_id, "Module created");

    Ok((StatusCode::CREATED, Json(Envelope::data(module))))
}

/// Lists a project's modules in creation order
pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Envelope<Vec<Module>>>> {
    access::require_project_access(&state.db, project_id, current.user.id).await?;

    let modules = Module::find_all_for_project(&state.db, project_id).await?;
    Ok(Json(Envelope::data(modules)))
}

/// Reads one module
pub async fn show(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Envelope<Module>>> {
    let resolved = access::resolve_module_access(&state.db, id, current.user.id).await?;
    Ok(Json(Envelope::data(resolved.module)))
}

/// Updates a module's name and description
pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateModuleRequest>,
) -> ApiResult<Json<Envelope<Module>>> {
    req.validate().map_err(validation_failed)?;

    access::resolve_module_access(&state.db, id, current.user.id).await?;

    let module = Module::update(
        &state.db,
        id,
        UpdateModule {
            name: req.name,
            description: req.description,
        },
    )
    .await?;

    Ok(Json(Envelope::data(module)))
}

/// Deletes a module; cascades to its columns and tasks
pub async fn remove(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Envelope<()>>> {
    access::resolve_module_access(&state.db, id, current.user.id).await?;

    Module::delete(&state.db, id).await?;

    tracing::info!(module_id = %id, "Module deleted");

    Ok(Json(Envelope::message("Module deleted")))
}
