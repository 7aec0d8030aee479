/// Project and membership endpoints
///
/// Projects are the access boundary for everything beneath them. Reads
/// require membership (owner or member row); structural changes (rename,
/// delete, membership add/remove) are owner-only.
///
/// # Endpoints
///
/// - `GET /projects` - Projects the caller owns or belongs to
/// - `POST /projects` - Create a project owned by the caller
/// - `GET /projects/:id` - Read one project (membership)
/// - `PUT /projects/:id` - Rename/update (ownership)
/// - `DELETE /projects/:id` - Delete with cascade (ownership)
/// - `GET /projects/:id/members` - List members (membership)
/// - `POST /projects/:id/members` - Invite a user (ownership)
/// - `DELETE /projects/:id/members/:user_id` - Remove a member (ownership)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use trellis_shared::auth::access;
use trellis_shared::models::member::{CreateMember, MemberDetails, ProjectMember, ProjectRole};
use trellis_shared::models::project::{CreateProject, Project, UpdateProject};
use trellis_shared::models::user::User;

use crate::{
    app::AppState,
    error::{validation_failed, ApiError, ApiResult, Envelope},
    middleware::session::CurrentUser,
};

/// Project creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    /// Project name
    #[validate(length(min = 3, max = 255, message = "name must be 3-255 characters"))]
    pub name: String,

    /// Optional description
    #[validate(length(max = 1000, message = "description must be at most 1000 characters"))]
    pub description: Option<String>,
}

/// Project update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 3, max = 255, message = "name must be 3-255 characters"))]
    pub name: String,

    #[validate(length(max = 1000, message = "description must be at most 1000 characters"))]
    pub description: Option<String>,
}

/// Member invitation request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    /// User to invite
    pub user_id: Uuid,

    /// Role label for the membership
    pub role: ProjectRole,
}

/// Lists projects the caller owns or is a member of
pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<Envelope<Vec<Project>>>> {
    let projects = Project::find_all_for_user(&state.db, current.user.id).await?;
    Ok(Json(Envelope::data(projects)))
}

/// Creates a project owned by the caller
///
/// The owner's PROJECT_MANAGER membership is recorded along with the
/// project itself.
pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Envelope<Project>>)> {
    req.validate().map_err(validation_failed)?;

    let project = Project::create(
        &state.db,
        CreateProject {
            name: req.name,
            description: req.description,
            owner_id: current.user.id,
        },
    )
    .await?;

    tracing::info!(project_id = %project.id, owner_id = %current.user.id, "Project created");

    Ok((StatusCode::CREATED, Json(Envelope::data(project))))
}

/// Reads one project
pub async fn show(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Envelope<Project>>> {
    let project = access::require_project_access(&state.db, id, current.user.id).await?;
    Ok(Json(Envelope::data(project)))
}

/// Updates a project's name and description
pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Envelope<Project>>> {
    req.validate().map_err(validation_failed)?;

    access::require_project_owner(&state.db, id, current.user.id).await?;

    let project = Project::update(
        &state.db,
        id,
        UpdateProject {
            name: req.name,
            description: req.description,
        },
    )
    .await?;

    Ok(Json(Envelope::data(project)))
}

/// Deletes a project; cascades to modules, columns, tasks, memberships
pub async fn remove(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Envelope<()>>> {
    access::require_project_owner(&state.db, id, current.user.id).await?;

    Project::delete(&state.db, id).await?;

    tracing::info!(project_id = %id, "Project deleted");

    Ok(Json(Envelope::message("Project deleted")))
}

/// Lists a project's members with their names and emails
pub async fn list_members(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Envelope<Vec<MemberDetails>>>> {
    access::require_project_access(&state.db, id, current.user.id).await?;

    let members = ProjectMember::list_details(&state.db, id).await?;
    Ok(Json(Envelope::data(members)))
}

/// Invites a user to a project
///
/// Duplicate memberships are rejected here, before the insert, so the
/// (project, user) pair stays unique.
pub async fn add_member(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<(StatusCode, Json<Envelope<ProjectMember>>)> {
    access::require_project_owner(&state.db, id, current.user.id).await?;

    if User::find_by_id(&state.db, req.user_id).await?.is_none() {
        return Err(ApiError::BadRequest("user not found".to_string()));
    }

    if ProjectMember::find_by_project_and_user(&state.db, id, req.user_id)
        .await?
        .is_some()
    {
        return Err(ApiError::BadRequest(
            "user is already a member of this project".to_string(),
        ));
    }

    let member = ProjectMember::create(
        &state.db,
        CreateMember {
            project_id: id,
            user_id: req.user_id,
            project_role: req.role,
        },
    )
    .await?;

    tracing::info!(project_id = %id, user_id = %req.user_id, "Member added");

    Ok((StatusCode::CREATED, Json(Envelope::data(member))))
}

/// Removes a member from a project
///
/// The owner's own membership can never be removed, whatever role it
/// carries. Tasks the member reported go with the membership row by
/// foreign-key cascade.
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Envelope<()>>> {
    let project = access::require_project_owner(&state.db, id, current.user.id).await?;

    if user_id == project.owner_id {
        return Err(ApiError::BadRequest(
            "the project owner cannot be removed".to_string(),
        ));
    }

    ProjectMember::delete(&state.db, id, user_id).await?;

    tracing::info!(project_id = %id, user_id = %user_id, "Member removed");

    Ok(Json(Envelope::message("Member removed")))
}
