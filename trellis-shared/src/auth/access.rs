/// Project and module access predicates
///
/// # Permission Model
///
/// Access is project-scoped and flat:
///
/// 1. **Project access**: the project owner and every project member may
///    read and write the project's contents, regardless of member role
/// 2. **Ownership**: structural changes (membership add/remove, project
///    update/delete) are owner-only
/// 3. **Module scoping**: columns and tasks are reached through their
///    module, so module access implies access to everything inside it
///
/// Member roles (`PROJECT_MANAGER`, `DEVELOPER`, `STAKEHOLDER`) are
/// descriptive labels and grant no differing permissions.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::module::Module;
use crate::models::project::Project;

/// Error type for access checks
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// User has no access to the resource's project
    #[error("Not authorized to access this resource")]
    Denied,

    /// The resource being gated does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Database error
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// Failure inside a model lookup
    #[error(transparent)]
    Model(#[from] crate::models::ModelError),
}

/// A module together with proof that the user may act on it
///
/// Constructed only by [`resolve_module_access`], so holding one means the
/// access check already passed.
#[derive(Debug, Clone)]
pub struct ModuleAccess {
    /// The module being acted on
    pub module: Module,

    /// Project the module belongs to
    pub project_id: Uuid,
}

/// Checks whether a user may access a project
///
/// True when the user owns the project or holds a membership row in it.
pub async fn is_project_member(
    pool: &PgPool,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<bool, AccessError> {
    let found: Option<(Uuid,)> = sqlx::query_as(
        r#"
        SELECT p.id FROM projects p
        LEFT JOIN project_members pm ON pm.project_id = p.id AND pm.user_id = $2
        WHERE p.id = $1 AND (p.owner_id = $2 OR pm.id IS NOT NULL)
        "#,
    )
    .bind(project_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(found.is_some())
}

/// Resolves a module id into the module, gated on project access
///
/// Every column and task operation funnels through this: the module is the
/// access boundary for the board beneath it.
///
/// # Errors
///
/// - `AccessError::NotFound` when no such module exists
/// - `AccessError::Denied` when the module exists but the user has no
///   access to its project
pub async fn resolve_module_access(
    pool: &PgPool,
    module_id: Uuid,
    user_id: Uuid,
) -> Result<ModuleAccess, AccessError> {
    let module = Module::find_by_id(pool, module_id)
        .await?
        .ok_or(AccessError::NotFound("module"))?;

    if !is_project_member(pool, module.project_id, user_id).await? {
        return Err(AccessError::Denied);
    }

    let project_id = module.project_id;
    Ok(ModuleAccess { module, project_id })
}

/// Requires that a user owns a project
///
/// # Errors
///
/// - `AccessError::NotFound` when no such project exists
/// - `AccessError::Denied` when the project exists but the user is not
///   its owner (plain membership is not enough)
pub async fn require_project_owner(
    pool: &PgPool,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<Project, AccessError> {
    let project = Project::find_by_id(pool, project_id)
        .await?
        .ok_or(AccessError::NotFound("project"))?;

    if project.owner_id != user_id {
        return Err(AccessError::Denied);
    }

    Ok(project)
}

/// Requires that a user may access a project, returning it
///
/// Like [`is_project_member`] but loads the project and folds the two
/// failure modes into errors.
pub async fn require_project_access(
    pool: &PgPool,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<Project, AccessError> {
    let project = Project::find_by_id(pool, project_id)
        .await?
        .ok_or(AccessError::NotFound("project"))?;

    if project.owner_id != user_id && !is_project_member(pool, project_id, user_id).await? {
        return Err(AccessError::Denied);
    }

    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_error_messages() {
        assert_eq!(
            AccessError::Denied.to_string(),
            "Not authorized to access this resource"
        );
        assert_eq!(AccessError::NotFound("module").to_string(), "module not found");
    }
}
