//! Page/feature access handlers
//!
//! Resolution for the current user plus the admin override endpoints that
//! write the per-role and per-user override rows.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::permission::{ResolvedAccess, RoleAccessOverrides, UserAccessOverrides};
use crate::services::rule_store::AccessScope;
use crate::services::{PermissionService, RuleStore};
use crate::AppState;

fn permission_service(state: &AppState) -> PermissionService {
    PermissionService::new(RuleStore::new(state.db.clone()))
}

/// Query parameters for access resolution
#[derive(Debug, Deserialize)]
pub struct ResolveAccessQuery {
    pub page_key: String,
    pub feature_key: Option<String>,
    /// Resolve for another user (requires `view:access`)
    pub user_id: Option<Uuid>,
}

/// Input for setting an override
#[derive(Debug, Deserialize)]
pub struct SetAccessInput {
    pub enabled: bool,
}

/// Resolve page/feature access for the current user (or, for admins,
/// another user)
pub async fn resolve_access(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ResolveAccessQuery>,
) -> Result<Json<ResolvedAccess>, AppError> {
    let target = match query.user_id {
        Some(target) if target != user.user_id => {
            if !user.has_permission("view:access") {
                return Err(AppError::InsufficientPermissions);
            }
            target
        }
        _ => user.user_id,
    };

    let service = permission_service(&state);
    let resolved = service
        .resolve_access(target, &query.page_key, query.feature_key.as_deref())
        .await?;

    Ok(Json(resolved))
}

/// Query parameters for a flat permission check
#[derive(Debug, Deserialize)]
pub struct CheckPermissionQuery {
    pub permission: String,
    /// Check another user (requires `view:access`)
    pub user_id: Option<Uuid>,
}

/// Response for a flat permission check
#[derive(Debug, serde::Serialize)]
pub struct CheckPermissionResponse {
    pub user_id: Uuid,
    pub permission: String,
    pub allowed: bool,
}

/// Check a flat permission against the store (custom permissions or role
/// union), independent of the JWT claims
pub async fn check_permission(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<CheckPermissionQuery>,
) -> Result<Json<CheckPermissionResponse>, AppError> {
    let target = match query.user_id {
        Some(target) if target != user.user_id => {
            if !user.has_permission("view:access") {
                return Err(AppError::InsufficientPermissions);
            }
            target
        }
        _ => user.user_id,
    };

    let allowed = permission_service(&state)
        .has_permission(target, &query.permission)
        .await?;

    Ok(Json(CheckPermissionResponse {
        user_id: target,
        permission: query.permission,
        allowed,
    }))
}

/// List a role's explicit override rows
pub async fn list_role_overrides(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(role_id): Path<Uuid>,
) -> Result<Json<RoleAccessOverrides>, AppError> {
    if !user.has_permission("view:access") {
        return Err(AppError::InsufficientPermissions);
    }

    let overrides = permission_service(&state).list_role_overrides(role_id).await?;

    Ok(Json(overrides))
}

/// List a user's explicit override rows
pub async fn list_user_overrides(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserAccessOverrides>, AppError> {
    if !user.has_permission("view:access") {
        return Err(AppError::InsufficientPermissions);
    }

    let overrides = permission_service(&state).list_user_overrides(user_id).await?;

    Ok(Json(overrides))
}

/// Upsert a role-level page override
pub async fn set_role_page_access(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((role_id, page_key)): Path<(Uuid, String)>,
    Json(input): Json<SetAccessInput>,
) -> Result<StatusCode, AppError> {
    if !user.has_permission("edit:access") {
        return Err(AppError::InsufficientPermissions);
    }

    permission_service(&state)
        .set_page_access(AccessScope::Role, role_id, &page_key, input.enabled)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Remove a role-level page override, reverting to the page default
pub async fn clear_role_page_access(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((role_id, page_key)): Path<(Uuid, String)>,
) -> Result<StatusCode, AppError> {
    if !user.has_permission("edit:access") {
        return Err(AppError::InsufficientPermissions);
    }

    permission_service(&state)
        .clear_page_access(AccessScope::Role, role_id, &page_key)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Upsert a role-level feature override
pub async fn set_role_feature_access(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((role_id, page_key, feature_key)): Path<(Uuid, String, String)>,
    Json(input): Json<SetAccessInput>,
) -> Result<StatusCode, AppError> {
    if !user.has_permission("edit:access") {
        return Err(AppError::InsufficientPermissions);
    }

    permission_service(&state)
        .set_feature_access(
            AccessScope::Role,
            role_id,
            &page_key,
            &feature_key,
            input.enabled,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Remove a role-level feature override
pub async fn clear_role_feature_access(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((role_id, page_key, feature_key)): Path<(Uuid, String, String)>,
) -> Result<StatusCode, AppError> {
    if !user.has_permission("edit:access") {
        return Err(AppError::InsufficientPermissions);
    }

    permission_service(&state)
        .clear_feature_access(AccessScope::Role, role_id, &page_key, &feature_key)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Upsert a user-level page override
pub async fn set_user_page_access(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((user_id, page_key)): Path<(Uuid, String)>,
    Json(input): Json<SetAccessInput>,
) -> Result<StatusCode, AppError> {
    if !user.has_permission("edit:access") {
        return Err(AppError::InsufficientPermissions);
    }

    permission_service(&state)
        .set_page_access(AccessScope::User, user_id, &page_key, input.enabled)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Remove a user-level page override, reverting to the role level
pub async fn clear_user_page_access(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((user_id, page_key)): Path<(Uuid, String)>,
) -> Result<StatusCode, AppError> {
    if !user.has_permission("edit:access") {
        return Err(AppError::InsufficientPermissions);
    }

    permission_service(&state)
        .clear_page_access(AccessScope::User, user_id, &page_key)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Upsert a user-level feature override
pub async fn set_user_feature_access(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((user_id, page_key, feature_key)): Path<(Uuid, String, String)>,
    Json(input): Json<SetAccessInput>,
) -> Result<StatusCode, AppError> {
    if !user.has_permission("edit:access") {
        return Err(AppError::InsufficientPermissions);
    }

    permission_service(&state)
        .set_feature_access(
            AccessScope::User,
            user_id,
            &page_key,
            &feature_key,
            input.enabled,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Remove a user-level feature override
pub async fn clear_user_feature_access(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((user_id, page_key, feature_key)): Path<(Uuid, String, String)>,
) -> Result<StatusCode, AppError> {
    if !user.has_permission("edit:access") {
        return Err(AppError::InsufficientPermissions);
    }

    permission_service(&state)
        .clear_feature_access(AccessScope::User, user_id, &page_key, &feature_key)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
