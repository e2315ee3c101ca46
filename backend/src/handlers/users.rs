//! User management handlers

use std::collections::BTreeSet;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::user::{SetCustomPermissionsInput, UpdateUserInput};
use crate::services::{PermissionService, RuleStore, UserService};
use crate::AppState;
use shared::User;

/// Response for list of users
#[derive(Serialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

/// A user's effective flat permission set
#[derive(Serialize)]
pub struct EffectivePermissionsResponse {
    pub user_id: Uuid,
    pub permissions: BTreeSet<String>,
    /// True when the set comes from a custom override rather than roles
    pub custom: bool,
}

/// List all users
pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<UsersResponse>, AppError> {
    if !user.has_permission("view:users") {
        return Err(AppError::InsufficientPermissions);
    }

    let service = UserService::new(RuleStore::new(state.db.clone()));
    let users = service.list_users().await?;

    Ok(Json(UsersResponse { users }))
}

/// Get a user
pub async fn get_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    if !user.has_permission("view:users") {
        return Err(AppError::InsufficientPermissions);
    }

    let service = UserService::new(RuleStore::new(state.db.clone()));
    let found = service.get_user(user_id).await?;

    Ok(Json(found))
}

/// Update a user's profile and role assignments
pub async fn update_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<Uuid>,
    Json(input): Json<UpdateUserInput>,
) -> Result<Json<User>, AppError> {
    if !user.has_permission("edit:users") {
        return Err(AppError::InsufficientPermissions);
    }

    let service = UserService::new(RuleStore::new(state.db.clone()));
    let updated = service.update_user(user_id, input).await?;

    Ok(Json(updated))
}

/// Replace a user's custom permission set
pub async fn set_custom_permissions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<Uuid>,
    Json(input): Json<SetCustomPermissionsInput>,
) -> Result<Json<User>, AppError> {
    if !user.has_permission("edit:users") {
        return Err(AppError::InsufficientPermissions);
    }

    let service = UserService::new(RuleStore::new(state.db.clone()));
    let updated = service.set_custom_permissions(user_id, input).await?;

    Ok(Json(updated))
}

/// Clear a user's custom permission set
pub async fn clear_custom_permissions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    if !user.has_permission("edit:users") {
        return Err(AppError::InsufficientPermissions);
    }

    let service = UserService::new(RuleStore::new(state.db.clone()));
    let updated = service.clear_custom_permissions(user_id).await?;

    Ok(Json(updated))
}

/// Get a user's effective flat permissions
pub async fn get_effective_permissions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<EffectivePermissionsResponse>, AppError> {
    if !user.has_permission("view:users") {
        return Err(AppError::InsufficientPermissions);
    }

    let store = RuleStore::new(state.db.clone());
    let target = UserService::new(store.clone()).get_user(user_id).await?;
    let permissions = PermissionService::new(store)
        .effective_permissions(user_id)
        .await?;

    Ok(Json(EffectivePermissionsResponse {
        user_id,
        permissions,
        custom: target.custom_permissions.is_some(),
    }))
}
