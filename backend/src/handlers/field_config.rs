//! Field configuration handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::field_config::{CategoryOverrideInput, UpdateFieldConfigInput};
use crate::services::{FieldConfigService, RuleStore};
use crate::AppState;
use shared::{CategoryFieldOverride, FieldConfiguration};

fn field_config_service(state: &AppState) -> FieldConfigService {
    FieldConfigService::new(RuleStore::new(state.db.clone()))
}

/// Input for replacing a category's override rows
#[derive(Debug, Deserialize)]
pub struct SetCategoryOverridesInput {
    pub overrides: Vec<CategoryOverrideInput>,
}

/// List the base field configurations
pub async fn list_field_configs(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<FieldConfiguration>>, AppError> {
    if !user.has_permission("view:fields") {
        return Err(AppError::InsufficientPermissions);
    }

    let configs = field_config_service(&state).list_configurations().await?;

    Ok(Json(configs))
}

/// Update a base field configuration
pub async fn update_field_config(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(field_name): Path<String>,
    Json(input): Json<UpdateFieldConfigInput>,
) -> Result<StatusCode, AppError> {
    if !user.has_permission("edit:fields") {
        return Err(AppError::InsufficientPermissions);
    }

    field_config_service(&state)
        .update_configuration(&field_name, input)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// List the override rows for a category
pub async fn list_category_overrides(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(category_id): Path<Uuid>,
) -> Result<Json<Vec<CategoryFieldOverride>>, AppError> {
    if !user.has_permission("view:fields") {
        return Err(AppError::InsufficientPermissions);
    }

    let overrides = field_config_service(&state)
        .list_category_overrides(category_id)
        .await?;

    Ok(Json(overrides))
}

/// Replace the override rows for a category
pub async fn set_category_overrides(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(category_id): Path<Uuid>,
    Json(input): Json<SetCategoryOverridesInput>,
) -> Result<StatusCode, AppError> {
    if !user.has_permission("edit:fields") {
        return Err(AppError::InsufficientPermissions);
    }

    field_config_service(&state)
        .set_category_overrides(category_id, input.overrides)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
