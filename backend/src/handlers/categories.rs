//! Category hierarchy handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::category::{CreateCategoryInput, UpdateCategoryInput};
use crate::services::{CategoryService, RuleStore};
use crate::AppState;
use shared::{Category, DepartmentType};

fn category_service(state: &AppState) -> CategoryService {
    CategoryService::new(RuleStore::new(state.db.clone()))
}

/// Query parameters for listing categories
#[derive(Debug, Deserialize)]
pub struct ListCategoriesQuery {
    pub department_type: Option<DepartmentType>,
}

/// List categories
pub async fn list_categories(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListCategoriesQuery>,
) -> Result<Json<Vec<Category>>, AppError> {
    if !user.has_permission("view:categories") {
        return Err(AppError::InsufficientPermissions);
    }

    let categories = category_service(&state)
        .list_categories(query.department_type)
        .await?;

    Ok(Json(categories))
}

/// Get a category
pub async fn get_category(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(category_id): Path<Uuid>,
) -> Result<Json<Category>, AppError> {
    if !user.has_permission("view:categories") {
        return Err(AppError::InsufficientPermissions);
    }

    let category = category_service(&state).get_category(category_id).await?;

    Ok(Json(category))
}

/// Create a category
pub async fn create_category(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateCategoryInput>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    if !user.has_permission("edit:categories") {
        return Err(AppError::InsufficientPermissions);
    }

    let category = category_service(&state).create_category(input).await?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// Update a category
pub async fn update_category(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(category_id): Path<Uuid>,
    Json(input): Json<UpdateCategoryInput>,
) -> Result<Json<Category>, AppError> {
    if !user.has_permission("edit:categories") {
        return Err(AppError::InsufficientPermissions);
    }

    let category = category_service(&state)
        .update_category(category_id, input)
        .await?;

    Ok(Json(category))
}

/// Delete a category. Existing tickets keep their snapshots.
pub async fn delete_category(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(category_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !user.has_permission("edit:categories") {
        return Err(AppError::InsufficientPermissions);
    }

    category_service(&state).delete_category(category_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
