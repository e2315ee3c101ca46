//! Routing rule administration handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::routing::UpsertRoutingRuleInput;
use crate::services::{RoutingService, RuleStore};
use crate::AppState;
use shared::RoutingRule;

fn routing_service(state: &AppState) -> RoutingService {
    RoutingService::new(RuleStore::new(state.db.clone()), state.config.sla.clone())
}

/// List all active routing rules
pub async fn list_routing_rules(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<RoutingRule>>, AppError> {
    if !user.has_permission("view:routing") {
        return Err(AppError::InsufficientPermissions);
    }

    let rules = routing_service(&state).list_rules().await?;

    Ok(Json(rules))
}

/// Get the active rule for a category
pub async fn get_routing_rule(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(category_id): Path<Uuid>,
) -> Result<Json<RoutingRule>, AppError> {
    if !user.has_permission("view:routing") {
        return Err(AppError::InsufficientPermissions);
    }

    let rule = routing_service(&state).get_rule(category_id).await?;

    Ok(Json(rule))
}

/// Create or replace the routing rule for a category
pub async fn upsert_routing_rule(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(category_id): Path<Uuid>,
    Json(input): Json<UpsertRoutingRuleInput>,
) -> Result<Json<RoutingRule>, AppError> {
    if !user.has_permission("edit:routing") {
        return Err(AppError::InsufficientPermissions);
    }

    let rule = routing_service(&state)
        .upsert_rule(category_id, input)
        .await?;

    Ok(Json(rule))
}

/// Deactivate the routing rule for a category
pub async fn delete_routing_rule(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(category_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !user.has_permission("edit:routing") {
        return Err(AppError::InsufficientPermissions);
    }

    routing_service(&state).delete_rule(category_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
