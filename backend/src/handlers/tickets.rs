//! Ticket handlers: intake, listing, status and assignment transitions

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::ticket::{CreateTicketInput, TicketListFilter, TicketView};
use crate::services::{
    FieldConfigService, PriorityService, RoutingService, RuleStore, TicketService,
};
use crate::AppState;
use shared::{
    DepartmentType, PaginatedResponse, Pagination, PriorityScore, ResolvedField, TicketStatus,
};

fn ticket_service(state: &AppState) -> TicketService {
    let store = RuleStore::new(state.db.clone());
    let priority = PriorityService::new(store.clone(), state.vendor_directory.clone());
    let routing = RoutingService::new(store.clone(), state.config.sla.clone());
    TicketService::new(store, priority, routing)
}

/// Query parameters for listing tickets
#[derive(Debug, Deserialize)]
pub struct ListTicketsQuery {
    pub status: Option<TicketStatus>,
    pub department: Option<String>,
    pub assignee_id: Option<Uuid>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Query parameters for resolving intake fields
#[derive(Debug, Deserialize)]
pub struct IntakeFieldsQuery {
    pub department_type: Option<DepartmentType>,
    pub category_id: Option<Uuid>,
}

/// Query parameters for previewing a ticket's priority
#[derive(Debug, Deserialize)]
pub struct PriorityPreviewQuery {
    pub vendor_handle: Option<String>,
    pub category_id: Option<Uuid>,
}

/// Input for a status transition
#[derive(Debug, Deserialize)]
pub struct UpdateStatusInput {
    pub status: TicketStatus,
}

/// Input for a manual assignment
#[derive(Debug, Deserialize)]
pub struct AssignInput {
    pub assignee_id: Uuid,
}

/// Create a ticket
pub async fn create_ticket(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateTicketInput>,
) -> Result<(StatusCode, Json<TicketView>), AppError> {
    if !user.has_permission("create:tickets") {
        return Err(AppError::InsufficientPermissions);
    }

    let service = ticket_service(&state);
    let ticket = service
        .create_ticket(user.user_id, user.department_type, input)
        .await?;

    Ok((StatusCode::CREATED, Json(ticket)))
}

/// List tickets
pub async fn list_tickets(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListTicketsQuery>,
) -> Result<Json<PaginatedResponse<TicketView>>, AppError> {
    if !user.has_permission("view:tickets") {
        return Err(AppError::InsufficientPermissions);
    }

    let filter = TicketListFilter {
        status: query.status,
        department: query.department,
        assignee_id: query.assignee_id,
    };
    let pagination = Pagination {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    };

    let service = ticket_service(&state);
    let tickets = service.list_tickets(filter, pagination).await?;

    Ok(Json(tickets))
}

/// Get a ticket
pub async fn get_ticket(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(ticket_id): Path<Uuid>,
) -> Result<Json<TicketView>, AppError> {
    if !user.has_permission("view:tickets") {
        return Err(AppError::InsufficientPermissions);
    }

    let service = ticket_service(&state);
    let ticket = service.get_ticket(ticket_id).await?;

    Ok(Json(ticket))
}

/// Transition a ticket's status
pub async fn update_ticket_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(ticket_id): Path<Uuid>,
    Json(input): Json<UpdateStatusInput>,
) -> Result<Json<TicketView>, AppError> {
    if !user.has_permission("edit:tickets") {
        return Err(AppError::InsufficientPermissions);
    }

    let service = ticket_service(&state);
    let ticket = service.update_status(ticket_id, input.status).await?;

    Ok(Json(ticket))
}

/// Manually assign a ticket
pub async fn assign_ticket(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(ticket_id): Path<Uuid>,
    Json(input): Json<AssignInput>,
) -> Result<Json<TicketView>, AppError> {
    if !user.has_permission("assign:tickets") {
        return Err(AppError::InsufficientPermissions);
    }

    let service = ticket_service(&state);
    let ticket = service.assign(ticket_id, input.assignee_id).await?;

    Ok(Json(ticket))
}

/// Resolve the intake form fields for the requesting user's department
/// type (or an explicit one) and optional category
pub async fn resolve_intake_fields(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<IntakeFieldsQuery>,
) -> Result<Json<Vec<ResolvedField>>, AppError> {
    if !user.has_permission("create:tickets") {
        return Err(AppError::InsufficientPermissions);
    }

    let department_type = query.department_type.unwrap_or(user.department_type);

    let service = FieldConfigService::new(RuleStore::new(state.db.clone()));
    let fields = service
        .resolve_fields(department_type, query.category_id)
        .await?;

    Ok(Json(fields))
}

/// Preview the priority a ticket would receive before submitting it
pub async fn priority_preview(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<PriorityPreviewQuery>,
) -> Result<Json<PriorityScore>, AppError> {
    if !user.has_permission("create:tickets") {
        return Err(AppError::InsufficientPermissions);
    }

    let store = RuleStore::new(state.db.clone());
    let service = PriorityService::new(store, state.vendor_directory.clone());
    let priority = service
        .score(query.vendor_handle.as_deref(), query.category_id)
        .await?;

    Ok(Json(priority))
}
