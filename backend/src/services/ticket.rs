//! Ticket service
//!
//! Orchestrates ticket intake (field validation, priority scoring,
//! routing, persistence) and the status/assignment transitions afterward.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{CategorySnapshot, PriorityTier, Ticket, TicketStatus};
use crate::services::priority::PriorityService;
use crate::services::routing::RoutingService;
use crate::services::rule_store::RuleStore;
use shared::{
    category_display, missing_required_fields, resolve_fields, validate_subject, DepartmentType,
    PaginatedResponse, Pagination, PaginationMeta,
};

/// Ticket service
#[derive(Clone)]
pub struct TicketService {
    store: RuleStore,
    priority: PriorityService,
    routing: RoutingService,
}

/// Database row for a ticket
#[derive(Debug, sqlx::FromRow)]
struct TicketRow {
    id: Uuid,
    subject: String,
    description: String,
    category_id: Option<Uuid>,
    category_snapshot: Option<serde_json::Value>,
    department: String,
    vendor_handle: Option<String>,
    requester_id: Uuid,
    status: String,
    priority_score: i32,
    priority_tier: String,
    priority_badge: String,
    assignee_id: Option<Uuid>,
    sla_response_target: Option<DateTime<Utc>>,
    sla_resolve_target: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TicketRow> for Ticket {
    fn from(row: TicketRow) -> Self {
        let category_snapshot: Option<CategorySnapshot> = row
            .category_snapshot
            .and_then(|v| serde_json::from_value(v).ok());

        Ticket {
            id: row.id,
            subject: row.subject,
            description: row.description,
            category_id: row.category_id,
            category_snapshot,
            department: row.department,
            vendor_handle: row.vendor_handle,
            requester_id: row.requester_id,
            status: TicketStatus::parse(&row.status),
            priority_score: row.priority_score,
            priority_tier: PriorityTier::parse(&row.priority_tier),
            priority_badge: row.priority_badge,
            assignee_id: row.assignee_id,
            sla_response_target: row.sla_response_target,
            sla_resolve_target: row.sla_resolve_target,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for creating a ticket
#[derive(Debug, Deserialize)]
pub struct CreateTicketInput {
    pub subject: String,
    pub description: String,
    pub department: String,
    pub issue_type: Option<String>,
    pub category_id: Option<Uuid>,
    pub vendor_handle: Option<String>,
    /// Values for the dynamic intake fields, keyed by field name
    #[serde(default)]
    pub field_values: HashMap<String, String>,
}

/// Filter for listing tickets
#[derive(Debug, Default, Deserialize)]
pub struct TicketListFilter {
    pub status: Option<TicketStatus>,
    pub department: Option<String>,
    pub assignee_id: Option<Uuid>,
}

/// A ticket with its resolved category label
#[derive(Debug, Serialize)]
pub struct TicketView {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub category_label: String,
}

impl TicketService {
    /// Create a new TicketService instance
    pub fn new(store: RuleStore, priority: PriorityService, routing: RoutingService) -> Self {
        Self {
            store,
            priority,
            routing,
        }
    }

    fn db(&self) -> &PgPool {
        self.store.pool()
    }

    /// Create a ticket: validate the resolved required fields, score it,
    /// route it, and persist it. Assignment and the induced `New -> Open`
    /// status change land in the same insert, so they are atomic from the
    /// caller's perspective.
    pub async fn create_ticket(
        &self,
        requester_id: Uuid,
        department_type: DepartmentType,
        input: CreateTicketInput,
    ) -> AppResult<TicketView> {
        validate_subject(&input.subject).map_err(|message| AppError::Validation {
            field: "subject".to_string(),
            message: message.to_string(),
        })?;

        // A dangling category id falls back to the no-category defaults
        // instead of failing intake
        let category = match input.category_id {
            Some(category_id) => {
                let found = self.store.get_category(category_id).await?;
                if found.is_none() {
                    tracing::warn!(
                        "Ticket submitted with unknown category {}, scoring with defaults",
                        category_id
                    );
                }
                found
            }
            None => None,
        };
        let category_id = category.as_ref().map(|c| c.id);

        self.check_required_fields(department_type, category_id, &input)
            .await?;

        let base_priority = self
            .priority
            .score(input.vendor_handle.as_deref(), category_id)
            .await?;

        let now = Utc::now();
        let resolution = self
            .routing
            .route(category_id, &input.department, base_priority, now)
            .await?;

        let status = if resolution.assignee_id.is_some() {
            TicketStatus::Open
        } else {
            TicketStatus::New
        };

        let snapshot = category.as_ref().map(CategorySnapshot::of);
        let snapshot_json = snapshot
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let row = sqlx::query_as::<_, TicketRow>(
            r#"
            INSERT INTO tickets (
                subject, description, category_id, category_snapshot,
                department, vendor_handle, requester_id, status,
                priority_score, priority_tier, priority_badge, assignee_id,
                sla_response_target, sla_resolve_target
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id, subject, description, category_id, category_snapshot,
                      department, vendor_handle, requester_id, status,
                      priority_score, priority_tier, priority_badge, assignee_id,
                      sla_response_target, sla_resolve_target, created_at, updated_at
            "#,
        )
        .bind(&input.subject)
        .bind(&input.description)
        .bind(category_id)
        .bind(&snapshot_json)
        .bind(&resolution.department)
        .bind(&input.vendor_handle)
        .bind(requester_id)
        .bind(status.as_str())
        .bind(resolution.priority.score)
        .bind(resolution.priority.tier.as_str())
        .bind(&resolution.priority.badge)
        .bind(resolution.assignee_id)
        .bind(resolution.sla_response_target)
        .bind(resolution.sla_resolve_target)
        .fetch_one(self.db())
        .await?;

        tracing::info!(
            "Ticket {} created: department={}, tier={}, assignee={:?}",
            row.id,
            resolution.department,
            resolution.priority.tier,
            resolution.assignee_id
        );

        Ok(self.into_view(row.into()))
    }

    /// Validate that every visible required intake field has a value
    async fn check_required_fields(
        &self,
        department_type: DepartmentType,
        category_id: Option<Uuid>,
        input: &CreateTicketInput,
    ) -> AppResult<()> {
        let configs = self.store.get_field_configurations().await?;
        let overrides = match category_id {
            Some(category_id) => {
                Some(self.store.get_category_field_overrides(category_id).await?)
            }
            None => None,
        };

        let fields = resolve_fields(department_type, overrides.as_deref(), &configs);

        // Core fields arrive as dedicated columns; merge them with the
        // dynamic values so one check covers both
        let mut values = input.field_values.clone();
        values.insert("subject".to_string(), input.subject.clone());
        values.insert("description".to_string(), input.description.clone());
        values.insert("department".to_string(), input.department.clone());
        if let Some(issue_type) = &input.issue_type {
            values.insert("issue_type".to_string(), issue_type.clone());
        }
        if let Some(category_id) = category_id {
            values.insert("category_id".to_string(), category_id.to_string());
        }

        let missing = missing_required_fields(&fields, &values);
        if !missing.is_empty() {
            return Err(AppError::MissingRequiredFields { fields: missing });
        }

        Ok(())
    }

    /// Get a ticket by id
    pub async fn get_ticket(&self, ticket_id: Uuid) -> AppResult<TicketView> {
        let row = sqlx::query_as::<_, TicketRow>(
            r#"
            SELECT id, subject, description, category_id, category_snapshot,
                   department, vendor_handle, requester_id, status,
                   priority_score, priority_tier, priority_badge, assignee_id,
                   sla_response_target, sla_resolve_target, created_at, updated_at
            FROM tickets
            WHERE id = $1
            "#,
        )
        .bind(ticket_id)
        .fetch_optional(self.db())
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket".to_string()))?;

        let ticket: Ticket = row.into();

        // The snapshot usually answers this; fall back to the live category
        // for pre-snapshot rows
        if ticket.category_snapshot.is_none() {
            if let Some(category_id) = ticket.category_id {
                let live = self.store.get_category(category_id).await?;
                let label = category_display(None, live.as_ref());
                return Ok(TicketView {
                    category_label: label,
                    ticket,
                });
            }
        }

        Ok(self.into_view(ticket))
    }

    /// List tickets matching a filter, newest first
    pub async fn list_tickets(
        &self,
        filter: TicketListFilter,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<TicketView>> {
        let per_page = pagination.per_page.clamp(1, 100);
        let page = pagination.page.max(1);
        let offset = (page - 1) * per_page;

        let rows = sqlx::query_as::<_, TicketRow>(
            r#"
            SELECT id, subject, description, category_id, category_snapshot,
                   department, vendor_handle, requester_id, status,
                   priority_score, priority_tier, priority_badge, assignee_id,
                   sla_response_target, sla_resolve_target, created_at, updated_at
            FROM tickets
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::text IS NULL OR department = $2)
              AND ($3::uuid IS NULL OR assignee_id = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(filter.status.map(|s| s.as_str().to_string()))
        .bind(&filter.department)
        .bind(filter.assignee_id)
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(self.db())
        .await?;

        let total_items = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM tickets
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::text IS NULL OR department = $2)
              AND ($3::uuid IS NULL OR assignee_id = $3)
            "#,
        )
        .bind(filter.status.map(|s| s.as_str().to_string()))
        .bind(&filter.department)
        .bind(filter.assignee_id)
        .fetch_one(self.db())
        .await? as u64;

        let data = rows
            .into_iter()
            .map(|row| self.into_view(row.into()))
            .collect();

        let total_pages = total_items.div_ceil(per_page as u64) as u32;

        Ok(PaginatedResponse {
            data,
            pagination: PaginationMeta {
                page,
                per_page,
                total_items,
                total_pages,
            },
        })
    }

    /// Transition a ticket's status, enforcing the state machine
    pub async fn update_status(
        &self,
        ticket_id: Uuid,
        next: TicketStatus,
    ) -> AppResult<TicketView> {
        let current = sqlx::query_scalar::<_, String>(
            "SELECT status FROM tickets WHERE id = $1",
        )
        .bind(ticket_id)
        .fetch_optional(self.db())
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket".to_string()))?;

        let current = TicketStatus::parse(&current);
        if !current.can_transition(next) {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot move ticket from {} to {}",
                current, next
            )));
        }

        sqlx::query("UPDATE tickets SET status = $1, updated_at = now() WHERE id = $2")
            .bind(next.as_str())
            .bind(ticket_id)
            .execute(self.db())
            .await?;

        self.get_ticket(ticket_id).await
    }

    /// Manually assign a ticket. A `New` ticket opens as part of the same
    /// update, matching the routing-induced transition.
    pub async fn assign(&self, ticket_id: Uuid, assignee_id: Uuid) -> AppResult<TicketView> {
        let updated = sqlx::query(
            r#"
            UPDATE tickets
            SET assignee_id = $1,
                status = CASE WHEN status = 'new' THEN 'open' ELSE status END,
                updated_at = now()
            WHERE id = $2
            "#,
        )
        .bind(assignee_id)
        .bind(ticket_id)
        .execute(self.db())
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("Ticket".to_string()));
        }

        self.get_ticket(ticket_id).await
    }

    fn into_view(&self, ticket: Ticket) -> TicketView {
        let category_label = category_display(ticket.category_snapshot.as_ref(), None);
        TicketView {
            category_label,
            ticket,
        }
    }
}
