//! Ticket routing engine
//!
//! Resolves the target department and assignee for a new ticket from the
//! per-category routing rules, applies priority boosts and SLA overrides,
//! and manages the rules themselves.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::SlaConfig;
use crate::error::{AppError, AppResult};
use crate::services::rule_store::RuleStore;
use shared::{
    pick_least_loaded, pick_round_robin, validate_routing_rule, validate_sla_hours,
    AssignmentStrategy, PriorityScore, RoutingRule,
};

/// Routing engine service
#[derive(Clone)]
pub struct RoutingService {
    store: RuleStore,
    sla: SlaConfig,
}

/// The outcome of routing one ticket
#[derive(Debug, Clone)]
pub struct RoutingResolution {
    pub department: String,
    pub assignee_id: Option<Uuid>,
    pub priority: PriorityScore,
    pub sla_response_target: DateTime<Utc>,
    pub sla_resolve_target: DateTime<Utc>,
    pub rule_id: Option<Uuid>,
}

/// Input for creating or replacing a category's routing rule
#[derive(Debug, Deserialize)]
pub struct UpsertRoutingRuleInput {
    pub target_department: String,
    pub auto_assign_enabled: bool,
    pub assignment_strategy: AssignmentStrategy,
    pub assigned_agent_id: Option<Uuid>,
    #[serde(default)]
    pub priority_boost: i32,
    pub sla_response_hours_override: Option<i32>,
    pub sla_resolution_hours_override: Option<i32>,
}

impl RoutingService {
    /// Create a new RoutingService instance
    pub fn new(store: RuleStore, sla: SlaConfig) -> Self {
        Self { store, sla }
    }

    fn db(&self) -> &PgPool {
        self.store.pool()
    }

    /// Route a ticket: resolve department, apply the rule's priority boost,
    /// compute SLA targets, and pick an assignee when auto-assignment is
    /// enabled.
    ///
    /// Rules are validated at write time, so routing assumes a well-formed
    /// rule. With no active rule the submitted department stands and the
    /// ticket remains unassigned.
    pub async fn route(
        &self,
        category_id: Option<Uuid>,
        submitted_department: &str,
        base_priority: PriorityScore,
        now: DateTime<Utc>,
    ) -> AppResult<RoutingResolution> {
        let rule = match category_id {
            Some(category_id) => self.store.get_active_routing_rule(category_id).await?,
            None => None,
        };

        let Some(rule) = rule else {
            return Ok(RoutingResolution {
                sla_response_target: now + Duration::hours(self.sla.response_hours as i64),
                sla_resolve_target: now
                    + Duration::hours(self.sla.resolution_hours_for(submitted_department) as i64),
                department: submitted_department.to_string(),
                assignee_id: None,
                priority: base_priority,
                rule_id: None,
            });
        };

        let priority = base_priority.boosted(rule.priority_boost);

        let response_hours = rule
            .sla_response_hours_override
            .unwrap_or(self.sla.response_hours);
        let resolution_hours = rule
            .sla_resolution_hours_override
            .unwrap_or_else(|| self.sla.resolution_hours_for(&rule.target_department));

        let assignee_id = if rule.auto_assign_enabled {
            self.select_assignee(&rule).await?
        } else {
            None
        };

        Ok(RoutingResolution {
            department: rule.target_department.clone(),
            assignee_id,
            priority,
            sla_response_target: now + Duration::hours(response_hours as i64),
            sla_resolve_target: now + Duration::hours(resolution_hours as i64),
            rule_id: Some(rule.id),
        })
    }

    /// Dispatch on the rule's assignment strategy.
    async fn select_assignee(&self, rule: &RoutingRule) -> AppResult<Option<Uuid>> {
        match rule.assignment_strategy {
            // Unconditional by contract; the agent was validated when the
            // rule was written
            AssignmentStrategy::SpecificAgent => Ok(rule.assigned_agent_id),

            AssignmentStrategy::RoundRobin => {
                // Roster read fresh each call; membership changes take
                // effect on the next assignment
                let roster = self.store.get_active_agents(&rule.target_department).await?;
                if roster.is_empty() {
                    tracing::warn!(
                        "Routing rule {} has no active agents in {}, leaving unassigned",
                        rule.id,
                        rule.target_department
                    );
                    return Ok(None);
                }

                let position = self.store.next_rotation_position(rule.id).await?;
                Ok(pick_round_robin(&roster, position))
            }

            AssignmentStrategy::LeastLoaded => {
                // The count-then-insert pair is not serialized against other
                // routing decisions; balancing is eventual, not exact
                let loads = self.store.agent_loads(&rule.target_department).await?;
                Ok(pick_least_loaded(&loads))
            }
        }
    }

    // ========================================================================
    // Rule administration
    // ========================================================================

    /// List all active routing rules
    pub async fn list_rules(&self) -> AppResult<Vec<RoutingRule>> {
        self.store.list_active_routing_rules().await
    }

    /// Get the active rule for a category
    pub async fn get_rule(&self, category_id: Uuid) -> AppResult<RoutingRule> {
        self.store
            .get_active_routing_rule(category_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Routing rule".to_string()))
    }

    /// Create or replace the routing rule for a category.
    ///
    /// Invalid rules are rejected here so routing never has to re-validate:
    /// a `specific_agent` rule must name an agent, and that agent must be
    /// active at write time.
    pub async fn upsert_rule(
        &self,
        category_id: Uuid,
        input: UpsertRoutingRuleInput,
    ) -> AppResult<RoutingRule> {
        self.store
            .get_category(category_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Category".to_string()))?;

        validate_routing_rule(
            input.assignment_strategy,
            input.assigned_agent_id,
            input.priority_boost,
        )
        .map_err(|message| AppError::Validation {
            field: "assignment_strategy".to_string(),
            message: message.to_string(),
        })?;

        for (field, hours) in [
            ("sla_response_hours_override", input.sla_response_hours_override),
            ("sla_resolution_hours_override", input.sla_resolution_hours_override),
        ] {
            validate_sla_hours(hours).map_err(|message| AppError::Validation {
                field: field.to_string(),
                message: message.to_string(),
            })?;
        }

        if input.assignment_strategy == AssignmentStrategy::SpecificAgent {
            // validate_routing_rule guarantees the id is present
            if let Some(agent_id) = input.assigned_agent_id {
                if !self.store.is_active_agent(agent_id).await? {
                    return Err(AppError::Validation {
                        field: "assigned_agent_id".to_string(),
                        message: "Assigned agent must be an active Agent-role user".to_string(),
                    });
                }
            }
        }

        // Replace-then-insert inside one transaction keeps the at most one
        // active rule per category invariant that the partial unique index
        // enforces
        let mut tx = self.db().begin().await?;

        sqlx::query(
            "UPDATE routing_rules SET is_active = false WHERE category_id = $1 AND is_active = true",
        )
        .bind(category_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO routing_rules (
                category_id, target_department, auto_assign_enabled,
                assignment_strategy, assigned_agent_id, priority_boost,
                sla_response_hours_override, sla_resolution_hours_override,
                is_active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, true)
            "#,
        )
        .bind(category_id)
        .bind(&input.target_department)
        .bind(input.auto_assign_enabled)
        .bind(input.assignment_strategy.as_str())
        .bind(input.assigned_agent_id)
        .bind(input.priority_boost)
        .bind(input.sla_response_hours_override)
        .bind(input.sla_resolution_hours_override)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_rule(category_id).await
    }

    /// Deactivate the routing rule for a category. Tickets in that
    /// category fall back to their submitted department.
    pub async fn delete_rule(&self, category_id: Uuid) -> AppResult<()> {
        let updated = sqlx::query(
            "UPDATE routing_rules SET is_active = false WHERE category_id = $1 AND is_active = true",
        )
        .bind(category_id)
        .execute(self.db())
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("Routing rule".to_string()));
        }

        Ok(())
    }
}
