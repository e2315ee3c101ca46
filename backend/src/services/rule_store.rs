//! Read/write access to the policy configuration entities
//!
//! The RuleStore is the single source of truth the resolvers consult:
//! roles, permissions, page/feature definitions and overrides, field
//! configurations, the category hierarchy, routing rules, and agent
//! rosters. Apart from the explicit override upserts and the rotation
//! cursor, nothing here mutates state.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use shared::{
    AgentLoad, AssignmentStrategy, Category, CategoryFieldOverride, DepartmentType, Feature,
    FeatureType, FieldConfiguration, FieldVisibility, Page, Role, RoleFeatureAccess,
    RolePageAccess, RoutingRule, User, UserFeatureAccess, UserPageAccess,
};

/// Whether an override row is scoped to a role or to a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessScope {
    Role,
    User,
}

impl AccessScope {
    fn table_prefix(&self) -> &'static str {
        match self {
            AccessScope::Role => "role",
            AccessScope::User => "user",
        }
    }
}

/// Store handle shared by the resolver services
#[derive(Clone)]
pub struct RuleStore {
    db: PgPool,
}

/// Database row for a user
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    role_id: Uuid,
    department: String,
    sub_department: Option<String>,
    department_type: String,
    custom_permissions: Option<serde_json::Value>,
    manager_id: Option<Uuid>,
    is_active: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl UserRow {
    fn into_user(self, additional_role_ids: Vec<Uuid>) -> User {
        let custom_permissions = self
            .custom_permissions
            .and_then(|v| serde_json::from_value(v).ok());

        User {
            id: self.id,
            email: self.email,
            name: self.name,
            role_id: self.role_id,
            additional_role_ids,
            department: self.department,
            sub_department: self.sub_department,
            department_type: DepartmentType::parse(&self.department_type),
            custom_permissions,
            manager_id: self.manager_id,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Database row for a routing rule
#[derive(Debug, sqlx::FromRow)]
struct RoutingRuleRow {
    id: Uuid,
    category_id: Uuid,
    target_department: String,
    auto_assign_enabled: bool,
    assignment_strategy: String,
    assigned_agent_id: Option<Uuid>,
    priority_boost: i32,
    sla_response_hours_override: Option<i32>,
    sla_resolution_hours_override: Option<i32>,
    is_active: bool,
}

impl From<RoutingRuleRow> for RoutingRule {
    fn from(row: RoutingRuleRow) -> Self {
        RoutingRule {
            id: row.id,
            category_id: row.category_id,
            target_department: row.target_department,
            auto_assign_enabled: row.auto_assign_enabled,
            assignment_strategy: AssignmentStrategy::parse(&row.assignment_strategy),
            assigned_agent_id: row.assigned_agent_id,
            priority_boost: row.priority_boost,
            sla_response_hours_override: row.sla_response_hours_override,
            sla_resolution_hours_override: row.sla_resolution_hours_override,
            is_active: row.is_active,
        }
    }
}

/// Database row for a category
#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    issue_type: String,
    l1: String,
    l2: Option<String>,
    l3: Option<String>,
    l4: Option<String>,
    path: String,
    department_type: String,
    issue_priority_points: i32,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            issue_type: row.issue_type,
            l1: row.l1,
            l2: row.l2,
            l3: row.l3,
            l4: row.l4,
            path: row.path,
            department_type: DepartmentType::parse(&row.department_type),
            issue_priority_points: row.issue_priority_points,
        }
    }
}

impl RuleStore {
    /// Create a new RuleStore instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }

    // ========================================================================
    // Roles and permissions
    // ========================================================================

    /// Seed the system roles and their default grants from the immutable
    /// table in `shared`. Idempotent; runs once at startup so runtime code
    /// only ever consults the store.
    pub async fn seed_system_roles(&self) -> AppResult<()> {
        for (name, grants) in shared::default_role_permissions() {
            let role_id = sqlx::query_scalar::<_, Uuid>(
                r#"
                INSERT INTO roles (name, is_system)
                VALUES ($1, true)
                ON CONFLICT (name) DO UPDATE SET is_system = true
                RETURNING id
                "#,
            )
            .bind(name)
            .fetch_one(&self.db)
            .await?;

            for grant in grants {
                sqlx::query(
                    r#"
                    INSERT INTO role_permissions (role_id, permission_id)
                    SELECT $1, id FROM permissions WHERE name = $2
                    ON CONFLICT DO NOTHING
                    "#,
                )
                .bind(role_id)
                .bind(grant)
                .execute(&self.db)
                .await?;
            }
        }

        Ok(())
    }

    /// Get a role with its permission names
    pub async fn get_role(&self, role_id: Uuid) -> AppResult<Option<Role>> {
        let role = sqlx::query_as::<_, (Uuid, String, bool)>(
            "SELECT id, name, is_system FROM roles WHERE id = $1",
        )
        .bind(role_id)
        .fetch_optional(&self.db)
        .await?;

        let Some((id, name, is_system)) = role else {
            return Ok(None);
        };

        let permissions = self.get_permission_names(&[id]).await?;

        Ok(Some(Role {
            id,
            name,
            is_system,
            permissions,
        }))
    }

    /// Permission names granted to any of the given roles (union)
    pub async fn get_permission_names(&self, role_ids: &[Uuid]) -> AppResult<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT p.name
            FROM permissions p
            JOIN role_permissions rp ON rp.permission_id = p.id
            WHERE rp.role_id = ANY($1)
            ORDER BY p.name
            "#,
        )
        .bind(role_ids)
        .fetch_all(&self.db)
        .await?;

        Ok(names)
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Get a user with their additional role ids
    pub async fn get_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, name, role_id, department, sub_department,
                   department_type, custom_permissions, manager_id, is_active,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let additional = sqlx::query_scalar::<_, Uuid>(
            "SELECT role_id FROM user_roles WHERE user_id = $1 ORDER BY role_id",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(Some(row.into_user(additional)))
    }

    /// List users ordered by name, each with their additional role ids
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, name, role_id, department, sub_department,
                   department_type, custom_permissions, manager_id, is_active,
                   created_at, updated_at
            FROM users
            ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let links = sqlx::query_as::<_, (Uuid, Uuid)>(
            "SELECT user_id, role_id FROM user_roles ORDER BY role_id",
        )
        .fetch_all(&self.db)
        .await?;

        let mut additional: std::collections::HashMap<Uuid, Vec<Uuid>> =
            std::collections::HashMap::new();
        for (user_id, role_id) in links {
            additional.entry(user_id).or_default().push(role_id);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let roles = additional.remove(&row.id).unwrap_or_default();
                row.into_user(roles)
            })
            .collect())
    }

    // ========================================================================
    // Pages, features and access overrides
    // ========================================================================

    /// Get a page definition
    pub async fn get_page(&self, page_key: &str) -> AppResult<Option<Page>> {
        let page = sqlx::query_as::<_, (String, bool, bool)>(
            "SELECT page_key, default_enabled, is_active FROM pages WHERE page_key = $1",
        )
        .bind(page_key)
        .fetch_optional(&self.db)
        .await?;

        Ok(page.map(|(page_key, default_enabled, is_active)| Page {
            page_key,
            default_enabled,
            is_active,
        }))
    }

    /// Get a feature definition
    pub async fn get_feature(
        &self,
        page_key: &str,
        feature_key: &str,
    ) -> AppResult<Option<Feature>> {
        let feature = sqlx::query_as::<_, (String, String, String, bool)>(
            r#"
            SELECT page_key, feature_key, feature_type, default_enabled
            FROM features
            WHERE page_key = $1 AND feature_key = $2
            "#,
        )
        .bind(page_key)
        .bind(feature_key)
        .fetch_optional(&self.db)
        .await?;

        Ok(feature.map(|(page_key, feature_key, feature_type, default_enabled)| Feature {
            page_key,
            feature_key,
            feature_type: FeatureType::parse(&feature_type),
            default_enabled,
        }))
    }

    /// Page access override for a role or user. `None` means no override
    /// row exists and resolution defers to the next level.
    pub async fn get_page_override(
        &self,
        scope: AccessScope,
        owner_id: Uuid,
        page_key: &str,
    ) -> AppResult<Option<bool>> {
        let query = format!(
            "SELECT enabled FROM {}_page_access WHERE {}_id = $1 AND page_key = $2",
            scope.table_prefix(),
            scope.table_prefix()
        );

        let enabled = sqlx::query_scalar::<_, bool>(&query)
            .bind(owner_id)
            .bind(page_key)
            .fetch_optional(&self.db)
            .await?;

        Ok(enabled)
    }

    /// Feature access override for a role or user
    pub async fn get_feature_override(
        &self,
        scope: AccessScope,
        owner_id: Uuid,
        page_key: &str,
        feature_key: &str,
    ) -> AppResult<Option<bool>> {
        let query = format!(
            "SELECT enabled FROM {}_feature_access WHERE {}_id = $1 AND page_key = $2 AND feature_key = $3",
            scope.table_prefix(),
            scope.table_prefix()
        );

        let enabled = sqlx::query_scalar::<_, bool>(&query)
            .bind(owner_id)
            .bind(page_key)
            .bind(feature_key)
            .fetch_optional(&self.db)
            .await?;

        Ok(enabled)
    }

    /// Upsert a page access override row
    pub async fn set_page_override(
        &self,
        scope: AccessScope,
        owner_id: Uuid,
        page_key: &str,
        enabled: bool,
    ) -> AppResult<()> {
        let query = format!(
            r#"
            INSERT INTO {prefix}_page_access ({prefix}_id, page_key, enabled)
            VALUES ($1, $2, $3)
            ON CONFLICT ({prefix}_id, page_key) DO UPDATE SET enabled = $3
            "#,
            prefix = scope.table_prefix()
        );

        sqlx::query(&query)
            .bind(owner_id)
            .bind(page_key)
            .bind(enabled)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Delete a page access override row (revert to the next level)
    pub async fn clear_page_override(
        &self,
        scope: AccessScope,
        owner_id: Uuid,
        page_key: &str,
    ) -> AppResult<()> {
        let query = format!(
            "DELETE FROM {prefix}_page_access WHERE {prefix}_id = $1 AND page_key = $2",
            prefix = scope.table_prefix()
        );

        sqlx::query(&query)
            .bind(owner_id)
            .bind(page_key)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Upsert a feature access override row
    pub async fn set_feature_override(
        &self,
        scope: AccessScope,
        owner_id: Uuid,
        page_key: &str,
        feature_key: &str,
        enabled: bool,
    ) -> AppResult<()> {
        let query = format!(
            r#"
            INSERT INTO {prefix}_feature_access ({prefix}_id, page_key, feature_key, enabled)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT ({prefix}_id, page_key, feature_key) DO UPDATE SET enabled = $4
            "#,
            prefix = scope.table_prefix()
        );

        sqlx::query(&query)
            .bind(owner_id)
            .bind(page_key)
            .bind(feature_key)
            .bind(enabled)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Delete a feature access override row
    pub async fn clear_feature_override(
        &self,
        scope: AccessScope,
        owner_id: Uuid,
        page_key: &str,
        feature_key: &str,
    ) -> AppResult<()> {
        let query = format!(
            "DELETE FROM {prefix}_feature_access WHERE {prefix}_id = $1 AND page_key = $2 AND feature_key = $3",
            prefix = scope.table_prefix()
        );

        sqlx::query(&query)
            .bind(owner_id)
            .bind(page_key)
            .bind(feature_key)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// All page override rows for a role
    pub async fn list_role_page_overrides(
        &self,
        role_id: Uuid,
    ) -> AppResult<Vec<RolePageAccess>> {
        let rows = sqlx::query_as::<_, (Uuid, String, bool)>(
            "SELECT role_id, page_key, enabled FROM role_page_access WHERE role_id = $1 ORDER BY page_key",
        )
        .bind(role_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(role_id, page_key, enabled)| RolePageAccess {
                role_id,
                page_key,
                enabled,
            })
            .collect())
    }

    /// All feature override rows for a role
    pub async fn list_role_feature_overrides(
        &self,
        role_id: Uuid,
    ) -> AppResult<Vec<RoleFeatureAccess>> {
        let rows = sqlx::query_as::<_, (Uuid, String, String, bool)>(
            r#"
            SELECT role_id, page_key, feature_key, enabled
            FROM role_feature_access
            WHERE role_id = $1
            ORDER BY page_key, feature_key
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(role_id, page_key, feature_key, enabled)| RoleFeatureAccess {
                role_id,
                page_key,
                feature_key,
                enabled,
            })
            .collect())
    }

    /// All page override rows for a user
    pub async fn list_user_page_overrides(
        &self,
        user_id: Uuid,
    ) -> AppResult<Vec<UserPageAccess>> {
        let rows = sqlx::query_as::<_, (Uuid, String, bool)>(
            "SELECT user_id, page_key, enabled FROM user_page_access WHERE user_id = $1 ORDER BY page_key",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(user_id, page_key, enabled)| UserPageAccess {
                user_id,
                page_key,
                enabled,
            })
            .collect())
    }

    /// All feature override rows for a user
    pub async fn list_user_feature_overrides(
        &self,
        user_id: Uuid,
    ) -> AppResult<Vec<UserFeatureAccess>> {
        let rows = sqlx::query_as::<_, (Uuid, String, String, bool)>(
            r#"
            SELECT user_id, page_key, feature_key, enabled
            FROM user_feature_access
            WHERE user_id = $1
            ORDER BY page_key, feature_key
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(user_id, page_key, feature_key, enabled)| UserFeatureAccess {
                user_id,
                page_key,
                feature_key,
                enabled,
            })
            .collect())
    }

    // ========================================================================
    // Field configurations
    // ========================================================================

    /// All base field configurations, ordered for display
    pub async fn get_field_configurations(&self) -> AppResult<Vec<FieldConfiguration>> {
        let rows = sqlx::query_as::<_, (String, String, bool, bool, i32, String)>(
            r#"
            SELECT field_name, field_label, is_enabled, is_required,
                   display_order, department_type
            FROM field_configurations
            ORDER BY display_order
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(field_name, field_label, is_enabled, is_required, display_order, dept)| {
                    FieldConfiguration {
                        field_name,
                        field_label,
                        is_enabled,
                        is_required,
                        display_order,
                        department_type: DepartmentType::parse(&dept),
                    }
                },
            )
            .collect())
    }

    /// Override rows a category applies to the base field configurations
    pub async fn get_category_field_overrides(
        &self,
        category_id: Uuid,
    ) -> AppResult<Vec<CategoryFieldOverride>> {
        let rows = sqlx::query_as::<_, (Uuid, String, Option<String>, Option<bool>)>(
            r#"
            SELECT category_id, field_name, visibility_override, required_override
            FROM category_field_overrides
            WHERE category_id = $1
            "#,
        )
        .bind(category_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(category_id, field_name, visibility, required_override)| {
                CategoryFieldOverride {
                    category_id,
                    field_name,
                    visibility_override: visibility.as_deref().map(|v| match v {
                        "hidden" => FieldVisibility::Hidden,
                        _ => FieldVisibility::Visible,
                    }),
                    required_override,
                }
            })
            .collect())
    }

    // ========================================================================
    // Categories
    // ========================================================================

    /// Get a category by id
    pub async fn get_category(&self, category_id: Uuid) -> AppResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, issue_type, l1, l2, l3, l4, path, department_type,
                   issue_priority_points
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(category_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List categories ordered by path, optionally narrowed to a
    /// department type (plus the shared `all` scope)
    pub async fn list_categories(
        &self,
        department_type: Option<DepartmentType>,
    ) -> AppResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, issue_type, l1, l2, l3, l4, path, department_type,
                   issue_priority_points
            FROM categories
            WHERE $1::text IS NULL OR department_type = $1 OR department_type = 'all'
            ORDER BY path
            "#,
        )
        .bind(department_type.map(|d| d.as_str().to_string()))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    // ========================================================================
    // Routing
    // ========================================================================

    /// The active routing rule for a category, if any. At most one exists;
    /// the schema enforces this with a partial unique index.
    pub async fn get_active_routing_rule(
        &self,
        category_id: Uuid,
    ) -> AppResult<Option<RoutingRule>> {
        let row = sqlx::query_as::<_, RoutingRuleRow>(
            r#"
            SELECT id, category_id, target_department, auto_assign_enabled,
                   assignment_strategy, assigned_agent_id, priority_boost,
                   sla_response_hours_override, sla_resolution_hours_override,
                   is_active
            FROM routing_rules
            WHERE category_id = $1 AND is_active = true
            "#,
        )
        .bind(category_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    /// All active routing rules, ordered by category
    pub async fn list_active_routing_rules(&self) -> AppResult<Vec<RoutingRule>> {
        let rows = sqlx::query_as::<_, RoutingRuleRow>(
            r#"
            SELECT id, category_id, target_department, auto_assign_enabled,
                   assignment_strategy, assigned_agent_id, priority_boost,
                   sla_response_hours_override, sla_resolution_hours_override,
                   is_active
            FROM routing_rules
            WHERE is_active = true
            ORDER BY category_id
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Active Agent-role users of a department, ordered by id so the
    /// round-robin rotation is stable between membership changes
    pub async fn get_active_agents(&self, department: &str) -> AppResult<Vec<Uuid>> {
        let agents = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT u.id
            FROM users u
            JOIN roles r ON r.id = u.role_id
            WHERE u.department = $1 AND u.is_active = true AND r.name = 'Agent'
            ORDER BY u.id
            "#,
        )
        .bind(department)
        .fetch_all(&self.db)
        .await?;

        Ok(agents)
    }

    /// Whether the given user is an active Agent (used at rule-write time)
    pub async fn is_active_agent(&self, agent_id: Uuid) -> AppResult<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM users u
            JOIN roles r ON r.id = u.role_id
            WHERE u.id = $1 AND u.is_active = true AND r.name = 'Agent'
            "#,
        )
        .bind(agent_id)
        .fetch_one(&self.db)
        .await?;

        Ok(count > 0)
    }

    /// Atomically advance and read the rotation cursor for a routing rule.
    ///
    /// The increment happens in a single statement against the cursor row,
    /// never as an application-side read-modify-write, so two concurrent
    /// ticket creations in the same category cannot observe the same
    /// position.
    pub async fn next_rotation_position(&self, rule_id: Uuid) -> AppResult<i64> {
        let position = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO routing_cursors (rule_id, position)
            VALUES ($1, 0)
            ON CONFLICT (rule_id)
            DO UPDATE SET position = routing_cursors.position + 1
            RETURNING position
            "#,
        )
        .bind(rule_id)
        .fetch_one(&self.db)
        .await?;

        Ok(position)
    }

    // ========================================================================
    // Open ticket counts
    // ========================================================================

    /// Number of a vendor's tickets currently in an open status. A
    /// point-in-time snapshot; racing creations only affect score accuracy.
    pub async fn open_ticket_count_by_vendor(&self, vendor_handle: &str) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM tickets
            WHERE vendor_handle = $1 AND status IN ('new', 'open', 'pending')
            "#,
        )
        .bind(vendor_handle)
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }

    /// Open-ticket counts for every active agent of a department,
    /// including agents with zero open tickets
    pub async fn agent_loads(&self, department: &str) -> AppResult<Vec<AgentLoad>> {
        let rows = sqlx::query_as::<_, (Uuid, i64)>(
            r#"
            SELECT u.id,
                   COUNT(t.id) FILTER (WHERE t.status IN ('new', 'open', 'pending')) AS open_tickets
            FROM users u
            JOIN roles r ON r.id = u.role_id
            LEFT JOIN tickets t ON t.assignee_id = u.id
            WHERE u.department = $1 AND u.is_active = true AND r.name = 'Agent'
            GROUP BY u.id
            ORDER BY u.id
            "#,
        )
        .bind(department)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(agent_id, open_tickets)| AgentLoad {
                agent_id,
                open_tickets,
            })
            .collect())
    }
}
