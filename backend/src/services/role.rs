//! Role management service for custom roles and permissions

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::SYSTEM_ROLE_NAMES;

/// Role service for managing custom roles
#[derive(Clone)]
pub struct RoleService {
    db: PgPool,
}

/// Role information
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_system: bool,
}

/// Permission information
#[derive(Debug, Serialize, Clone, sqlx::FromRow)]
pub struct Permission {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub is_system: bool,
}

/// Input for creating a custom role
#[derive(Debug, Deserialize)]
pub struct CreateRoleInput {
    pub name: String,
    pub description: Option<String>,
    pub permission_ids: Vec<Uuid>,
}

/// Input for updating a role
#[derive(Debug, Deserialize)]
pub struct UpdateRoleInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub permission_ids: Option<Vec<Uuid>>,
}

/// Role with its permissions
#[derive(Debug, Serialize)]
pub struct RoleWithPermissions {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<Permission>,
}

impl RoleService {
    /// Create a new RoleService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get all roles
    pub async fn get_roles(&self) -> AppResult<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>(
            r#"
            SELECT id, name, description, is_system
            FROM roles
            ORDER BY is_system DESC, name ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(roles)
    }

    /// Get a role by ID with its permissions
    pub async fn get_role_with_permissions(
        &self,
        role_id: Uuid,
    ) -> AppResult<RoleWithPermissions> {
        let role = sqlx::query_as::<_, Role>(
            "SELECT id, name, description, is_system FROM roles WHERE id = $1",
        )
        .bind(role_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Role".to_string()))?;

        let permissions = sqlx::query_as::<_, Permission>(
            r#"
            SELECT p.id, p.name, p.category, p.is_system
            FROM permissions p
            JOIN role_permissions rp ON rp.permission_id = p.id
            WHERE rp.role_id = $1
            ORDER BY p.category, p.name
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.db)
        .await?;

        Ok(RoleWithPermissions { role, permissions })
    }

    /// Get all available permissions
    pub async fn get_all_permissions(&self) -> AppResult<Vec<Permission>> {
        let permissions = sqlx::query_as::<_, Permission>(
            r#"
            SELECT id, name, category, is_system
            FROM permissions
            ORDER BY category, name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(permissions)
    }

    /// Create a custom role
    pub async fn create_role(&self, input: CreateRoleInput) -> AppResult<RoleWithPermissions> {
        // Validate role name doesn't conflict with system roles
        if SYSTEM_ROLE_NAMES
            .iter()
            .any(|name| name.eq_ignore_ascii_case(&input.name))
        {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Cannot use reserved role name".to_string(),
            });
        }

        // Check if role name already exists
        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM roles WHERE LOWER(name) = LOWER($1)",
        )
        .bind(&input.name)
        .fetch_one(&self.db)
        .await?;

        if existing > 0 {
            return Err(AppError::Conflict {
                resource: "role".to_string(),
                message: "Role with this name already exists".to_string(),
            });
        }

        self.validate_permission_ids(&input.permission_ids).await?;

        // Start transaction
        let mut tx = self.db.begin().await?;

        // Create role
        let role_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO roles (name, description, is_system)
            VALUES ($1, $2, false)
            RETURNING id
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .fetch_one(&mut *tx)
        .await?;

        // Assign permissions
        for permission_id in &input.permission_ids {
            sqlx::query("INSERT INTO role_permissions (role_id, permission_id) VALUES ($1, $2)")
                .bind(role_id)
                .bind(permission_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.get_role_with_permissions(role_id).await
    }

    /// Update a role (only non-system roles can be renamed)
    pub async fn update_role(
        &self,
        role_id: Uuid,
        input: UpdateRoleInput,
    ) -> AppResult<RoleWithPermissions> {
        let existing = sqlx::query_as::<_, Role>(
            "SELECT id, name, description, is_system FROM roles WHERE id = $1",
        )
        .bind(role_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Role".to_string()))?;

        // System roles can only have permissions updated, not name/description
        if existing.is_system && input.name.is_some() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Cannot rename system roles".to_string(),
            });
        }

        // Validate new name if provided
        if let Some(ref name) = input.name {
            if SYSTEM_ROLE_NAMES
                .iter()
                .any(|system| system.eq_ignore_ascii_case(name))
            {
                return Err(AppError::Validation {
                    field: "name".to_string(),
                    message: "Cannot use reserved role name".to_string(),
                });
            }

            let duplicate = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM roles WHERE LOWER(name) = LOWER($1) AND id != $2",
            )
            .bind(name)
            .bind(role_id)
            .fetch_one(&self.db)
            .await?;

            if duplicate > 0 {
                return Err(AppError::Conflict {
                    resource: "role".to_string(),
                    message: "Role with this name already exists".to_string(),
                });
            }
        }

        if let Some(ref permission_ids) = input.permission_ids {
            self.validate_permission_ids(permission_ids).await?;
        }

        // Start transaction
        let mut tx = self.db.begin().await?;

        // Update role fields if not a system role
        if !existing.is_system {
            let name = input.name.unwrap_or(existing.name);
            let description = input.description.or(existing.description);

            sqlx::query("UPDATE roles SET name = $1, description = $2 WHERE id = $3")
                .bind(&name)
                .bind(&description)
                .bind(role_id)
                .execute(&mut *tx)
                .await?;
        }

        // Update permissions if provided
        if let Some(permission_ids) = input.permission_ids {
            sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
                .bind(role_id)
                .execute(&mut *tx)
                .await?;

            for permission_id in &permission_ids {
                sqlx::query(
                    "INSERT INTO role_permissions (role_id, permission_id) VALUES ($1, $2)",
                )
                .bind(role_id)
                .bind(permission_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        self.get_role_with_permissions(role_id).await
    }

    /// Delete a custom role (system roles cannot be deleted)
    pub async fn delete_role(&self, role_id: Uuid) -> AppResult<()> {
        let role = sqlx::query_as::<_, Role>(
            "SELECT id, name, description, is_system FROM roles WHERE id = $1",
        )
        .bind(role_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Role".to_string()))?;

        if role.is_system {
            return Err(AppError::Validation {
                field: "role_id".to_string(),
                message: "Cannot delete system roles".to_string(),
            });
        }

        // Check if any users are assigned to this role
        let user_count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM users WHERE role_id = $1
            UNION ALL
            SELECT COUNT(*) FROM user_roles WHERE role_id = $1
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .sum::<i64>();

        if user_count > 0 {
            return Err(AppError::Validation {
                field: "role_id".to_string(),
                message: format!(
                    "Cannot delete role: {} users are assigned to it",
                    user_count
                ),
            });
        }

        // Delete role (cascade will delete role_permissions)
        sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(role_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Validate that every permission id exists
    async fn validate_permission_ids(&self, permission_ids: &[Uuid]) -> AppResult<()> {
        if permission_ids.is_empty() {
            return Ok(());
        }

        let valid_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM permissions WHERE id = ANY($1)")
                .bind(permission_ids)
                .fetch_one(&self.db)
                .await?;

        if valid_count != permission_ids.len() as i64 {
            return Err(AppError::Validation {
                field: "permission_ids".to_string(),
                message: "One or more permission IDs are invalid".to_string(),
            });
        }

        Ok(())
    }
}
