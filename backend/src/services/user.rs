//! User management service
//!
//! Admin-side updates to a user's role assignments, department, and the
//! custom-permissions override set.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::rule_store::RuleStore;
use shared::{validate_permission_name, DepartmentType, User};

/// User management service
#[derive(Clone)]
pub struct UserService {
    store: RuleStore,
}

/// Input for updating a user
#[derive(Debug, Deserialize)]
pub struct UpdateUserInput {
    pub name: Option<String>,
    pub role_id: Option<Uuid>,
    pub additional_role_ids: Option<Vec<Uuid>>,
    pub department: Option<String>,
    /// Omit to keep, null to clear
    #[serde(default)]
    pub sub_department: Option<Option<String>>,
    pub department_type: Option<DepartmentType>,
    /// Omit to keep, null to clear
    #[serde(default)]
    pub manager_id: Option<Option<Uuid>>,
    pub is_active: Option<bool>,
}

/// Input for replacing a user's custom permission set
#[derive(Debug, Deserialize)]
pub struct SetCustomPermissionsInput {
    pub permissions: Vec<String>,
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(store: RuleStore) -> Self {
        Self { store }
    }

    fn db(&self) -> &PgPool {
        self.store.pool()
    }

    /// List all users
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.store.list_users().await
    }

    /// Get a user by id
    pub async fn get_user(&self, user_id: Uuid) -> AppResult<User> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    /// Update a user's profile and role assignments
    pub async fn update_user(&self, user_id: Uuid, input: UpdateUserInput) -> AppResult<User> {
        let existing = self.get_user(user_id).await?;

        if let Some(role_id) = input.role_id {
            if self.store.get_role(role_id).await?.is_none() {
                return Err(AppError::Validation {
                    field: "role_id".to_string(),
                    message: "Role does not exist".to_string(),
                });
            }
        }

        let mut tx = self.db().begin().await?;

        sqlx::query(
            r#"
            UPDATE users
            SET name = $1, role_id = $2, department = $3, sub_department = $4,
                department_type = $5, manager_id = $6, is_active = $7,
                updated_at = now()
            WHERE id = $8
            "#,
        )
        .bind(input.name.unwrap_or(existing.name))
        .bind(input.role_id.unwrap_or(existing.role_id))
        .bind(input.department.unwrap_or(existing.department))
        .bind(input.sub_department.unwrap_or(existing.sub_department))
        .bind(
            input
                .department_type
                .unwrap_or(existing.department_type)
                .as_str(),
        )
        .bind(input.manager_id.unwrap_or(existing.manager_id))
        .bind(input.is_active.unwrap_or(existing.is_active))
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if let Some(additional) = input.additional_role_ids {
            sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
                .bind(user_id)
                .execute(&mut *tx)
                .await?;

            for role_id in additional {
                sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
                    .bind(user_id)
                    .bind(role_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;

        self.get_user(user_id).await
    }

    /// Replace a user's custom permission set. While set, it is the sole
    /// source of truth for flat permission checks; roles are ignored.
    pub async fn set_custom_permissions(
        &self,
        user_id: Uuid,
        input: SetCustomPermissionsInput,
    ) -> AppResult<User> {
        self.get_user(user_id).await?;

        for name in &input.permissions {
            validate_permission_name(name).map_err(|message| AppError::Validation {
                field: "permissions".to_string(),
                message: format!("{}: {}", name, message),
            })?;
        }

        let json = serde_json::to_value(&input.permissions)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        sqlx::query(
            "UPDATE users SET custom_permissions = $1, updated_at = now() WHERE id = $2",
        )
        .bind(json)
        .bind(user_id)
        .execute(self.db())
        .await?;

        self.get_user(user_id).await
    }

    /// Clear a user's custom permission set, reverting to role-derived
    /// permissions
    pub async fn clear_custom_permissions(&self, user_id: Uuid) -> AppResult<User> {
        self.get_user(user_id).await?;

        sqlx::query(
            "UPDATE users SET custom_permissions = NULL, updated_at = now() WHERE id = $1",
        )
        .bind(user_id)
        .execute(self.db())
        .await?;

        self.get_user(user_id).await
    }
}
