//! Field configuration service
//!
//! Resolves effective intake-form fields for a department type and
//! optional category, and manages the base configurations and
//! category-scoped override rows.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::rule_store::RuleStore;
use shared::{
    resolve_fields, validate_key, DepartmentType, FieldVisibility, ResolvedField,
};

/// Field configuration service
#[derive(Clone)]
pub struct FieldConfigService {
    store: RuleStore,
}

/// Input for updating a base field configuration
#[derive(Debug, Deserialize)]
pub struct UpdateFieldConfigInput {
    pub field_label: Option<String>,
    pub is_enabled: Option<bool>,
    pub is_required: Option<bool>,
    pub display_order: Option<i32>,
    pub department_type: Option<DepartmentType>,
}

/// One category override row as submitted by the routing-config screen
#[derive(Debug, Deserialize)]
pub struct CategoryOverrideInput {
    pub field_name: String,
    pub visibility_override: Option<FieldVisibility>,
    pub required_override: Option<bool>,
}

impl FieldConfigService {
    /// Create a new FieldConfigService instance
    pub fn new(store: RuleStore) -> Self {
        Self { store }
    }

    fn db(&self) -> &PgPool {
        self.store.pool()
    }

    /// Resolve the effective intake fields for a department type and
    /// optional category. See `shared::resolve_fields` for the two-mode
    /// semantics.
    pub async fn resolve_fields(
        &self,
        department_type: DepartmentType,
        category_id: Option<Uuid>,
    ) -> AppResult<Vec<ResolvedField>> {
        let configs = self.store.get_field_configurations().await?;

        let overrides = match category_id {
            Some(category_id) => Some(
                self.store
                    .get_category_field_overrides(category_id)
                    .await?,
            ),
            None => None,
        };

        Ok(resolve_fields(
            department_type,
            overrides.as_deref(),
            &configs,
        ))
    }

    /// List the base field configurations
    pub async fn list_configurations(&self) -> AppResult<Vec<shared::FieldConfiguration>> {
        self.store.get_field_configurations().await
    }

    /// Update a base field configuration
    pub async fn update_configuration(
        &self,
        field_name: &str,
        input: UpdateFieldConfigInput,
    ) -> AppResult<()> {
        let existing = sqlx::query_as::<_, (String, bool, bool, i32, String)>(
            r#"
            SELECT field_label, is_enabled, is_required, display_order, department_type
            FROM field_configurations
            WHERE field_name = $1
            "#,
        )
        .bind(field_name)
        .fetch_optional(self.db())
        .await?
        .ok_or_else(|| AppError::NotFound("Field configuration".to_string()))?;

        let (label, enabled, required, order, dept) = existing;

        sqlx::query(
            r#"
            UPDATE field_configurations
            SET field_label = $1, is_enabled = $2, is_required = $3,
                display_order = $4, department_type = $5
            WHERE field_name = $6
            "#,
        )
        .bind(input.field_label.unwrap_or(label))
        .bind(input.is_enabled.unwrap_or(enabled))
        .bind(input.is_required.unwrap_or(required))
        .bind(input.display_order.unwrap_or(order))
        .bind(
            input
                .department_type
                .map(|d| d.as_str().to_string())
                .unwrap_or(dept),
        )
        .bind(field_name)
        .execute(self.db())
        .await?;

        Ok(())
    }

    /// List the override rows for a category
    pub async fn list_category_overrides(
        &self,
        category_id: Uuid,
    ) -> AppResult<Vec<shared::CategoryFieldOverride>> {
        self.store.get_category_field_overrides(category_id).await
    }

    /// Replace the override rows for a category.
    ///
    /// The submitted set is authoritative: rows not present are deleted,
    /// which (with a category selected) hides the corresponding fields.
    pub async fn set_category_overrides(
        &self,
        category_id: Uuid,
        overrides: Vec<CategoryOverrideInput>,
    ) -> AppResult<()> {
        self.store
            .get_category(category_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Category".to_string()))?;

        for o in &overrides {
            validate_key(&o.field_name).map_err(|message| AppError::Validation {
                field: "field_name".to_string(),
                message: message.to_string(),
            })?;
        }

        let mut tx = self.db().begin().await?;

        sqlx::query("DELETE FROM category_field_overrides WHERE category_id = $1")
            .bind(category_id)
            .execute(&mut *tx)
            .await?;

        for o in &overrides {
            sqlx::query(
                r#"
                INSERT INTO category_field_overrides
                    (category_id, field_name, visibility_override, required_override)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(category_id)
            .bind(&o.field_name)
            .bind(o.visibility_override.map(|v| match v {
                FieldVisibility::Visible => "visible",
                FieldVisibility::Hidden => "hidden",
            }))
            .bind(o.required_override)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }
}
