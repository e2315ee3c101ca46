//! Category hierarchy service
//!
//! Manages the L1-L4 issue category tree. Deleting a category leaves
//! existing tickets untouched; their creation-time snapshots keep the
//! label displayable.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::rule_store::RuleStore;
use shared::{build_category_path, Category, DepartmentType};

/// Category service
#[derive(Clone)]
pub struct CategoryService {
    store: RuleStore,
}

/// Input for creating a category
#[derive(Debug, Deserialize)]
pub struct CreateCategoryInput {
    pub issue_type: String,
    pub l1: String,
    pub l2: Option<String>,
    pub l3: Option<String>,
    pub l4: Option<String>,
    pub department_type: DepartmentType,
    #[serde(default = "default_issue_points")]
    pub issue_priority_points: i32,
}

fn default_issue_points() -> i32 {
    shared::DEFAULT_ISSUE_POINTS
}

/// Input for updating a category
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryInput {
    pub issue_type: Option<String>,
    pub department_type: Option<DepartmentType>,
    pub issue_priority_points: Option<i32>,
}

impl CategoryService {
    /// Create a new CategoryService instance
    pub fn new(store: RuleStore) -> Self {
        Self { store }
    }

    fn db(&self) -> &PgPool {
        self.store.pool()
    }

    /// List categories, optionally filtered by department type
    pub async fn list_categories(
        &self,
        department_type: Option<DepartmentType>,
    ) -> AppResult<Vec<Category>> {
        self.store.list_categories(department_type).await
    }

    /// Get a category by id
    pub async fn get_category(&self, category_id: Uuid) -> AppResult<Category> {
        self.store
            .get_category(category_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Category".to_string()))
    }

    /// Create a category; the display path is derived from the levels
    pub async fn create_category(&self, input: CreateCategoryInput) -> AppResult<Category> {
        if input.l1.trim().is_empty() {
            return Err(AppError::Validation {
                field: "l1".to_string(),
                message: "Top-level category name is required".to_string(),
            });
        }

        if input.issue_priority_points < 0 || input.issue_priority_points > 100 {
            return Err(AppError::Validation {
                field: "issue_priority_points".to_string(),
                message: "Issue priority points must be between 0 and 100".to_string(),
            });
        }

        let path = build_category_path(
            &input.l1,
            input.l2.as_deref(),
            input.l3.as_deref(),
            input.l4.as_deref(),
        );

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO categories (issue_type, l1, l2, l3, l4, path,
                                    department_type, issue_priority_points)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&input.issue_type)
        .bind(&input.l1)
        .bind(&input.l2)
        .bind(&input.l3)
        .bind(&input.l4)
        .bind(&path)
        .bind(input.department_type.as_str())
        .bind(input.issue_priority_points)
        .fetch_one(self.db())
        .await?;

        self.get_category(id).await
    }

    /// Update a category's type, department scope, or priority points.
    /// Level names are immutable; tickets reference the path via snapshots.
    pub async fn update_category(
        &self,
        category_id: Uuid,
        input: UpdateCategoryInput,
    ) -> AppResult<Category> {
        let existing = self.get_category(category_id).await?;

        if let Some(points) = input.issue_priority_points {
            if !(0..=100).contains(&points) {
                return Err(AppError::Validation {
                    field: "issue_priority_points".to_string(),
                    message: "Issue priority points must be between 0 and 100".to_string(),
                });
            }
        }

        sqlx::query(
            r#"
            UPDATE categories
            SET issue_type = $1, department_type = $2, issue_priority_points = $3
            WHERE id = $4
            "#,
        )
        .bind(input.issue_type.unwrap_or(existing.issue_type))
        .bind(
            input
                .department_type
                .unwrap_or(existing.department_type)
                .as_str(),
        )
        .bind(
            input
                .issue_priority_points
                .unwrap_or(existing.issue_priority_points),
        )
        .bind(category_id)
        .execute(self.db())
        .await?;

        self.get_category(category_id).await
    }

    /// Delete a category. Existing tickets keep displaying through their
    /// snapshots; the category's routing rule and field overrides go with
    /// it.
    pub async fn delete_category(&self, category_id: Uuid) -> AppResult<()> {
        self.get_category(category_id).await?;

        let mut tx = self.db().begin().await?;

        sqlx::query("UPDATE routing_rules SET is_active = false WHERE category_id = $1")
            .bind(category_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM category_field_overrides WHERE category_id = $1")
            .bind(category_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(category_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}
