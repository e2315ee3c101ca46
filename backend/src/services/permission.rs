//! Permission resolution service
//!
//! Computes effective page/feature access for a user through the layered
//! override chain, and effective flat permissions through the
//! custom-permissions-or-role-union contract.

use std::collections::BTreeSet;

use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::rule_store::{AccessScope, RuleStore};
use shared::{
    effective_permissions, resolve_access, AccessDecision, Role, RoleFeatureAccess,
    RolePageAccess, User, UserFeatureAccess, UserPageAccess,
};

/// Permission resolution service
#[derive(Clone)]
pub struct PermissionService {
    store: RuleStore,
}

/// Resolved access together with the key it was resolved for
#[derive(Debug, Serialize)]
pub struct ResolvedAccess {
    pub page_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_key: Option<String>,
    #[serde(flatten)]
    pub decision: AccessDecision,
}

/// A role's explicit override rows
#[derive(Debug, Serialize)]
pub struct RoleAccessOverrides {
    pub pages: Vec<RolePageAccess>,
    pub features: Vec<RoleFeatureAccess>,
}

/// A user's explicit override rows
#[derive(Debug, Serialize)]
pub struct UserAccessOverrides {
    pub pages: Vec<UserPageAccess>,
    pub features: Vec<UserFeatureAccess>,
}

impl PermissionService {
    /// Create a new PermissionService instance
    pub fn new(store: RuleStore) -> Self {
        Self { store }
    }

    /// Resolve page or feature access for a user.
    ///
    /// Precedence: user override row, then the primary role's override row,
    /// then the page/feature default. Secondary roles are not consulted
    /// here. Unknown pages/features resolve to disabled rather than erroring.
    pub async fn resolve_access(
        &self,
        user_id: Uuid,
        page_key: &str,
        feature_key: Option<&str>,
    ) -> AppResult<ResolvedAccess> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        let decision = match feature_key {
            Some(feature_key) => {
                self.resolve_feature(&user, page_key, feature_key).await?
            }
            None => self.resolve_page(&user, page_key).await?,
        };

        Ok(ResolvedAccess {
            page_key: page_key.to_string(),
            feature_key: feature_key.map(str::to_string),
            decision,
        })
    }

    async fn resolve_page(&self, user: &User, page_key: &str) -> AppResult<AccessDecision> {
        let default_enabled = match self.store.get_page(page_key).await? {
            Some(page) if page.is_active => page.default_enabled,
            // Unknown or retired pages are closed to everyone
            _ => false,
        };

        let user_override = self
            .store
            .get_page_override(AccessScope::User, user.id, page_key)
            .await?;
        let role_override = self
            .store
            .get_page_override(AccessScope::Role, user.role_id, page_key)
            .await?;

        Ok(resolve_access(user_override, role_override, default_enabled))
    }

    async fn resolve_feature(
        &self,
        user: &User,
        page_key: &str,
        feature_key: &str,
    ) -> AppResult<AccessDecision> {
        let default_enabled = self
            .store
            .get_feature(page_key, feature_key)
            .await?
            .map(|feature| feature.default_enabled)
            .unwrap_or(false);

        let user_override = self
            .store
            .get_feature_override(AccessScope::User, user.id, page_key, feature_key)
            .await?;
        let role_override = self
            .store
            .get_feature_override(AccessScope::Role, user.role_id, page_key, feature_key)
            .await?;

        Ok(resolve_access(user_override, role_override, default_enabled))
    }

    /// A user's effective flat permission set.
    ///
    /// `custom_permissions`, when set, is the sole source of truth and the
    /// role is ignored entirely; otherwise the union of the primary and
    /// additional roles' permission sets applies.
    pub async fn effective_permissions(&self, user_id: Uuid) -> AppResult<BTreeSet<String>> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        if let Some(custom) = &user.custom_permissions {
            return Ok(effective_permissions(Some(custom), &[]));
        }

        let mut role_ids = vec![user.role_id];
        role_ids.extend(&user.additional_role_ids);

        let names = self.store.get_permission_names(&role_ids).await?;

        // Wrap the union in a single synthetic role so the shared contract
        // applies uniformly
        let combined = Role {
            id: user.role_id,
            name: String::new(),
            is_system: false,
            permissions: names,
        };

        Ok(effective_permissions(None, &[&combined]))
    }

    /// Check a single flat permission for a user
    pub async fn has_permission(&self, user_id: Uuid, name: &str) -> AppResult<bool> {
        Ok(self.effective_permissions(user_id).await?.contains(name))
    }

    /// List a role's explicit override rows
    pub async fn list_role_overrides(&self, role_id: Uuid) -> AppResult<RoleAccessOverrides> {
        Ok(RoleAccessOverrides {
            pages: self.store.list_role_page_overrides(role_id).await?,
            features: self.store.list_role_feature_overrides(role_id).await?,
        })
    }

    /// List a user's explicit override rows
    pub async fn list_user_overrides(&self, user_id: Uuid) -> AppResult<UserAccessOverrides> {
        Ok(UserAccessOverrides {
            pages: self.store.list_user_page_overrides(user_id).await?,
            features: self.store.list_user_feature_overrides(user_id).await?,
        })
    }

    /// Upsert a page access override for a role or user
    pub async fn set_page_access(
        &self,
        scope: AccessScope,
        owner_id: Uuid,
        page_key: &str,
        enabled: bool,
    ) -> AppResult<()> {
        self.store
            .get_page(page_key)
            .await?
            .ok_or_else(|| AppError::NotFound("Page".to_string()))?;

        self.store
            .set_page_override(scope, owner_id, page_key, enabled)
            .await
    }

    /// Remove a page access override, reverting to the next level
    pub async fn clear_page_access(
        &self,
        scope: AccessScope,
        owner_id: Uuid,
        page_key: &str,
    ) -> AppResult<()> {
        self.store.clear_page_override(scope, owner_id, page_key).await
    }

    /// Upsert a feature access override for a role or user
    pub async fn set_feature_access(
        &self,
        scope: AccessScope,
        owner_id: Uuid,
        page_key: &str,
        feature_key: &str,
        enabled: bool,
    ) -> AppResult<()> {
        self.store
            .get_feature(page_key, feature_key)
            .await?
            .ok_or_else(|| AppError::NotFound("Feature".to_string()))?;

        self.store
            .set_feature_override(scope, owner_id, page_key, feature_key, enabled)
            .await
    }

    /// Remove a feature access override
    pub async fn clear_feature_access(
        &self,
        scope: AccessScope,
        owner_id: Uuid,
        page_key: &str,
        feature_key: &str,
    ) -> AppResult<()> {
        self.store
            .clear_feature_override(scope, owner_id, page_key, feature_key)
            .await
    }
}
