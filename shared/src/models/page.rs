//! Page and feature definitions with per-role and per-user overrides

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A navigable page of the admin application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub page_key: String,
    pub default_enabled: bool,
    pub is_active: bool,
}

/// Kinds of features a page exposes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeatureType {
    Crud,
    Export,
    UiSection,
    Custom,
}

impl FeatureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureType::Crud => "crud",
            FeatureType::Export => "export",
            FeatureType::UiSection => "ui_section",
            FeatureType::Custom => "custom",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "crud" => FeatureType::Crud,
            "export" => FeatureType::Export,
            "ui_section" => FeatureType::UiSection,
            _ => FeatureType::Custom,
        }
    }
}

/// A toggleable feature within a page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    pub page_key: String,
    pub feature_key: String,
    pub feature_type: FeatureType,
    pub default_enabled: bool,
}

/// Per-role page access override. Presence of a row means an override
/// exists; absence means defer to the page default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolePageAccess {
    pub role_id: Uuid,
    pub page_key: String,
    pub enabled: bool,
}

/// Per-role feature access override
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleFeatureAccess {
    pub role_id: Uuid,
    pub page_key: String,
    pub feature_key: String,
    pub enabled: bool,
}

/// Per-user page access override. Takes precedence over the role override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPageAccess {
    pub user_id: Uuid,
    pub page_key: String,
    pub enabled: bool,
}

/// Per-user feature access override
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserFeatureAccess {
    pub user_id: Uuid,
    pub page_key: String,
    pub feature_key: String,
    pub enabled: bool,
}
