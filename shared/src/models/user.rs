//! User accounts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::DepartmentType;

/// A user account on the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    /// Primary role; the only role consulted for page/feature access
    pub role_id: Uuid,
    /// Additional roles; contribute to the flat permission union only
    pub additional_role_ids: Vec<Uuid>,
    pub department: String,
    pub sub_department: Option<String>,
    pub department_type: DepartmentType,
    /// When set, fully replaces role-derived permissions for this user
    pub custom_permissions: Option<Vec<String>>,
    pub manager_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
