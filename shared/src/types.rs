//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Coarse department grouping used to filter default field and category
/// visibility before a specific category is chosen
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DepartmentType {
    #[default]
    All,
    CustomerSupport,
    SellerSupport,
}

impl DepartmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepartmentType::All => "all",
            DepartmentType::CustomerSupport => "customer_support",
            DepartmentType::SellerSupport => "seller_support",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "customer_support" => DepartmentType::CustomerSupport,
            "seller_support" => DepartmentType::SellerSupport,
            _ => DepartmentType::All,
        }
    }

    /// A configuration scoped to `self` applies to a requester of `other`
    /// when either side is `All` or both match.
    pub fn applies_to(&self, other: DepartmentType) -> bool {
        *self == DepartmentType::All || other == DepartmentType::All || *self == other
    }
}

impl std::fmt::Display for DepartmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DepartmentType::All => write!(f, "All"),
            DepartmentType::CustomerSupport => write!(f, "Customer Support"),
            DepartmentType::SellerSupport => write!(f, "Seller Support"),
        }
    }
}

/// Pagination parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
        }
    }
}

/// Paginated response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
}
