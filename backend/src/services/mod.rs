//! Business logic services for the Helpdesk Admin Platform

pub mod category;
pub mod field_config;
pub mod permission;
pub mod priority;
pub mod role;
pub mod routing;
pub mod rule_store;
pub mod ticket;
pub mod user;

pub use category::CategoryService;
pub use field_config::FieldConfigService;
pub use permission::PermissionService;
pub use priority::PriorityService;
pub use role::RoleService;
pub use routing::RoutingService;
pub use rule_store::RuleStore;
pub use ticket::TicketService;
pub use user::UserService;
