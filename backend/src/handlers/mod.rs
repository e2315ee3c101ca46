//! HTTP request handlers for the Helpdesk Admin Platform

pub mod access;
pub mod categories;
pub mod field_config;
pub mod health;
pub mod roles;
pub mod routing_rules;
pub mod tickets;
pub mod users;

pub use access::*;
pub use categories::*;
pub use field_config::*;
pub use health::*;
pub use roles::*;
pub use routing_rules::*;
pub use tickets::*;
pub use users::*;
