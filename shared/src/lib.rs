//! Shared types and policy logic for the Helpdesk Admin Platform
//!
//! This crate contains the domain model and the pure resolution logic used
//! by the backend: permission precedence, ticket field visibility, priority
//! scoring, assignment selection, and ticket status transitions. Nothing in
//! here performs I/O.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
