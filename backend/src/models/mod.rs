//! Database models for the Helpdesk Admin Platform
//!
//! Re-exports models from the shared crate

pub use shared::models::*;
