//! Route definitions for the Helpdesk Admin Platform

use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - tickets
        .nest("/tickets", ticket_routes())
        // Protected routes - role management
        .nest("/roles", role_routes())
        // Protected routes - user management
        .nest("/users", user_routes())
        // Protected routes - page/feature access
        .nest("/access", access_routes())
        // Protected routes - intake field configuration
        .nest("/field-config", field_config_routes())
        // Protected routes - category hierarchy
        .nest("/categories", category_routes())
        // Protected routes - routing rules
        .nest("/routing-rules", routing_rule_routes())
}

/// Ticket routes (protected)
fn ticket_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_tickets).post(handlers::create_ticket),
        )
        .route("/fields", get(handlers::resolve_intake_fields))
        .route("/priority-preview", get(handlers::priority_preview))
        .route("/:ticket_id", get(handlers::get_ticket))
        .route("/:ticket_id/status", put(handlers::update_ticket_status))
        .route("/:ticket_id/assignee", put(handlers::assign_ticket))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Role management routes (protected)
fn role_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_roles).post(handlers::create_role))
        .route("/permissions", get(handlers::list_permissions))
        .route(
            "/:role_id",
            get(handlers::get_role)
                .put(handlers::update_role)
                .delete(handlers::delete_role),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// User management routes (protected)
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_users))
        .route(
            "/:user_id",
            get(handlers::get_user).put(handlers::update_user),
        )
        .route(
            "/:user_id/permissions",
            get(handlers::get_effective_permissions),
        )
        .route(
            "/:user_id/custom-permissions",
            put(handlers::set_custom_permissions).delete(handlers::clear_custom_permissions),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Page/feature access routes (protected)
fn access_routes() -> Router<AppState> {
    Router::new()
        .route("/resolve", get(handlers::resolve_access))
        .route("/check", get(handlers::check_permission))
        .route("/roles/:role_id", get(handlers::list_role_overrides))
        .route("/users/:user_id", get(handlers::list_user_overrides))
        .route(
            "/roles/:role_id/pages/:page_key",
            put(handlers::set_role_page_access).delete(handlers::clear_role_page_access),
        )
        .route(
            "/roles/:role_id/pages/:page_key/features/:feature_key",
            put(handlers::set_role_feature_access).delete(handlers::clear_role_feature_access),
        )
        .route(
            "/users/:user_id/pages/:page_key",
            put(handlers::set_user_page_access).delete(handlers::clear_user_page_access),
        )
        .route(
            "/users/:user_id/pages/:page_key/features/:feature_key",
            put(handlers::set_user_feature_access).delete(handlers::clear_user_feature_access),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Intake field configuration routes (protected)
fn field_config_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_field_configs))
        .route("/:field_name", put(handlers::update_field_config))
        .route(
            "/categories/:category_id",
            get(handlers::list_category_overrides).put(handlers::set_category_overrides),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Category hierarchy routes (protected)
fn category_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/:category_id",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Routing rule routes (protected)
fn routing_rule_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_routing_rules))
        .route(
            "/:category_id",
            get(handlers::get_routing_rule)
                .put(handlers::upsert_routing_rule)
                .delete(handlers::delete_routing_rule),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}
