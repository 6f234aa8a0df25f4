use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{admin, handlers, middleware::metrics_middleware, names, tickets};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Snapshot
        .route("/data", get(handlers::get_data))
        // Tickets
        .route(
            "/tickets",
            get(tickets::list_tickets).post(tickets::create_ticket),
        )
        .route(
            "/tickets/{id}",
            get(tickets::get_ticket)
                .put(tickets::replace_ticket)
                .delete(tickets::delete_ticket),
        )
        .route("/tickets/{id}/status", patch(tickets::set_ticket_status))
        // Groups
        .route("/groups", get(names::list_groups).post(names::add_group))
        .route("/groups/{name}", delete(names::remove_group))
        // Authors
        .route("/authors", get(names::list_authors).post(names::add_author))
        .route("/authors/{name}", delete(names::remove_author))
        // Admin
        .route("/admin/login", post(admin::login))
        .route("/admin/password", put(admin::change_password));

    Router::new()
        .route("/", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .nest("/api", api_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
