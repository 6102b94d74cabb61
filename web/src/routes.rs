//! Router assembly.

use crate::api::{events, tickets, waitlist};
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Builds the full application router over `state`.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/tickets/purchase", post(tickets::purchase_tickets))
        .route("/tickets", get(tickets::list_my_tickets))
        .route("/tickets/resale", get(tickets::list_resale_tickets))
        .route(
            "/tickets/:id",
            get(tickets::get_ticket).delete(tickets::delete_ticket),
        )
        .route(
            "/tickets/:id/resale",
            post(tickets::list_for_resale).delete(tickets::cancel_resale_listing),
        )
        .route(
            "/tickets/:id/purchase-resale",
            post(tickets::purchase_resale_ticket),
        )
        .route("/tickets/:id/assign", post(tickets::assign_ticket))
        .route(
            "/waitlist",
            post(waitlist::join_waitlist).get(waitlist::list_my_waitlist),
        )
        .route("/events/:id/waitlist", get(waitlist::list_event_waitlist))
        .route("/events/:id/availability", get(events::get_availability))
        .route("/events/:id/inventory", put(events::set_inventory));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}
