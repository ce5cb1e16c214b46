//! HTTP API: routers, handlers, and the response envelope.
//!
//! Every response, success or failure, uses the envelope
//! `{ success, message, data }` the existing frontend consumes. This
//! layer performs status-code translation only; no recovery.

mod directory;
mod envelope;
mod error;
mod tickets;

pub use envelope::ApiResponse;
pub use error::ApiError;

use axum::Router;
use axum::routing::{get, post};
use surrealdb::Connection;

use crate::state::AppState;

pub fn router<C: Connection>(state: AppState<C>) -> Router {
    Router::new()
        .route(
            "/tickets",
            post(tickets::create_ticket::<C>).get(tickets::list_tickets::<C>),
        )
        .route(
            "/tickets/:id",
            get(tickets::get_ticket::<C>)
                .patch(tickets::patch_ticket::<C>)
                .delete(tickets::delete_ticket::<C>),
        )
        .route(
            "/tickets/:id/transfers",
            get(tickets::list_ticket_transfers::<C>),
        )
        .route(
            "/organizations",
            post(directory::create_organization::<C>).get(directory::list_organizations::<C>),
        )
        .route(
            "/departments",
            post(directory::create_department::<C>).get(directory::list_departments::<C>),
        )
        .route(
            "/users",
            post(directory::create_user::<C>).get(directory::list_users::<C>),
        )
        .route("/auth/login", post(directory::login::<C>))
        .with_state(state)
}
