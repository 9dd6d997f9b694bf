//! HTTP route composition.

use axum::Router;

use crate::state::SharedState;

/// Admin question management endpoints.
pub mod admin;
/// Swagger UI routes.
pub mod docs;
/// Health endpoint.
pub mod health;
/// Caller identity extraction.
pub mod identity;
/// Public question, vote, and results endpoints.
pub mod public;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(public::router())
        .merge(admin::router(state.clone()));

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
