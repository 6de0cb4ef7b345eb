//! Authentication Routes

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

/// Build authentication router
/// - status / setup / login: public (skipped by require_auth)
/// - me / revenue-unlock / account: bearer token required
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/v1/auth", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/status", get(handler::status))
        .route("/setup", post(handler::setup))
        .route("/login", post(handler::login))
        .route("/me", get(handler::me))
        .route("/revenue-unlock", post(handler::revenue_unlock))
        .route("/account", put(handler::update_account))
}
