use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/availabilities",
            post(handlers::availability::create_availability),
        )
        .route("/availabilities/me", get(handlers::availability::list_mine))
        .route(
            "/availabilities/open",
            get(handlers::availability::list_open),
        )
        .route(
            "/availabilities/booked",
            get(handlers::availability::list_booked),
        )
        .route(
            "/availabilities/:id/cancel",
            patch(handlers::availability::cancel_availability),
        )
        .route(
            "/availabilities/:id/book",
            post(handlers::availability::book_availability),
        )
        .route(
            "/availabilities/:id/clear",
            post(handlers::availability::clear_booked),
        )
}
