use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/shifts", post(handlers::shift::create_shift))
        .route("/shifts", get(handlers::shift::list_shifts))
        .route(
            "/shifts/:id/status",
            patch(handlers::shift::update_shift_status),
        )
        .route("/shifts/:id", delete(handlers::shift::delete_shift))
}
