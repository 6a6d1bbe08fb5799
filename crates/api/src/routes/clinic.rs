use axum::{routing::patch, Router};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new().route(
        "/clinics/:clinic_id/location",
        patch(handlers::clinic::update_location),
    )
}
