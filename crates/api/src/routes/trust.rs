use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/events/attendance",
            post(handlers::trust::post_attendance_event),
        )
        .route("/staff/:staff_id/score", get(handlers::trust::get_staff_score))
        .route("/recommendations", get(handlers::trust::recommend))
}
