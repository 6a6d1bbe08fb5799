use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/payroll-close/close-month",
            post(handlers::payroll::close_month),
        )
        .route(
            "/payroll-close/close-months/:employee_id",
            get(handlers::payroll::get_closed_months),
        )
}
