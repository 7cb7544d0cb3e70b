use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::activity_logs::handlers;
use crate::features::activity_logs::services::ActivityLogService;

/// Create routes for the activity log (read-only)
pub fn routes(service: Arc<ActivityLogService>) -> Router {
    Router::new()
        .route("/api/activity-logs", get(handlers::list_activity_logs))
        .with_state(service)
}
