use std::sync::Arc;

use axum::{
    routing::{get, patch, put},
    Router,
};

use crate::features::aid::handlers;
use crate::features::aid::services::{GrantService, ProgramService};

/// Create routes for grants, distributions and program settings (admin only)
pub fn routes(grant_service: Arc<GrantService>, program_service: Arc<ProgramService>) -> Router {
    let grants = Router::new()
        .route(
            "/api/aid-grants",
            get(handlers::list_grants).post(handlers::create_grant),
        )
        .route("/api/aid-grants/{id}", get(handlers::get_grant))
        .route(
            "/api/aid-grants/{id}/status",
            patch(handlers::update_grant_status),
        )
        .route(
            "/api/aid-grants/{id}/distributions/{month}",
            put(handlers::record_distribution),
        )
        .with_state(grant_service);

    let programs = Router::new()
        .route("/api/aid-programs", get(handlers::list_programs))
        .route(
            "/api/aid-programs/{year}",
            get(handlers::get_program).put(handlers::upsert_program),
        )
        .route(
            "/api/aid-programs/{year}/status",
            patch(handlers::update_program_status),
        )
        .with_state(program_service);

    grants.merge(programs)
}
