use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::core::extractor::AppQuery;
use crate::features::activity_logs::dtos::ActivityLogQuery;
use crate::features::activity_logs::models::ActivityLog;
use crate::features::activity_logs::services::ActivityLogService;
use crate::shared::types::{ApiResponse, Meta};

/// List activity log entries (newest first, 10 per page)
#[utoipa::path(
    get,
    path = "/api/activity-logs",
    params(ActivityLogQuery),
    responses(
        (status = 200, description = "Activity log page", body = ApiResponse<Vec<ActivityLog>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "activity-logs",
    security(("basic_auth" = []))
)]
pub async fn list_activity_logs(
    State(service): State<Arc<ActivityLogService>>,
    AppQuery(query): AppQuery<ActivityLogQuery>,
) -> Result<Json<ApiResponse<Vec<ActivityLog>>>> {
    let (logs, total) = service.list(&query).await?;
    Ok(Json(ApiResponse::success(
        Some(logs),
        None,
        Some(Meta { total }),
    )))
}
