use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, RequestContext};
use crate::features::map::dtos::{
    FamilyGeometryDto, GeometryRecordDto, MapDataResponse, PublicStatsDto, SaveGeometryDto,
};
use crate::features::map::geometry::GeometryKind;
use crate::features::map::services::MapService;
use crate::shared::types::ApiResponse;

/// Public family markers for the map
#[utoipa::path(
    get,
    path = "/api/map-data",
    responses(
        (status = 200, description = "Public family points", body = MapDataResponse)
    ),
    tag = "map"
)]
pub async fn list_public_points(
    State(service): State<Arc<MapService>>,
) -> Result<Json<MapDataResponse>> {
    let points = service.list_public_points().await?;
    Ok(Json(MapDataResponse::new(points)))
}

/// Aggregate statistics over public families
#[utoipa::path(
    get,
    path = "/api/public-stats",
    responses(
        (status = 200, description = "Public statistics", body = ApiResponse<PublicStatsDto>)
    ),
    tag = "map"
)]
pub async fn get_public_stats(
    State(service): State<Arc<MapService>>,
) -> Result<Json<ApiResponse<PublicStatsDto>>> {
    let stats = service.public_stats().await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}

/// Everything drawn for one family
#[utoipa::path(
    get,
    path = "/api/map-data/{family_id}",
    params(
        ("family_id" = Uuid, Path, description = "Family ID")
    ),
    responses(
        (status = 200, description = "Family geometry", body = ApiResponse<FamilyGeometryDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Family not found")
    ),
    tag = "map",
    security(("basic_auth" = []))
)]
pub async fn get_family_geometry(
    State(service): State<Arc<MapService>>,
    Path(family_id): Path<Uuid>,
) -> Result<Json<ApiResponse<FamilyGeometryDto>>> {
    let geometry = service.family_geometry(family_id).await?;
    Ok(Json(ApiResponse::success(Some(geometry), None, None)))
}

/// Save a point, area or line drawn in the map editor
#[utoipa::path(
    post,
    path = "/api/map-data",
    request_body = SaveGeometryDto,
    responses(
        (status = 200, description = "Geometry saved", body = ApiResponse<GeometryRecordDto>),
        (status = 400, description = "Invalid geometry"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Family not found")
    ),
    tag = "map",
    security(("basic_auth" = []))
)]
pub async fn save_geometry(
    ctx: RequestContext,
    State(service): State<Arc<MapService>>,
    AppJson(dto): AppJson<SaveGeometryDto>,
) -> Result<Json<ApiResponse<GeometryRecordDto>>> {
    dto.validate()?;
    let record = service.save_geometry(&ctx, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(record),
        Some("Geometry saved".to_string()),
        None,
    )))
}

/// Delete a stored area or line, or clear a family's point
#[utoipa::path(
    delete,
    path = "/api/map-geometry/{type}/{id}",
    params(
        ("type" = String, Path, description = "point, polygon or linestring"),
        ("id" = Uuid, Path, description = "Area or line ID; family ID for point")
    ),
    responses(
        (status = 200, description = "Geometry deleted"),
        (status = 400, description = "Unknown geometry type"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Geometry not found")
    ),
    tag = "map",
    security(("basic_auth" = []))
)]
pub async fn delete_geometry(
    ctx: RequestContext,
    State(service): State<Arc<MapService>>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<Json<ApiResponse<()>>> {
    let kind: GeometryKind = kind.parse()?;
    service.delete_geometry(&ctx, kind, id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Geometry deleted".to_string()),
        None,
    )))
}
