use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppQuery, RequestContext};
use crate::features::aid::dtos::{
    CreateGrantDto, GrantDetailDto, GrantFilter, GrantListItemDto, GrantListQuery, GrantPageDto,
    RecordDistributionDto, UpdateGrantStatusDto,
};
use crate::features::aid::models::{Distribution, Grant};
use crate::features::aid::services::GrantService;
use crate::shared::types::{ApiResponse, Meta, PageLinks, PageQuery, PaginationInfo};

/// List grants filtered by budget year and status
#[utoipa::path(
    get,
    path = "/api/aid-grants",
    params(GrantListQuery),
    responses(
        (status = 200, description = "One page of grants", body = ApiResponse<GrantPageDto>),
        (status = 400, description = "Unknown status filter"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "aid",
    security(("basic_auth" = []))
)]
pub async fn list_grants(
    State(service): State<Arc<GrantService>>,
    AppQuery(query): AppQuery<GrantListQuery>,
) -> Result<Json<ApiResponse<GrantPageDto>>> {
    let filter = GrantFilter::from_query(&query)?;
    let page = PageQuery {
        page: query.page.unwrap_or(1),
    };

    let (rows, total) = service.list(&filter, &page).await?;

    let pagination = PaginationInfo::new(page.page(), page.limit(), total);
    let year = filter.tahun.map(|y| y.to_string());
    let links = PageLinks::build(
        "/api/aid-grants",
        &[
            ("tahun", year.as_deref()),
            ("status", filter.status.map(|s| s.as_str())),
        ],
        &pagination,
    );

    let dto = GrantPageDto {
        items: rows.into_iter().map(GrantListItemDto::from).collect(),
        pagination,
        links,
    };

    Ok(Json(ApiResponse::success(Some(dto), None, Some(Meta { total }))))
}

/// Get a grant with its monthly distributions
#[utoipa::path(
    get,
    path = "/api/aid-grants/{id}",
    params(
        ("id" = Uuid, Path, description = "Grant ID")
    ),
    responses(
        (status = 200, description = "Grant found", body = ApiResponse<GrantDetailDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Grant not found")
    ),
    tag = "aid",
    security(("basic_auth" = []))
)]
pub async fn get_grant(
    State(service): State<Arc<GrantService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<GrantDetailDto>>> {
    let detail = service.get_detail(id).await?;
    Ok(Json(ApiResponse::success(Some(detail), None, None)))
}

/// Assign a grant to a family for one budget year
#[utoipa::path(
    post,
    path = "/api/aid-grants",
    request_body = CreateGrantDto,
    responses(
        (status = 200, description = "Grant created with 12 pending distributions", body = ApiResponse<GrantDetailDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Family not found"),
        (status = 409, description = "Grant already exists for that year")
    ),
    tag = "aid",
    security(("basic_auth" = []))
)]
pub async fn create_grant(
    ctx: RequestContext,
    State(service): State<Arc<GrantService>>,
    AppJson(dto): AppJson<CreateGrantDto>,
) -> Result<Json<ApiResponse<GrantDetailDto>>> {
    dto.validate()?;
    let detail = service.create(&ctx, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(detail),
        Some("Grant created".to_string()),
        None,
    )))
}

/// Change a grant's status
#[utoipa::path(
    patch,
    path = "/api/aid-grants/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Grant ID")
    ),
    request_body = UpdateGrantStatusDto,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<Grant>),
        (status = 400, description = "Transition not allowed"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Grant not found")
    ),
    tag = "aid",
    security(("basic_auth" = []))
)]
pub async fn update_grant_status(
    ctx: RequestContext,
    State(service): State<Arc<GrantService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateGrantStatusDto>,
) -> Result<Json<ApiResponse<Grant>>> {
    let grant = service.update_status(&ctx, id, dto.status).await?;
    Ok(Json(ApiResponse::success(Some(grant), None, None)))
}

/// Record one month's distribution
#[utoipa::path(
    put,
    path = "/api/aid-grants/{id}/distributions/{month}",
    params(
        ("id" = Uuid, Path, description = "Grant ID"),
        ("month" = i32, Path, description = "Month 1-12")
    ),
    request_body = RecordDistributionDto,
    responses(
        (status = 200, description = "Distribution recorded", body = ApiResponse<Distribution>),
        (status = 400, description = "Invalid month or grant not active"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Grant not found")
    ),
    tag = "aid",
    security(("basic_auth" = []))
)]
pub async fn record_distribution(
    ctx: RequestContext,
    State(service): State<Arc<GrantService>>,
    Path((id, month)): Path<(Uuid, i32)>,
    AppJson(dto): AppJson<RecordDistributionDto>,
) -> Result<Json<ApiResponse<Distribution>>> {
    dto.validate()?;
    let distribution = service.record_distribution(&ctx, id, month, dto).await?;
    Ok(Json(ApiResponse::success(Some(distribution), None, None)))
}
