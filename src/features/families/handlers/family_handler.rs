use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppQuery, RequestContext};
use crate::features::families::dtos::{
    FamilyDetailDto, FamilyFilter, FamilyFiltersDto, FamilyListItemDto, FamilyListQuery,
    FamilyPageDto, FamilyPayloadDto, FamilyVisibilityDto, VerifyFamilyDto,
};
use crate::features::families::models::Family;
use crate::features::families::services::{FamilyService, MemberService};
use crate::shared::types::{ApiResponse, Meta, PageLinks, PageQuery, PaginationInfo};

const FAMILIES_PATH: &str = "/api/families";

/// State for family and member handlers
#[derive(Clone)]
pub struct FamilyState {
    pub family_service: Arc<FamilyService>,
    pub member_service: Arc<MemberService>,
}

/// List families with search, status filter and pagination
#[utoipa::path(
    get,
    path = "/api/families",
    params(FamilyListQuery),
    responses(
        (status = 200, description = "One page of families", body = ApiResponse<FamilyPageDto>),
        (status = 400, description = "Unknown status filter"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "families",
    security(("basic_auth" = []))
)]
pub async fn list_families(
    State(state): State<FamilyState>,
    AppQuery(query): AppQuery<FamilyListQuery>,
) -> Result<Json<ApiResponse<FamilyPageDto>>> {
    let filter = FamilyFilter::from_query(query.search.as_deref(), query.status.as_deref())?;
    let page = PageQuery {
        page: query.page.unwrap_or(1),
    };

    let (rows, total) = state.family_service.list(&filter, &page).await?;

    let pagination = PaginationInfo::new(page.page(), page.limit(), total);
    let status = filter.status.map(|s| s.as_str());
    let links = PageLinks::build(
        FAMILIES_PATH,
        &[("search", filter.search.as_deref()), ("status", status)],
        &pagination,
    );

    let dto = FamilyPageDto {
        items: rows.into_iter().map(FamilyListItemDto::from).collect(),
        pagination,
        filters: FamilyFiltersDto {
            search: filter.search.clone(),
            status: filter.status_label(),
        },
        links,
    };

    Ok(Json(ApiResponse::success(Some(dto), None, Some(Meta { total }))))
}

/// Get a family with its members
#[utoipa::path(
    get,
    path = "/api/families/{id}",
    params(
        ("id" = Uuid, Path, description = "Family ID")
    ),
    responses(
        (status = 200, description = "Family found", body = ApiResponse<FamilyDetailDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Family not found")
    ),
    tag = "families",
    security(("basic_auth" = []))
)]
pub async fn get_family(
    State(state): State<FamilyState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FamilyDetailDto>>> {
    let detail = state.family_service.get_detail(id).await?;
    Ok(Json(ApiResponse::success(Some(detail), None, None)))
}

/// Create a family record
#[utoipa::path(
    post,
    path = "/api/families",
    request_body = FamilyPayloadDto,
    responses(
        (status = 200, description = "Family created", body = ApiResponse<Family>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "No. KK already registered")
    ),
    tag = "families",
    security(("basic_auth" = []))
)]
pub async fn create_family(
    ctx: RequestContext,
    State(state): State<FamilyState>,
    AppJson(dto): AppJson<FamilyPayloadDto>,
) -> Result<Json<ApiResponse<Family>>> {
    dto.validate()?;
    let family = state.family_service.create(&ctx, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(family),
        Some("Family created".to_string()),
        None,
    )))
}

/// Replace a family record
#[utoipa::path(
    put,
    path = "/api/families/{id}",
    params(
        ("id" = Uuid, Path, description = "Family ID")
    ),
    request_body = FamilyPayloadDto,
    responses(
        (status = 200, description = "Family updated", body = ApiResponse<Family>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Family not found"),
        (status = 409, description = "No. KK already registered")
    ),
    tag = "families",
    security(("basic_auth" = []))
)]
pub async fn update_family(
    ctx: RequestContext,
    State(state): State<FamilyState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<FamilyPayloadDto>,
) -> Result<Json<ApiResponse<Family>>> {
    dto.validate()?;
    let family = state.family_service.update(&ctx, id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(family),
        Some("Family updated".to_string()),
        None,
    )))
}

/// Delete a family together with its members, areas and lines
#[utoipa::path(
    delete,
    path = "/api/families/{id}",
    params(
        ("id" = Uuid, Path, description = "Family ID")
    ),
    responses(
        (status = 200, description = "Family deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Family not found")
    ),
    tag = "families",
    security(("basic_auth" = []))
)]
pub async fn delete_family(
    ctx: RequestContext,
    State(state): State<FamilyState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    state.family_service.delete(&ctx, id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Family deleted".to_string()),
        None,
    )))
}

/// Record a verification decision
#[utoipa::path(
    patch,
    path = "/api/families/{id}/verification",
    params(
        ("id" = Uuid, Path, description = "Family ID")
    ),
    request_body = VerifyFamilyDto,
    responses(
        (status = 200, description = "Verification recorded", body = ApiResponse<Family>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Family not found")
    ),
    tag = "families",
    security(("basic_auth" = []))
)]
pub async fn verify_family(
    ctx: RequestContext,
    State(state): State<FamilyState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<VerifyFamilyDto>,
) -> Result<Json<ApiResponse<Family>>> {
    dto.validate()?;
    let family = state.family_service.verify(&ctx, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(family), None, None)))
}

/// Show or hide a family on the public map
#[utoipa::path(
    patch,
    path = "/api/families/{id}/visibility",
    params(
        ("id" = Uuid, Path, description = "Family ID")
    ),
    request_body = FamilyVisibilityDto,
    responses(
        (status = 200, description = "Visibility updated", body = ApiResponse<Family>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Family not found")
    ),
    tag = "families",
    security(("basic_auth" = []))
)]
pub async fn set_family_visibility(
    ctx: RequestContext,
    State(state): State<FamilyState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<FamilyVisibilityDto>,
) -> Result<Json<ApiResponse<Family>>> {
    let family = state
        .family_service
        .set_visibility(&ctx, id, dto.is_public)
        .await?;
    Ok(Json(ApiResponse::success(Some(family), None, None)))
}
