use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use super::FamilyState;
use crate::core::error::Result;
use crate::core::extractor::{AppJson, RequestContext};
use crate::features::families::dtos::MemberPayloadDto;
use crate::features::families::models::Member;
use crate::shared::types::{ApiResponse, Meta};

/// List the members of a family
#[utoipa::path(
    get,
    path = "/api/families/{id}/members",
    params(
        ("id" = Uuid, Path, description = "Family ID")
    ),
    responses(
        (status = 200, description = "Members, head of household first", body = ApiResponse<Vec<Member>>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Family not found")
    ),
    tag = "members",
    security(("basic_auth" = []))
)]
pub async fn list_members(
    State(state): State<FamilyState>,
    Path(family_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Member>>>> {
    let members = state.member_service.list_by_family(family_id).await?;
    let total = members.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(members),
        None,
        Some(Meta { total }),
    )))
}

/// Add a member to a family
#[utoipa::path(
    post,
    path = "/api/families/{id}/members",
    params(
        ("id" = Uuid, Path, description = "Family ID")
    ),
    request_body = MemberPayloadDto,
    responses(
        (status = 200, description = "Member added", body = ApiResponse<Member>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Family not found"),
        (status = 409, description = "NIK already registered")
    ),
    tag = "members",
    security(("basic_auth" = []))
)]
pub async fn create_member(
    ctx: RequestContext,
    State(state): State<FamilyState>,
    Path(family_id): Path<Uuid>,
    AppJson(dto): AppJson<MemberPayloadDto>,
) -> Result<Json<ApiResponse<Member>>> {
    dto.validate()?;
    let member = state.member_service.create(&ctx, family_id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(member),
        Some("Member added".to_string()),
        None,
    )))
}

/// Replace a member's fields
#[utoipa::path(
    put,
    path = "/api/members/{id}",
    params(
        ("id" = Uuid, Path, description = "Member ID")
    ),
    request_body = MemberPayloadDto,
    responses(
        (status = 200, description = "Member updated", body = ApiResponse<Member>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Member not found"),
        (status = 409, description = "NIK already registered")
    ),
    tag = "members",
    security(("basic_auth" = []))
)]
pub async fn update_member(
    ctx: RequestContext,
    State(state): State<FamilyState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<MemberPayloadDto>,
) -> Result<Json<ApiResponse<Member>>> {
    dto.validate()?;
    let member = state.member_service.update(&ctx, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(member), None, None)))
}

/// Remove a member
#[utoipa::path(
    delete,
    path = "/api/members/{id}",
    params(
        ("id" = Uuid, Path, description = "Member ID")
    ),
    responses(
        (status = 200, description = "Member removed"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Member not found")
    ),
    tag = "members",
    security(("basic_auth" = []))
)]
pub async fn delete_member(
    ctx: RequestContext,
    State(state): State<FamilyState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    state.member_service.delete(&ctx, id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Member removed".to_string()),
        None,
    )))
}
