use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, RequestContext};
use crate::features::aid::dtos::{ProgramPayloadDto, UpdateProgramStatusDto};
use crate::features::aid::models::Program;
use crate::features::aid::services::ProgramService;
use crate::shared::types::{ApiResponse, Meta};

/// List program settings for every configured year
#[utoipa::path(
    get,
    path = "/api/aid-programs",
    responses(
        (status = 200, description = "Programs, newest year first", body = ApiResponse<Vec<Program>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "aid",
    security(("basic_auth" = []))
)]
pub async fn list_programs(
    State(service): State<Arc<ProgramService>>,
) -> Result<Json<ApiResponse<Vec<Program>>>> {
    let programs = service.list().await?;
    let total = programs.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(programs),
        None,
        Some(Meta { total }),
    )))
}

/// Get one year's program settings
#[utoipa::path(
    get,
    path = "/api/aid-programs/{year}",
    params(
        ("year" = i32, Path, description = "Budget year")
    ),
    responses(
        (status = 200, description = "Program found", body = ApiResponse<Program>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No program for that year")
    ),
    tag = "aid",
    security(("basic_auth" = []))
)]
pub async fn get_program(
    State(service): State<Arc<ProgramService>>,
    Path(year): Path<i32>,
) -> Result<Json<ApiResponse<Program>>> {
    let program = service.get(year).await?;
    Ok(Json(ApiResponse::success(Some(program), None, None)))
}

/// Create or replace one year's program settings
#[utoipa::path(
    put,
    path = "/api/aid-programs/{year}",
    params(
        ("year" = i32, Path, description = "Budget year")
    ),
    request_body = ProgramPayloadDto,
    responses(
        (status = 200, description = "Program saved", body = ApiResponse<Program>),
        (status = 400, description = "Validation error or program finished"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "aid",
    security(("basic_auth" = []))
)]
pub async fn upsert_program(
    ctx: RequestContext,
    State(service): State<Arc<ProgramService>>,
    Path(year): Path<i32>,
    AppJson(dto): AppJson<ProgramPayloadDto>,
) -> Result<Json<ApiResponse<Program>>> {
    dto.validate()?;
    let program = service.upsert(&ctx, year, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(program),
        Some("Program saved".to_string()),
        None,
    )))
}

/// Advance a program's status
#[utoipa::path(
    patch,
    path = "/api/aid-programs/{year}/status",
    params(
        ("year" = i32, Path, description = "Budget year")
    ),
    request_body = UpdateProgramStatusDto,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<Program>),
        (status = 400, description = "Transition not allowed"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No program for that year")
    ),
    tag = "aid",
    security(("basic_auth" = []))
)]
pub async fn update_program_status(
    ctx: RequestContext,
    State(service): State<Arc<ProgramService>>,
    Path(year): Path<i32>,
    AppJson(dto): AppJson<UpdateProgramStatusDto>,
) -> Result<Json<ApiResponse<Program>>> {
    let program = service.update_status(&ctx, year, dto.status).await?;
    Ok(Json(ApiResponse::success(Some(program), None, None)))
}
