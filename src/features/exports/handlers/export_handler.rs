use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::exports::dtos::ExportQuery;
use crate::features::exports::formatter::{ExportCategory, ExportTable, Record};
use crate::features::exports::services::ExportService;
use crate::features::families::dtos::FamilyFilter;

fn csv_response(table: ExportTable) -> Result<Response> {
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        table.filename
    ))
    .map_err(|e| AppError::Internal(format!("Invalid export filename: {}", e)))?;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/csv; charset=utf-8"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        table.to_csv(),
    )
        .into_response())
}

/// Download families as CSV
#[utoipa::path(
    get,
    path = "/api/exports/{category}",
    params(
        ("category" = String, Path, description = "status-ekonomi, wilayah, koordinat or any other tag"),
        ExportQuery
    ),
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv", body = String),
        (status = 400, description = "Unknown status filter"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "exports",
    security(("basic_auth" = []))
)]
pub async fn export_families(
    State(service): State<Arc<ExportService>>,
    Path(category): Path<String>,
    AppQuery(query): AppQuery<ExportQuery>,
) -> Result<Response> {
    let filter = FamilyFilter::from_query(query.search.as_deref(), query.status.as_deref())?;
    let category = ExportCategory::from_tag(&category);

    let table = service.export_families(&category, &filter).await?;
    csv_response(table)
}

/// Format a caller-supplied record array as CSV
#[utoipa::path(
    post,
    path = "/api/exports/{category}",
    params(
        ("category" = String, Path, description = "status-ekonomi, wilayah, koordinat or any other tag")
    ),
    request_body(content = Vec<Object>, description = "Records to export"),
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv", body = String),
        (status = 400, description = "Body is not an array of objects"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "exports",
    security(("basic_auth" = []))
)]
pub async fn export_records(
    State(service): State<Arc<ExportService>>,
    Path(category): Path<String>,
    AppJson(records): AppJson<Vec<Record>>,
) -> Result<Response> {
    let category = ExportCategory::from_tag(&category);
    csv_response(service.export_records(&category, &records))
}
