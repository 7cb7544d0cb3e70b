use serde_json::json;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::RequestContext;
use crate::features::activity_logs::models::{ActivityAction, NewActivityLog};
use crate::features::activity_logs::ActivityLogService;
use crate::features::families::models::{Family, FAMILY_COLUMNS};
use crate::features::families::services::{family_not_found, find_family, lock_family};
use crate::features::map::dtos::{
    AreaDto, CityCountDto, FamilyGeometryDto, GeometryRecordDto, LineDto, PublicPointDto,
    PublicStatsDto, SaveGeometryDto,
};
use crate::features::map::geometry::{self, GeometryKind, LatLng};
use crate::features::map::models::{
    Area, CityCountRow, Distance, PublicPointRow, AREA_COLUMNS, DISTANCE_COLUMNS,
};
use crate::shared::constants::TOP_CITY_LIMIT;

/// Service for public map data and the per-family drawings
pub struct MapService {
    pool: PgPool,
}

impl MapService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Public families that have a stored point, ordered by name
    pub async fn list_public_points(&self) -> Result<Vec<PublicPointDto>> {
        let rows = sqlx::query_as::<_, PublicPointRow>(
            r#"
            SELECT id, nama_kepala_keluarga, kota, kecamatan, kelurahan, latitude, longitude
            FROM keluarga
            WHERE is_public = TRUE AND latitude IS NOT NULL AND longitude IS NOT NULL
            ORDER BY nama_kepala_keluarga ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list public map points: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(rows.into_iter().map(PublicPointDto::from).collect())
    }

    /// Counts over public families plus the top cities
    pub async fn public_stats(&self) -> Result<PublicStatsDto> {
        let (total_keluarga, total_wilayah) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COUNT(*), COUNT(DISTINCT kota)
            FROM keluarga
            WHERE is_public = TRUE
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count public families: {:?}", e);
            AppError::Database(e)
        })?;

        let cities = sqlx::query_as::<_, CityCountRow>(
            r#"
            SELECT kota, COUNT(*) AS total
            FROM keluarga
            WHERE is_public = TRUE AND kota IS NOT NULL
            GROUP BY kota
            ORDER BY total DESC, kota ASC
            LIMIT $1
            "#,
        )
        .bind(TOP_CITY_LIMIT)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to aggregate public families per city: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(PublicStatsDto {
            total_keluarga,
            total_wilayah,
            sebaran_kota: cities.into_iter().map(CityCountDto::from).collect(),
        })
    }

    /// Point, areas and lines drawn for one family
    pub async fn family_geometry(&self, family_id: Uuid) -> Result<FamilyGeometryDto> {
        let family = find_family(&self.pool, family_id)
            .await?
            .ok_or_else(|| family_not_found(family_id))?;

        let areas = sqlx::query_as::<_, Area>(&format!(
            "SELECT {AREA_COLUMNS} FROM wilayah WHERE keluarga_id = $1 ORDER BY created_at, id"
        ))
        .bind(family_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch areas of family {}: {:?}", family_id, e);
            AppError::Database(e)
        })?;

        let lines = sqlx::query_as::<_, Distance>(&format!(
            "SELECT {DISTANCE_COLUMNS} FROM jarak WHERE keluarga_id = $1 ORDER BY created_at, id"
        ))
        .bind(family_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch lines of family {}: {:?}", family_id, e);
            AppError::Database(e)
        })?;

        Ok(FamilyGeometryDto {
            keluarga_id: family.id,
            point: family_point(&family),
            polygons: areas.into_iter().map(AreaDto::from).collect(),
            lines: lines.into_iter().map(LineDto::from).collect(),
        })
    }

    /// Validate and persist one drawing from the map editor
    pub async fn save_geometry(
        &self,
        ctx: &RequestContext,
        dto: SaveGeometryDto,
    ) -> Result<GeometryRecordDto> {
        let kind: GeometryKind = dto.geometry_type.parse()?;
        let vertices = geometry::parse_vertices(kind, &dto.data)?;

        let mut tx = self.pool.begin().await?;

        let record = match kind {
            GeometryKind::Point => save_point(&mut tx, ctx, &dto, vertices[0]).await?,
            GeometryKind::Polygon => save_area(&mut tx, ctx, &dto, &vertices).await?,
            GeometryKind::Linestring => save_line(&mut tx, ctx, &dto, &vertices).await?,
        };

        tx.commit().await?;

        tracing::info!(
            "Geometry saved: type={}, id={}, keluarga_id={}",
            kind,
            record.id,
            record.keluarga_id
        );

        Ok(record)
    }

    /// Remove a drawing. For points `id` is the family id and its coordinates are cleared.
    pub async fn delete_geometry(
        &self,
        ctx: &RequestContext,
        kind: GeometryKind,
        id: Uuid,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let entry = match kind {
            GeometryKind::Point => {
                let before = lock_family(&mut tx, id).await?;
                clear_point(&mut tx, id).await?;
                NewActivityLog::new(ctx, ActivityAction::DeleteGeometry, kind.table_name(), id)
                    .before(&point_snapshot(&before))
            }
            GeometryKind::Polygon => {
                let area = sqlx::query_as::<_, Area>(&format!(
                    "DELETE FROM wilayah WHERE id = $1 RETURNING {AREA_COLUMNS}"
                ))
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to delete area {}: {:?}", id, e);
                    AppError::Database(e)
                })?
                .ok_or_else(|| geometry_not_found(kind, id))?;
                NewActivityLog::new(ctx, ActivityAction::DeleteGeometry, kind.table_name(), id)
                    .before(&area)
            }
            GeometryKind::Linestring => {
                let line = sqlx::query_as::<_, Distance>(&format!(
                    "DELETE FROM jarak WHERE id = $1 RETURNING {DISTANCE_COLUMNS}"
                ))
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to delete line {}: {:?}", id, e);
                    AppError::Database(e)
                })?
                .ok_or_else(|| geometry_not_found(kind, id))?;
                NewActivityLog::new(ctx, ActivityAction::DeleteGeometry, kind.table_name(), id)
                    .before(&line)
            }
        };

        ActivityLogService::record(&mut *tx, entry).await?;

        tx.commit().await?;

        tracing::info!("Geometry deleted: type={}, id={}", kind, id);

        Ok(())
    }
}

fn family_point(family: &Family) -> Option<LatLng> {
    match (family.latitude, family.longitude) {
        (Some(lat), Some(lng)) => Some(LatLng::new(lat, lng)),
        _ => None,
    }
}

fn point_snapshot(family: &Family) -> serde_json::Value {
    json!({ "latitude": family.latitude, "longitude": family.longitude })
}

fn geometry_not_found(kind: GeometryKind, id: Uuid) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", kind, id))
}

async fn save_point(
    conn: &mut PgConnection,
    ctx: &RequestContext,
    dto: &SaveGeometryDto,
    point: LatLng,
) -> Result<GeometryRecordDto> {
    let before = lock_family(conn, dto.keluarga_id).await?;

    let family = sqlx::query_as::<_, Family>(&format!(
        r#"
        UPDATE keluarga SET latitude = $2, longitude = $3, updated_at = NOW()
        WHERE id = $1
        RETURNING {FAMILY_COLUMNS}
        "#
    ))
    .bind(dto.keluarga_id)
    .bind(point.lat)
    .bind(point.lng)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| {
        tracing::error!("Failed to store point of family {}: {:?}", dto.keluarga_id, e);
        AppError::Database(e)
    })?;

    ActivityLogService::record(
        &mut *conn,
        NewActivityLog::new(
            ctx,
            ActivityAction::SaveGeometry,
            GeometryKind::Point.table_name(),
            family.id,
        )
        .before(&point_snapshot(&before))
        .after(&point_snapshot(&family))
        .description(dto.nama.clone()),
    )
    .await?;

    Ok(GeometryRecordDto {
        geometry_type: GeometryKind::Point,
        id: family.id,
        keluarga_id: family.id,
        nama: Some(dto.nama.clone()),
        coordinates: vec![point],
        panjang_meter: None,
    })
}

async fn save_area(
    conn: &mut PgConnection,
    ctx: &RequestContext,
    dto: &SaveGeometryDto,
    vertices: &[LatLng],
) -> Result<GeometryRecordDto> {
    if find_family(&mut *conn, dto.keluarga_id).await?.is_none() {
        return Err(family_not_found(dto.keluarga_id));
    }

    let area = sqlx::query_as::<_, Area>(&format!(
        r#"
        INSERT INTO wilayah (keluarga_id, nama, koordinat, keterangan)
        VALUES ($1, $2, $3, $4)
        RETURNING {AREA_COLUMNS}
        "#
    ))
    .bind(dto.keluarga_id)
    .bind(&dto.nama)
    .bind(Json(vertices))
    .bind(&dto.keterangan)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| AppError::from_write(e, "Area already exists"))?;

    ActivityLogService::record(
        &mut *conn,
        NewActivityLog::new(
            ctx,
            ActivityAction::SaveGeometry,
            GeometryKind::Polygon.table_name(),
            area.id,
        )
        .after(&area),
    )
    .await?;

    Ok(area.into())
}

async fn save_line(
    conn: &mut PgConnection,
    ctx: &RequestContext,
    dto: &SaveGeometryDto,
    vertices: &[LatLng],
) -> Result<GeometryRecordDto> {
    if find_family(&mut *conn, dto.keluarga_id).await?.is_none() {
        return Err(family_not_found(dto.keluarga_id));
    }

    let length = geometry::path_length_meters(vertices);

    let line = sqlx::query_as::<_, Distance>(&format!(
        r#"
        INSERT INTO jarak (keluarga_id, nama, koordinat, panjang_meter)
        VALUES ($1, $2, $3, $4)
        RETURNING {DISTANCE_COLUMNS}
        "#
    ))
    .bind(dto.keluarga_id)
    .bind(&dto.nama)
    .bind(Json(vertices))
    .bind(length)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| AppError::from_write(e, "Line already exists"))?;

    ActivityLogService::record(
        &mut *conn,
        NewActivityLog::new(
            ctx,
            ActivityAction::SaveGeometry,
            GeometryKind::Linestring.table_name(),
            line.id,
        )
        .after(&line),
    )
    .await?;

    Ok(line.into())
}

async fn clear_point(conn: &mut PgConnection, family_id: Uuid) -> Result<()> {
    sqlx::query(
        "UPDATE keluarga SET latitude = NULL, longitude = NULL, updated_at = NOW() WHERE id = $1",
    )
    .bind(family_id)
    .execute(conn)
    .await
    .map_err(|e| {
        tracing::error!("Failed to clear point of family {}: {:?}", family_id, e);
        AppError::Database(e)
    })?;
    Ok(())
}
