use chrono::Utc;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::RequestContext;
use crate::features::activity_logs::models::{ActivityAction, NewActivityLog};
use crate::features::activity_logs::ActivityLogService;
use crate::features::aid::dtos::{
    CreateGrantDto, GrantDetailDto, GrantFilter, RecordDistributionDto,
};
use crate::features::aid::models::{
    Distribution, Grant, GrantStatus, GrantWithFamily, DISTRIBUTION_COLUMNS, GRANT_COLUMNS,
};
use crate::features::families::services::{family_not_found, find_family};
use crate::shared::constants::MONTHS_PER_YEAR;
use crate::shared::types::PageQuery;

const GRANT_TABLE: &str = "bantuan";
const DISTRIBUTION_TABLE: &str = "penyaluran_bantuan";
const DUPLICATE_GRANT: &str = "This family already has a grant for that budget year";

/// Append the listing filters to a query over `bantuan b JOIN keluarga k`
pub fn push_grant_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &GrantFilter) {
    let mut separator = " WHERE ";

    if let Some(year) = filter.tahun {
        builder
            .push(separator)
            .push("b.tahun_anggaran = ")
            .push_bind(year);
        separator = " AND ";
    }

    if let Some(status) = filter.status {
        builder.push(separator).push("b.status = ").push_bind(status);
    }
}

/// Validate a month path segment
pub fn parse_month(month: i32) -> Result<i16> {
    i16::try_from(month)
        .ok()
        .filter(|m| (1..=MONTHS_PER_YEAR).contains(m))
        .ok_or_else(|| AppError::Validation(format!("Month must be between 1 and 12, got {}", month)))
}

/// Service for aid grants and their monthly distributions
pub struct GrantService {
    pool: PgPool,
}

impl GrantService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One page of grants, newest budget year first
    pub async fn list(
        &self,
        filter: &GrantFilter,
        page: &PageQuery,
    ) -> Result<(Vec<GrantWithFamily>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM bantuan b JOIN keluarga k ON k.id = b.keluarga_id",
        );
        push_grant_filters(&mut count, filter);

        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count grants: {:?}", e);
                AppError::Database(e)
            })?;

        let mut select = QueryBuilder::<Postgres>::new(
            "SELECT b.id, b.keluarga_id, b.tahun_anggaran, b.nominal_per_bulan, b.status, \
             b.tanggal_penetapan, b.keterangan, b.created_at, b.updated_at, \
             k.nama_kepala_keluarga, k.no_kk \
             FROM bantuan b JOIN keluarga k ON k.id = b.keluarga_id",
        );
        push_grant_filters(&mut select, filter);
        select
            .push(" ORDER BY b.tahun_anggaran DESC, b.created_at DESC, b.id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = select
            .build_query_as::<GrantWithFamily>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list grants: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((rows, total))
    }

    /// Grant with its distributions ordered by month
    pub async fn get_detail(&self, id: Uuid) -> Result<GrantDetailDto> {
        let grant = sqlx::query_as::<_, Grant>(&format!(
            "SELECT {GRANT_COLUMNS} FROM bantuan WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch grant {}: {:?}", id, e);
            AppError::Database(e)
        })?
        .ok_or_else(|| grant_not_found(id))?;

        let penyaluran = sqlx::query_as::<_, Distribution>(&format!(
            "SELECT {DISTRIBUTION_COLUMNS} FROM penyaluran_bantuan WHERE bantuan_id = $1 ORDER BY bulan"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch distributions of grant {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        Ok(GrantDetailDto { grant, penyaluran })
    }

    /// Assign a grant and create its twelve pending distributions
    pub async fn create(&self, ctx: &RequestContext, dto: CreateGrantDto) -> Result<GrantDetailDto> {
        let mut tx = self.pool.begin().await?;

        if find_family(&mut *tx, dto.keluarga_id).await?.is_none() {
            return Err(family_not_found(dto.keluarga_id));
        }

        let grant = sqlx::query_as::<_, Grant>(&format!(
            r#"
            INSERT INTO bantuan (keluarga_id, tahun_anggaran, nominal_per_bulan, tanggal_penetapan, keterangan)
            VALUES ($1, $2, $3, COALESCE($4, CURRENT_DATE), $5)
            RETURNING {GRANT_COLUMNS}
            "#
        ))
        .bind(dto.keluarga_id)
        .bind(dto.tahun_anggaran)
        .bind(dto.nominal_per_bulan)
        .bind(dto.tanggal_penetapan)
        .bind(&dto.keterangan)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_write(e, DUPLICATE_GRANT))?;

        let mut penyaluran = sqlx::query_as::<_, Distribution>(&format!(
            r#"
            INSERT INTO penyaluran_bantuan (bantuan_id, bulan)
            SELECT $1::UUID, m::SMALLINT FROM generate_series(1, $2::INT) AS m
            RETURNING {DISTRIBUTION_COLUMNS}
            "#
        ))
        .bind(grant.id)
        .bind(i32::from(MONTHS_PER_YEAR))
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create distributions of grant {}: {:?}", grant.id, e);
            AppError::Database(e)
        })?;
        penyaluran.sort_by_key(|d| d.bulan);

        ActivityLogService::record(
            &mut *tx,
            NewActivityLog::new(ctx, ActivityAction::Create, GRANT_TABLE, grant.id).after(&grant),
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            "Grant created: id={}, keluarga_id={}, tahun={}",
            grant.id,
            grant.keluarga_id,
            grant.tahun_anggaran
        );

        Ok(GrantDetailDto { grant, penyaluran })
    }

    /// Move a grant along its lifecycle
    pub async fn update_status(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        next: GrantStatus,
    ) -> Result<Grant> {
        let mut tx = self.pool.begin().await?;

        let before = lock_grant(&mut tx, id).await?;

        if !before.status.can_transition_to(next) {
            return Err(AppError::Validation(format!(
                "Grant status cannot change from '{}' to '{}'",
                before.status, next
            )));
        }

        let grant = sqlx::query_as::<_, Grant>(&format!(
            "UPDATE bantuan SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {GRANT_COLUMNS}"
        ))
        .bind(id)
        .bind(next)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update status of grant {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        ActivityLogService::record(
            &mut *tx,
            NewActivityLog::new(ctx, ActivityAction::ChangeStatus, GRANT_TABLE, id)
                .before(&before)
                .after(&grant)
                .description(format!("{} -> {}", before.status, next)),
        )
        .await?;

        tx.commit().await?;

        tracing::info!("Grant status changed: id={}, {} -> {}", id, before.status, next);

        Ok(grant)
    }

    /// Record the outcome of one month's distribution on an active grant
    pub async fn record_distribution(
        &self,
        ctx: &RequestContext,
        grant_id: Uuid,
        month: i32,
        dto: RecordDistributionDto,
    ) -> Result<Distribution> {
        let month = parse_month(month)?;

        let mut tx = self.pool.begin().await?;

        let grant = lock_grant(&mut tx, grant_id).await?;
        if grant.status != GrantStatus::Aktif {
            return Err(AppError::Validation(format!(
                "Distributions can only be recorded on an active grant (status is '{}')",
                grant.status
            )));
        }

        let before = sqlx::query_as::<_, Distribution>(&format!(
            "SELECT {DISTRIBUTION_COLUMNS} FROM penyaluran_bantuan \
             WHERE bantuan_id = $1 AND bulan = $2 FOR UPDATE"
        ))
        .bind(grant_id)
        .bind(month)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to lock distribution {}/{}: {:?}", grant_id, month, e);
            AppError::Database(e)
        })?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Distribution for month {} of grant '{}' not found",
                month, grant_id
            ))
        })?;

        let timestamp = dto.status.resolve_timestamp(dto.tanggal_penyaluran, Utc::now());

        let distribution = sqlx::query_as::<_, Distribution>(&format!(
            r#"
            UPDATE penyaluran_bantuan
            SET status = $2, tanggal_penyaluran = $3, keterangan = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {DISTRIBUTION_COLUMNS}
            "#
        ))
        .bind(before.id)
        .bind(dto.status)
        .bind(timestamp)
        .bind(&dto.keterangan)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to record distribution {}: {:?}", before.id, e);
            AppError::Database(e)
        })?;

        ActivityLogService::record(
            &mut *tx,
            NewActivityLog::new(
                ctx,
                ActivityAction::RecordDistribution,
                DISTRIBUTION_TABLE,
                distribution.id,
            )
            .before(&before)
            .after(&distribution),
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            "Distribution recorded: bantuan_id={}, bulan={}",
            grant_id,
            month
        );

        Ok(distribution)
    }
}

fn grant_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Grant with id '{}' not found", id))
}

async fn lock_grant(conn: &mut PgConnection, id: Uuid) -> Result<Grant> {
    sqlx::query_as::<_, Grant>(&format!(
        "SELECT {GRANT_COLUMNS} FROM bantuan WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(|e| {
        tracing::error!("Failed to lock grant {}: {:?}", id, e);
        AppError::Database(e)
    })?
    .ok_or_else(|| grant_not_found(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month_bounds() {
        assert_eq!(parse_month(1).unwrap(), 1);
        assert_eq!(parse_month(12).unwrap(), 12);
        assert!(parse_month(0).is_err());
        assert!(parse_month(13).is_err());
        assert!(parse_month(70_000).is_err());
    }

    #[test]
    fn test_grant_filters() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM bantuan b");
        push_grant_filters(
            &mut builder,
            &GrantFilter {
                tahun: Some(2025),
                status: Some(GrantStatus::Aktif),
            },
        );
        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM bantuan b WHERE b.tahun_anggaran = $1 AND b.status = $2"
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_grant_lifecycle(pool: PgPool) {
        let ctx = RequestContext::default();
        let family_id: Uuid = sqlx::query_scalar(
            "INSERT INTO keluarga (no_kk, nama_kepala_keluarga, alamat, status_ekonomi, penghasilan_bulanan, jumlah_anggota) \
             VALUES ('3201010101010001', 'Budi', '', 'miskin', 0, 1) RETURNING id",
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        let service = GrantService::new(pool);
        let dto = CreateGrantDto {
            keluarga_id: family_id,
            tahun_anggaran: 2025,
            nominal_per_bulan: rust_decimal::Decimal::from(300_000),
            tanggal_penetapan: None,
            keterangan: None,
        };

        let created = service.create(&ctx, dto.clone()).await.unwrap();
        assert_eq!(created.grant.status, GrantStatus::Ditetapkan);
        let months: Vec<i16> = created.penyaluran.iter().map(|d| d.bulan).collect();
        assert_eq!(months, (1..=12).collect::<Vec<i16>>());

        assert!(matches!(
            service.create(&ctx, dto).await,
            Err(AppError::Conflict(_))
        ));

        let record = RecordDistributionDto {
            status: crate::features::aid::models::DistributionStatus::Tersalurkan,
            tanggal_penyaluran: None,
            keterangan: None,
        };
        assert!(matches!(
            service
                .record_distribution(&ctx, created.grant.id, 1, record.clone())
                .await,
            Err(AppError::Validation(_))
        ));

        service
            .update_status(&ctx, created.grant.id, GrantStatus::Aktif)
            .await
            .unwrap();
        let delivered = service
            .record_distribution(&ctx, created.grant.id, 1, record)
            .await
            .unwrap();
        assert!(delivered.tanggal_penyaluran.is_some());

        assert!(matches!(
            service
                .update_status(&ctx, created.grant.id, GrantStatus::Ditetapkan)
                .await,
            Err(AppError::Validation(_))
        ));
    }
}
