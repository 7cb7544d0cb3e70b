use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::RequestContext;
use crate::features::activity_logs::models::{ActivityAction, NewActivityLog};
use crate::features::activity_logs::ActivityLogService;
use crate::features::families::dtos::{
    FamilyDetailDto, FamilyFilter, FamilyPayloadDto, VerifyFamilyDto,
};
use crate::features::families::models::{
    Family, FamilyWithCount, Member, VerificationStatus, FAMILY_COLUMNS, MEMBER_COLUMNS,
};
use crate::shared::constants::HEAD_OF_HOUSEHOLD;
use crate::shared::types::PageQuery;
use crate::shared::validation::contains_pattern;

const TABLE: &str = "keluarga";
const DUPLICATE_NO_KK: &str = "A family with this No. KK already exists";

/// Append the listing filters to a query over `keluarga`.
///
/// Search is OR-ed over No. KK and head of household name; status is AND-ed.
pub fn push_family_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &FamilyFilter) {
    let mut separator = " WHERE ";

    if let Some(term) = &filter.search {
        let pattern = contains_pattern(term);
        builder
            .push(separator)
            .push("(no_kk ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR nama_kepala_keluarga ILIKE ")
            .push_bind(pattern)
            .push(")");
        separator = " AND ";
    }

    if let Some(status) = filter.status {
        builder
            .push(separator)
            .push("status_ekonomi = ")
            .push_bind(status);
    }
}

/// Service for family records
pub struct FamilyService {
    pool: PgPool,
}

impl FamilyService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One page of families, newest first, each with its live member count.
    /// Returns (rows, total matching the filters).
    pub async fn list(
        &self,
        filter: &FamilyFilter,
        page: &PageQuery,
    ) -> Result<(Vec<FamilyWithCount>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM keluarga");
        push_family_filters(&mut count, filter);

        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count families: {:?}", e);
                AppError::Database(e)
            })?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT ");
        select
            .push(FAMILY_COLUMNS)
            .push(
                ", (SELECT COUNT(*) FROM anggota_keluarga a WHERE a.keluarga_id = keluarga.id) \
                 AS anggota_count FROM keluarga",
            );
        push_family_filters(&mut select, filter);
        select
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = select
            .build_query_as::<FamilyWithCount>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list families: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((rows, total))
    }

    /// All families matching the filters, newest first (used by exports)
    pub async fn list_all(&self, filter: &FamilyFilter) -> Result<Vec<Family>> {
        let mut select = QueryBuilder::<Postgres>::new("SELECT ");
        select.push(FAMILY_COLUMNS).push(" FROM keluarga");
        push_family_filters(&mut select, filter);
        select.push(" ORDER BY created_at DESC, id DESC");

        select
            .build_query_as::<Family>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list families for export: {:?}", e);
                AppError::Database(e)
            })
    }

    /// Get a family by id
    pub async fn get(&self, id: Uuid) -> Result<Family> {
        find_family(&self.pool, id)
            .await?
            .ok_or_else(|| family_not_found(id))
    }

    /// Family with members ordered head first, then by birth date and name
    pub async fn get_detail(&self, id: Uuid) -> Result<FamilyDetailDto> {
        let family = self.get(id).await?;

        let anggota = sqlx::query_as::<_, Member>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM anggota_keluarga WHERE keluarga_id = $1 \
             ORDER BY (hubungan_keluarga = $2) DESC, tanggal_lahir ASC NULLS LAST, nama ASC"
        ))
        .bind(id)
        .bind(HEAD_OF_HOUSEHOLD)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch members of family {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        Ok(FamilyDetailDto { family, anggota })
    }

    /// Create a family record
    pub async fn create(&self, ctx: &RequestContext, dto: FamilyPayloadDto) -> Result<Family> {
        let mut tx = self.pool.begin().await?;

        let family = sqlx::query_as::<_, Family>(&format!(
            r#"
            INSERT INTO keluarga (
                no_kk, nama_kepala_keluarga, alamat, rt, rw, kelurahan, kecamatan, kota,
                provinsi, kode_pos, latitude, longitude, status_ekonomi, penghasilan_bulanan,
                jumlah_anggota, is_active, is_public
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {FAMILY_COLUMNS}
            "#
        ))
        .bind(&dto.no_kk)
        .bind(&dto.nama_kepala_keluarga)
        .bind(&dto.alamat)
        .bind(&dto.rt)
        .bind(&dto.rw)
        .bind(&dto.kelurahan)
        .bind(&dto.kecamatan)
        .bind(&dto.kota)
        .bind(&dto.provinsi)
        .bind(&dto.kode_pos)
        .bind(dto.latitude)
        .bind(dto.longitude)
        .bind(dto.status_ekonomi)
        .bind(dto.penghasilan_bulanan)
        .bind(dto.jumlah_anggota)
        .bind(dto.is_active)
        .bind(dto.is_public)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_write(e, DUPLICATE_NO_KK))?;

        ActivityLogService::record(
            &mut *tx,
            NewActivityLog::new(ctx, ActivityAction::Create, TABLE, family.id).after(&family),
        )
        .await?;

        tx.commit().await?;

        tracing::info!("Family created: id={}, no_kk={}", family.id, family.no_kk);

        Ok(family)
    }

    /// Replace the editable fields of a family record
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        dto: FamilyPayloadDto,
    ) -> Result<Family> {
        let mut tx = self.pool.begin().await?;

        let before = lock_family(&mut tx, id).await?;

        let family = sqlx::query_as::<_, Family>(&format!(
            r#"
            UPDATE keluarga SET
                no_kk = $2, nama_kepala_keluarga = $3, alamat = $4, rt = $5, rw = $6,
                kelurahan = $7, kecamatan = $8, kota = $9, provinsi = $10, kode_pos = $11,
                latitude = $12, longitude = $13, status_ekonomi = $14,
                penghasilan_bulanan = $15, jumlah_anggota = $16, is_active = $17,
                is_public = $18, updated_at = NOW()
            WHERE id = $1
            RETURNING {FAMILY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&dto.no_kk)
        .bind(&dto.nama_kepala_keluarga)
        .bind(&dto.alamat)
        .bind(&dto.rt)
        .bind(&dto.rw)
        .bind(&dto.kelurahan)
        .bind(&dto.kecamatan)
        .bind(&dto.kota)
        .bind(&dto.provinsi)
        .bind(&dto.kode_pos)
        .bind(dto.latitude)
        .bind(dto.longitude)
        .bind(dto.status_ekonomi)
        .bind(dto.penghasilan_bulanan)
        .bind(dto.jumlah_anggota)
        .bind(dto.is_active)
        .bind(dto.is_public)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_write(e, DUPLICATE_NO_KK))?;

        ActivityLogService::record(
            &mut *tx,
            NewActivityLog::new(ctx, ActivityAction::Update, TABLE, id)
                .before(&before)
                .after(&family),
        )
        .await?;

        tx.commit().await?;

        tracing::info!("Family updated: id={}", id);

        Ok(family)
    }

    /// Delete a family; members, drawings and grants cascade
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let before = lock_family(&mut tx, id).await?;

        sqlx::query("DELETE FROM keluarga WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete family {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        ActivityLogService::record(
            &mut *tx,
            NewActivityLog::new(ctx, ActivityAction::Delete, TABLE, id).before(&before),
        )
        .await?;

        tx.commit().await?;

        tracing::info!("Family deleted: id={}, no_kk={}", id, before.no_kk);

        Ok(())
    }

    /// Record a verification decision (verified or rejected)
    pub async fn verify(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        dto: VerifyFamilyDto,
    ) -> Result<Family> {
        if dto.status_verifikasi == VerificationStatus::BelumVerifikasi {
            return Err(AppError::Validation(
                "Verification decision must be 'terverifikasi' or 'ditolak'".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let before = lock_family(&mut tx, id).await?;

        let family = sqlx::query_as::<_, Family>(&format!(
            r#"
            UPDATE keluarga SET
                status_verifikasi = $2, diverifikasi_oleh = $3, diverifikasi_pada = NOW(),
                catatan_verifikasi = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {FAMILY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(dto.status_verifikasi)
        .bind(&ctx.actor)
        .bind(&dto.catatan)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to verify family {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        ActivityLogService::record(
            &mut *tx,
            NewActivityLog::new(ctx, ActivityAction::Verify, TABLE, id)
                .before(&before)
                .after(&family)
                .description(format!("Verification set to {}", dto.status_verifikasi)),
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            "Family verification recorded: id={}, status={}",
            id,
            family.status_verifikasi
        );

        Ok(family)
    }

    /// Toggle whether the family appears on the public map
    pub async fn set_visibility(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        is_public: bool,
    ) -> Result<Family> {
        let mut tx = self.pool.begin().await?;

        let before = lock_family(&mut tx, id).await?;

        let family = sqlx::query_as::<_, Family>(&format!(
            "UPDATE keluarga SET is_public = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {FAMILY_COLUMNS}"
        ))
        .bind(id)
        .bind(is_public)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to change visibility of family {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        ActivityLogService::record(
            &mut *tx,
            NewActivityLog::new(ctx, ActivityAction::ChangeVisibility, TABLE, id)
                .before(&serde_json::json!({ "is_public": before.is_public }))
                .after(&serde_json::json!({ "is_public": family.is_public })),
        )
        .await?;

        tx.commit().await?;

        tracing::info!("Family visibility changed: id={}, is_public={}", id, is_public);

        Ok(family)
    }
}

pub(crate) fn family_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Family with id '{}' not found", id))
}

/// Fetch a family by id on any executor
pub(crate) async fn find_family<'e, E>(executor: E, id: Uuid) -> Result<Option<Family>>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query_as::<_, Family>(&format!(
        "SELECT {FAMILY_COLUMNS} FROM keluarga WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch family {}: {:?}", id, e);
        AppError::Database(e)
    })
}

/// Fetch and row-lock a family inside a transaction, failing with not-found
pub(crate) async fn lock_family(conn: &mut PgConnection, id: Uuid) -> Result<Family> {
    sqlx::query_as::<_, Family>(&format!(
        "SELECT {FAMILY_COLUMNS} FROM keluarga WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(|e| {
        tracing::error!("Failed to lock family {}: {:?}", id, e);
        AppError::Database(e)
    })?
    .ok_or_else(|| family_not_found(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::families::models::EconomicStatus;

    fn filter(search: Option<&str>, status: Option<EconomicStatus>) -> FamilyFilter {
        FamilyFilter {
            search: search.map(str::to_string),
            status,
        }
    }

    #[test]
    fn test_no_filters_adds_no_where_clause() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM keluarga");
        push_family_filters(&mut builder, &filter(None, None));
        assert_eq!(builder.sql(), "SELECT COUNT(*) FROM keluarga");
    }

    #[test]
    fn test_search_is_or_over_both_fields() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM keluarga");
        push_family_filters(&mut builder, &filter(Some("Budi"), None));
        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM keluarga WHERE (no_kk ILIKE $1 OR nama_kepala_keluarga ILIKE $2)"
        );
    }

    #[test]
    fn test_search_and_status_are_and_combined() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM keluarga");
        push_family_filters(
            &mut builder,
            &filter(Some("Budi"), Some(EconomicStatus::SangatMiskin)),
        );
        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM keluarga WHERE (no_kk ILIKE $1 OR nama_kepala_keluarga ILIKE $2) \
             AND status_ekonomi = $3"
        );
    }

    #[test]
    fn test_status_only_filter() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM keluarga");
        push_family_filters(&mut builder, &filter(None, Some(EconomicStatus::Miskin)));
        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM keluarga WHERE status_ekonomi = $1"
        );
    }

    fn budi() -> FamilyPayloadDto {
        FamilyPayloadDto {
            no_kk: "3201010101010001".to_string(),
            nama_kepala_keluarga: "Budi Santoso".to_string(),
            alamat: "Jl. Merdeka No. 1".to_string(),
            rt: Some("001".to_string()),
            rw: Some("002".to_string()),
            kelurahan: Some("Pakuan".to_string()),
            kecamatan: Some("Bogor Selatan".to_string()),
            kota: Some("Bogor".to_string()),
            provinsi: Some("Jawa Barat".to_string()),
            kode_pos: Some("16143".to_string()),
            latitude: None,
            longitude: None,
            status_ekonomi: EconomicStatus::Miskin,
            penghasilan_bulanan: rust_decimal::Decimal::from(1_500_000),
            jumlah_anggota: 3,
            is_active: true,
            is_public: false,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_create_search_and_duplicate_no_kk(pool: PgPool) {
        let service = FamilyService::new(pool.clone());
        let ctx = RequestContext::default();

        let family = service.create(&ctx, budi()).await.unwrap();
        assert_eq!(family.status_verifikasi, VerificationStatus::BelumVerifikasi);

        let (rows, total) = service
            .list(&filter(Some("budi"), Some(EconomicStatus::Miskin)), &PageQuery::default())
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].family.id, family.id);
        assert_eq!(rows[0].anggota_count, 0);

        let (_, total) = service
            .list(&filter(Some("budi"), Some(EconomicStatus::RentanMiskin)), &PageQuery::default())
            .await
            .unwrap();
        assert_eq!(total, 0);

        let err = service.create(&ctx, budi()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let logged: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM activity_logs WHERE table_name = 'keluarga' AND record_id = $1",
        )
        .bind(family.id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(logged, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_list_pages_ten_rows_with_full_total(pool: PgPool) {
        let service = FamilyService::new(pool);
        let ctx = RequestContext::default();

        for i in 0..12 {
            let mut payload = budi();
            payload.no_kk = format!("32010101010100{:02}", i);
            payload.nama_kepala_keluarga = format!("Keluarga {:02}", i);
            service.create(&ctx, payload).await.unwrap();
        }

        let no_filter = filter(None, None);

        let (first, total) = service.list(&no_filter, &PageQuery { page: 1 }).await.unwrap();
        assert_eq!(first.len(), 10);
        assert_eq!(total, 12);

        let (second, total) = service.list(&no_filter, &PageQuery { page: 2 }).await.unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(total, 12);
        assert!(second
            .iter()
            .all(|row| first.iter().all(|seen| seen.family.id != row.family.id)));

        let (past_end, total) = service
            .list(&no_filter, &PageQuery { page: i64::MAX })
            .await
            .unwrap();
        assert!(past_end.is_empty());
        assert_eq!(total, 12);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_detail_orders_head_of_household_first(pool: PgPool) {
        use crate::features::families::dtos::MemberPayloadDto;
        use crate::features::families::models::Gender;
        use crate::features::families::services::MemberService;

        let families = FamilyService::new(pool.clone());
        let members = MemberService::new(pool);
        let ctx = RequestContext::default();

        let family = families.create(&ctx, budi()).await.unwrap();

        let member = |nik: &str, nama: &str, hubungan: &str, year: i32| MemberPayloadDto {
            nik: nik.to_string(),
            nama: nama.to_string(),
            jenis_kelamin: Gender::LakiLaki,
            tempat_lahir: None,
            tanggal_lahir: chrono::NaiveDate::from_ymd_opt(year, 1, 1),
            status_perkawinan: None,
            pendidikan: None,
            pekerjaan: None,
            hubungan_keluarga: hubungan.to_string(),
        };

        members
            .create(&ctx, family.id, member("3201010101100003", "Andi", "Anak", 2010))
            .await
            .unwrap();
        members
            .create(&ctx, family.id, member("3201010101800001", "Budi Santoso", HEAD_OF_HOUSEHOLD, 1980))
            .await
            .unwrap();
        members
            .create(&ctx, family.id, member("3201010101050002", "Citra", "Anak", 2005))
            .await
            .unwrap();

        let detail = families.get_detail(family.id).await.unwrap();
        let names: Vec<&str> = detail.anggota.iter().map(|m| m.nama.as_str()).collect();
        assert_eq!(names, vec!["Budi Santoso", "Citra", "Andi"]);
    }
}
