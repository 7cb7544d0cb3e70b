use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::RequestContext;
use crate::features::activity_logs::models::{ActivityAction, NewActivityLog};
use crate::features::activity_logs::ActivityLogService;
use crate::features::families::dtos::MemberPayloadDto;
use crate::features::families::models::{Member, MEMBER_COLUMNS};
use crate::features::families::services::{family_not_found, find_family};
use crate::shared::constants::HEAD_OF_HOUSEHOLD;

const TABLE: &str = "anggota_keluarga";
const DUPLICATE_NIK: &str = "A household member with this NIK already exists";

/// Service for household members
pub struct MemberService {
    pool: PgPool,
}

impl MemberService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Members of one family, head of household first
    pub async fn list_by_family(&self, family_id: Uuid) -> Result<Vec<Member>> {
        if find_family(&self.pool, family_id).await?.is_none() {
            return Err(family_not_found(family_id));
        }

        sqlx::query_as::<_, Member>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM anggota_keluarga WHERE keluarga_id = $1 \
             ORDER BY (hubungan_keluarga = $2) DESC, tanggal_lahir ASC NULLS LAST, nama ASC"
        ))
        .bind(family_id)
        .bind(HEAD_OF_HOUSEHOLD)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list members of family {}: {:?}", family_id, e);
            AppError::Database(e)
        })
    }

    /// Add a member to a family
    pub async fn create(
        &self,
        ctx: &RequestContext,
        family_id: Uuid,
        dto: MemberPayloadDto,
    ) -> Result<Member> {
        let mut tx = self.pool.begin().await?;

        if find_family(&mut *tx, family_id).await?.is_none() {
            return Err(family_not_found(family_id));
        }

        let member = sqlx::query_as::<_, Member>(&format!(
            r#"
            INSERT INTO anggota_keluarga (
                keluarga_id, nik, nama, jenis_kelamin, tempat_lahir, tanggal_lahir,
                status_perkawinan, pendidikan, pekerjaan, hubungan_keluarga
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {MEMBER_COLUMNS}
            "#
        ))
        .bind(family_id)
        .bind(&dto.nik)
        .bind(&dto.nama)
        .bind(dto.jenis_kelamin)
        .bind(&dto.tempat_lahir)
        .bind(dto.tanggal_lahir)
        .bind(&dto.status_perkawinan)
        .bind(&dto.pendidikan)
        .bind(&dto.pekerjaan)
        .bind(&dto.hubungan_keluarga)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_write(e, DUPLICATE_NIK))?;

        ActivityLogService::record(
            &mut *tx,
            NewActivityLog::new(ctx, ActivityAction::Create, TABLE, member.id).after(&member),
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            "Member created: id={}, keluarga_id={}",
            member.id,
            family_id
        );

        Ok(member)
    }

    /// Replace a member's fields
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        dto: MemberPayloadDto,
    ) -> Result<Member> {
        let mut tx = self.pool.begin().await?;

        let before = lock_member(&mut tx, id).await?;

        let member = sqlx::query_as::<_, Member>(&format!(
            r#"
            UPDATE anggota_keluarga SET
                nik = $2, nama = $3, jenis_kelamin = $4, tempat_lahir = $5, tanggal_lahir = $6,
                status_perkawinan = $7, pendidikan = $8, pekerjaan = $9,
                hubungan_keluarga = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING {MEMBER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&dto.nik)
        .bind(&dto.nama)
        .bind(dto.jenis_kelamin)
        .bind(&dto.tempat_lahir)
        .bind(dto.tanggal_lahir)
        .bind(&dto.status_perkawinan)
        .bind(&dto.pendidikan)
        .bind(&dto.pekerjaan)
        .bind(&dto.hubungan_keluarga)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_write(e, DUPLICATE_NIK))?;

        ActivityLogService::record(
            &mut *tx,
            NewActivityLog::new(ctx, ActivityAction::Update, TABLE, id)
                .before(&before)
                .after(&member),
        )
        .await?;

        tx.commit().await?;

        tracing::info!("Member updated: id={}", id);

        Ok(member)
    }

    /// Remove a member
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let before = lock_member(&mut tx, id).await?;

        sqlx::query("DELETE FROM anggota_keluarga WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete member {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        ActivityLogService::record(
            &mut *tx,
            NewActivityLog::new(ctx, ActivityAction::Delete, TABLE, id).before(&before),
        )
        .await?;

        tx.commit().await?;

        tracing::info!("Member deleted: id={}, keluarga_id={}", id, before.keluarga_id);

        Ok(())
    }
}

async fn lock_member(conn: &mut PgConnection, id: Uuid) -> Result<Member> {
    sqlx::query_as::<_, Member>(&format!(
        "SELECT {MEMBER_COLUMNS} FROM anggota_keluarga WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(|e| {
        tracing::error!("Failed to lock member {}: {:?}", id, e);
        AppError::Database(e)
    })?
    .ok_or_else(|| AppError::NotFound(format!("Household member with id '{}' not found", id)))
}
