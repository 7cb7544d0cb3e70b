use sqlx::{PgConnection, PgPool};

use crate::core::error::{AppError, Result};
use crate::core::extractor::RequestContext;
use crate::features::activity_logs::models::{ActivityAction, NewActivityLog};
use crate::features::activity_logs::ActivityLogService;
use crate::features::aid::dtos::{ProgramPayloadDto, MAX_BUDGET_YEAR, MIN_BUDGET_YEAR};
use crate::features::aid::models::{Program, ProgramStatus, PROGRAM_COLUMNS};

const TABLE: &str = "pengaturan_bantuan";

fn check_year(year: i32) -> Result<()> {
    if !(MIN_BUDGET_YEAR..=MAX_BUDGET_YEAR).contains(&year) {
        return Err(AppError::Validation(format!(
            "Budget year must be between {} and {}, got {}",
            MIN_BUDGET_YEAR, MAX_BUDGET_YEAR, year
        )));
    }
    Ok(())
}

fn program_not_found(year: i32) -> AppError {
    AppError::NotFound(format!("No aid program configured for {}", year))
}

/// Service for yearly aid program settings
pub struct ProgramService {
    pool: PgPool,
}

impl ProgramService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All configured years, newest first
    pub async fn list(&self) -> Result<Vec<Program>> {
        sqlx::query_as::<_, Program>(&format!(
            "SELECT {PROGRAM_COLUMNS} FROM pengaturan_bantuan ORDER BY tahun_anggaran DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list aid programs: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn get(&self, year: i32) -> Result<Program> {
        check_year(year)?;

        sqlx::query_as::<_, Program>(&format!(
            "SELECT {PROGRAM_COLUMNS} FROM pengaturan_bantuan WHERE tahun_anggaran = $1"
        ))
        .bind(year)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch aid program {}: {:?}", year, e);
            AppError::Database(e)
        })?
        .ok_or_else(|| program_not_found(year))
    }

    /// Create the year's settings as a draft, or replace them unless the program is finished
    pub async fn upsert(
        &self,
        ctx: &RequestContext,
        year: i32,
        dto: ProgramPayloadDto,
    ) -> Result<Program> {
        check_year(year)?;

        let mut tx = self.pool.begin().await?;

        let before = lock_program(&mut tx, year).await?;

        if let Some(existing) = &before {
            if existing.status == ProgramStatus::Selesai {
                return Err(AppError::Validation(format!(
                    "The {} program is finished and can no longer be edited",
                    year
                )));
            }
        }

        let sql = match &before {
            Some(_) => format!(
                r#"
                UPDATE pengaturan_bantuan SET
                    tanggal_mulai_pendaftaran = $2, tanggal_selesai_pendaftaran = $3,
                    tanggal_mulai_penyaluran = $4, tanggal_selesai_penyaluran = $5,
                    kuota = $6, kriteria = $7, updated_at = NOW()
                WHERE id = $1
                RETURNING {PROGRAM_COLUMNS}
                "#
            ),
            None => format!(
                r#"
                INSERT INTO pengaturan_bantuan (
                    tahun_anggaran, tanggal_mulai_pendaftaran, tanggal_selesai_pendaftaran,
                    tanggal_mulai_penyaluran, tanggal_selesai_penyaluran, kuota, kriteria
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING {PROGRAM_COLUMNS}
                "#
            ),
        };

        let query = sqlx::query_as::<_, Program>(&sql);
        let query = match &before {
            Some(existing) => query.bind(existing.id),
            None => query.bind(year),
        };

        let program = query
            .bind(dto.tanggal_mulai_pendaftaran)
            .bind(dto.tanggal_selesai_pendaftaran)
            .bind(dto.tanggal_mulai_penyaluran)
            .bind(dto.tanggal_selesai_penyaluran)
            .bind(dto.kuota)
            .bind(&dto.kriteria)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| AppError::from_write(e, "An aid program for this year already exists"))?;

        let action = if before.is_some() {
            ActivityAction::Update
        } else {
            ActivityAction::Create
        };
        let mut entry = NewActivityLog::new(ctx, action, TABLE, program.id).after(&program);
        if let Some(existing) = &before {
            entry = entry.before(existing);
        }
        ActivityLogService::record(&mut *tx, entry).await?;

        tx.commit().await?;

        tracing::info!("Aid program saved: tahun={}", year);

        Ok(program)
    }

    /// Move a program one step forward (draft, aktif, selesai)
    pub async fn update_status(
        &self,
        ctx: &RequestContext,
        year: i32,
        next: ProgramStatus,
    ) -> Result<Program> {
        check_year(year)?;

        let mut tx = self.pool.begin().await?;

        let before = lock_program(&mut tx, year)
            .await?
            .ok_or_else(|| program_not_found(year))?;

        if !before.status.can_transition_to(next) {
            return Err(AppError::Validation(format!(
                "Program status cannot change from '{}' to '{}'",
                before.status, next
            )));
        }

        let program = sqlx::query_as::<_, Program>(&format!(
            "UPDATE pengaturan_bantuan SET status = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {PROGRAM_COLUMNS}"
        ))
        .bind(before.id)
        .bind(next)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update status of aid program {}: {:?}", year, e);
            AppError::Database(e)
        })?;

        ActivityLogService::record(
            &mut *tx,
            NewActivityLog::new(ctx, ActivityAction::ChangeStatus, TABLE, program.id)
                .before(&before)
                .after(&program)
                .description(format!("{} -> {}", before.status, next)),
        )
        .await?;

        tx.commit().await?;

        tracing::info!("Aid program status changed: tahun={}, {} -> {}", year, before.status, next);

        Ok(program)
    }
}

async fn lock_program(conn: &mut PgConnection, year: i32) -> Result<Option<Program>> {
    sqlx::query_as::<_, Program>(&format!(
        "SELECT {PROGRAM_COLUMNS} FROM pengaturan_bantuan WHERE tahun_anggaran = $1 FOR UPDATE"
    ))
    .bind(year)
    .fetch_optional(conn)
    .await
    .map_err(|e| {
        tracing::error!("Failed to lock aid program {}: {:?}", year, e);
        AppError::Database(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_year() {
        assert!(check_year(2000).is_ok());
        assert!(check_year(2100).is_ok());
        assert!(matches!(check_year(1999), Err(AppError::Validation(_))));
    }
}
