use chrono::{Datelike, Utc};
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::aid::models::GrantStatus;
use crate::features::dashboard::dtos::*;
use crate::features::families::models::{EconomicStatus, VerificationStatus};

/// Pair every value of `all` with its count from `rows`, keeping the order of `all`
fn zero_filled<S: Copy + PartialEq>(all: &[S], rows: &[(S, i64)]) -> Vec<(S, i64)> {
    all.iter()
        .map(|status| {
            let total = rows
                .iter()
                .find(|(s, _)| s == status)
                .map(|(_, total)| *total)
                .unwrap_or(0);
            (*status, total)
        })
        .collect()
}

/// Service for the admin dashboard
pub struct DashboardService {
    pool: PgPool,
}

impl DashboardService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_summary(&self) -> Result<DashboardSummaryDto> {
        let (total_keluarga, keluarga_aktif, keluarga_publik) =
            sqlx::query_as::<_, (i64, i64, i64)>(
                r#"
                SELECT
                    COUNT(*),
                    COUNT(*) FILTER (WHERE is_active),
                    COUNT(*) FILTER (WHERE is_public)
                FROM keluarga
                "#,
            )
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count families: {:?}", e);
                AppError::Database(e)
            })?;

        let total_anggota = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM anggota_keluarga")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count members: {:?}", e);
                AppError::Database(e)
            })?;

        let economic = sqlx::query_as::<_, (EconomicStatus, i64)>(
            "SELECT status_ekonomi, COUNT(*) FROM keluarga GROUP BY status_ekonomi",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to group families by economic status: {:?}", e);
            AppError::Database(e)
        })?;

        let verification = sqlx::query_as::<_, (VerificationStatus, i64)>(
            "SELECT status_verifikasi, COUNT(*) FROM keluarga GROUP BY status_verifikasi",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to group families by verification status: {:?}", e);
            AppError::Database(e)
        })?;

        let year = Utc::now().year();
        let grants = sqlx::query_as::<_, (GrantStatus, i64)>(
            "SELECT status, COUNT(*) FROM bantuan WHERE tahun_anggaran = $1 GROUP BY status",
        )
        .bind(year)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to group grants of {}: {:?}", year, e);
            AppError::Database(e)
        })?;

        let penyaluran_tersalurkan = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM penyaluran_bantuan WHERE status = 'tersalurkan'",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count delivered distributions: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(DashboardSummaryDto {
            total_keluarga,
            keluarga_aktif,
            keluarga_publik,
            total_anggota,
            per_status_ekonomi: economic_counts(&economic),
            per_status_verifikasi: zero_filled(&VerificationStatus::ALL, &verification)
                .into_iter()
                .map(|(status, total)| VerificationCountDto { status, total })
                .collect(),
            bantuan_tahun_ini: GrantYearSummaryDto {
                tahun: year,
                per_status: zero_filled(&GrantStatus::ALL, &grants)
                    .into_iter()
                    .map(|(status, total)| GrantStatusCountDto { status, total })
                    .collect(),
            },
            penyaluran_tersalurkan,
        })
    }
}

fn economic_counts(rows: &[(EconomicStatus, i64)]) -> Vec<EconomicStatusCountDto> {
    zero_filled(&EconomicStatus::ALL, rows)
        .into_iter()
        .map(|(status, total)| EconomicStatusCountDto {
            status,
            label: status.label().to_string(),
            color: status.color().to_string(),
            total,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_economic_counts_cover_every_tier_in_severity_order() {
        let rows = [(EconomicStatus::TidakMiskin, 7), (EconomicStatus::SangatMiskin, 2)];

        let counts = economic_counts(&rows);

        let statuses: Vec<EconomicStatus> = counts.iter().map(|c| c.status).collect();
        assert_eq!(statuses, EconomicStatus::ALL.to_vec());
        let totals: Vec<i64> = counts.iter().map(|c| c.total).collect();
        assert_eq!(totals, vec![2, 0, 0, 7]);
        assert_eq!(counts[0].label, "Sangat Miskin");
    }

    #[test]
    fn test_zero_filled_without_rows() {
        let filled = zero_filled(&GrantStatus::ALL, &[]);
        assert_eq!(filled.len(), 4);
        assert!(filled.iter().all(|(_, total)| *total == 0));
    }
}
