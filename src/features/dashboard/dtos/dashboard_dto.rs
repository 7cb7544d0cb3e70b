use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::aid::models::GrantStatus;
use crate::features::families::models::{EconomicStatus, VerificationStatus};

/// Family count for one economic tier, with the UI label and colour
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EconomicStatusCountDto {
    pub status: EconomicStatus,
    pub label: String,
    pub color: String,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerificationCountDto {
    pub status: VerificationStatus,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GrantStatusCountDto {
    pub status: GrantStatus,
    pub total: i64,
}

/// Grants of the current budget year
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GrantYearSummaryDto {
    pub tahun: i32,
    pub per_status: Vec<GrantStatusCountDto>,
}

/// Admin dashboard counters
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardSummaryDto {
    pub total_keluarga: i64,
    pub keluarga_aktif: i64,
    pub keluarga_publik: i64,
    pub total_anggota: i64,
    /// Every tier, most severe first, zero when empty
    pub per_status_ekonomi: Vec<EconomicStatusCountDto>,
    pub per_status_verifikasi: Vec<VerificationCountDto>,
    pub bantuan_tahun_ini: GrantYearSummaryDto,
    pub penyaluran_tersalurkan: i64,
}
