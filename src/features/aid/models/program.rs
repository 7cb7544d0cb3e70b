use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Program lifecycle, matching the `status_program` database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "status_program", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProgramStatus {
    Draft,
    Aktif,
    Selesai,
}

impl ProgramStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgramStatus::Draft => "draft",
            ProgramStatus::Aktif => "aktif",
            ProgramStatus::Selesai => "selesai",
        }
    }

    /// Programs only move forward one step: draft, aktif, selesai
    pub fn can_transition_to(&self, next: ProgramStatus) -> bool {
        matches!(
            (self, next),
            (ProgramStatus::Draft, ProgramStatus::Aktif)
                | (ProgramStatus::Aktif, ProgramStatus::Selesai)
        )
    }
}

impl std::fmt::Display for ProgramStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for one budget year (pengaturan_bantuan)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Program {
    pub id: Uuid,
    pub tahun_anggaran: i32,
    pub tanggal_mulai_pendaftaran: NaiveDate,
    pub tanggal_selesai_pendaftaran: NaiveDate,
    pub tanggal_mulai_penyaluran: NaiveDate,
    pub tanggal_selesai_penyaluran: NaiveDate,
    pub kuota: i32,
    pub kriteria: Option<String>,
    pub status: ProgramStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const PROGRAM_COLUMNS: &str = "id, tahun_anggaran, tanggal_mulai_pendaftaran, \
     tanggal_selesai_pendaftaran, tanggal_mulai_penyaluran, tanggal_selesai_penyaluran, \
     kuota, kriteria, status, created_at, updated_at";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_moves_forward_only() {
        use ProgramStatus::*;

        assert!(Draft.can_transition_to(Aktif));
        assert!(Aktif.can_transition_to(Selesai));
        assert!(!Draft.can_transition_to(Selesai));
        assert!(!Aktif.can_transition_to(Draft));
        assert!(!Selesai.can_transition_to(Aktif));
        assert!(!Selesai.can_transition_to(Selesai));
    }
}
