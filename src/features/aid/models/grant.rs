use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle of a yearly grant, matching the `status_bantuan` database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "status_bantuan", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GrantStatus {
    Ditetapkan,
    Aktif,
    Selesai,
    Dibatalkan,
}

impl GrantStatus {
    pub const ALL: [GrantStatus; 4] = [
        GrantStatus::Ditetapkan,
        GrantStatus::Aktif,
        GrantStatus::Selesai,
        GrantStatus::Dibatalkan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GrantStatus::Ditetapkan => "ditetapkan",
            GrantStatus::Aktif => "aktif",
            GrantStatus::Selesai => "selesai",
            GrantStatus::Dibatalkan => "dibatalkan",
        }
    }

    /// Allowed moves: assigned grants start or get cancelled, active grants finish or get cancelled
    pub fn can_transition_to(&self, next: GrantStatus) -> bool {
        matches!(
            (self, next),
            (GrantStatus::Ditetapkan, GrantStatus::Aktif)
                | (GrantStatus::Ditetapkan, GrantStatus::Dibatalkan)
                | (GrantStatus::Aktif, GrantStatus::Selesai)
                | (GrantStatus::Aktif, GrantStatus::Dibatalkan)
        )
    }
}

impl fmt::Display for GrantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrantStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GrantStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown grant status '{}'", s))
    }
}

/// Aid grant for one family and budget year (bantuan)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Grant {
    pub id: Uuid,
    pub keluarga_id: Uuid,
    pub tahun_anggaran: i32,
    pub nominal_per_bulan: Decimal,
    pub status: GrantStatus,
    pub tanggal_penetapan: NaiveDate,
    pub keterangan: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const GRANT_COLUMNS: &str = "id, keluarga_id, tahun_anggaran, nominal_per_bulan, status, \
     tanggal_penetapan, keterangan, created_at, updated_at";

/// Grant joined with the recipient's identifying fields
#[derive(Debug, Clone, FromRow)]
pub struct GrantWithFamily {
    #[sqlx(flatten)]
    pub grant: Grant,
    pub nama_kepala_keluarga: String,
    pub no_kk: String,
}
