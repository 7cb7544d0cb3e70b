use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Economic status tier matching the `status_ekonomi` database enum.
///
/// Variants are declared from most to least severe, so the derived `Ord`
/// is the severity order used for eligibility and dashboards.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Type, ToSchema,
)]
#[sqlx(type_name = "status_ekonomi", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EconomicStatus {
    SangatMiskin,
    Miskin,
    RentanMiskin,
    TidakMiskin,
}

impl EconomicStatus {
    pub const ALL: [EconomicStatus; 4] = [
        EconomicStatus::SangatMiskin,
        EconomicStatus::Miskin,
        EconomicStatus::RentanMiskin,
        EconomicStatus::TidakMiskin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EconomicStatus::SangatMiskin => "sangat_miskin",
            EconomicStatus::Miskin => "miskin",
            EconomicStatus::RentanMiskin => "rentan_miskin",
            EconomicStatus::TidakMiskin => "tidak_miskin",
        }
    }

    /// Human readable label shown in the admin UI and exports
    pub fn label(&self) -> &'static str {
        match self {
            EconomicStatus::SangatMiskin => "Sangat Miskin",
            EconomicStatus::Miskin => "Miskin",
            EconomicStatus::RentanMiskin => "Rentan Miskin",
            EconomicStatus::TidakMiskin => "Tidak Miskin",
        }
    }

    /// Badge/marker colour used by the UI for this tier
    pub fn color(&self) -> &'static str {
        match self {
            EconomicStatus::SangatMiskin => "#dc2626",
            EconomicStatus::Miskin => "#f97316",
            EconomicStatus::RentanMiskin => "#eab308",
            EconomicStatus::TidakMiskin => "#16a34a",
        }
    }
}

impl fmt::Display for EconomicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EconomicStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EconomicStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Unknown economic status '{}'. Expected one of: {}",
                    s,
                    EconomicStatus::ALL
                        .iter()
                        .map(|status| status.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

/// Verification status matching the `status_verifikasi` database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "status_verifikasi", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    BelumVerifikasi,
    Terverifikasi,
    Ditolak,
}

impl VerificationStatus {
    pub const ALL: [VerificationStatus; 3] = [
        VerificationStatus::BelumVerifikasi,
        VerificationStatus::Terverifikasi,
        VerificationStatus::Ditolak,
    ];
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationStatus::BelumVerifikasi => write!(f, "belum_verifikasi"),
            VerificationStatus::Terverifikasi => write!(f, "terverifikasi"),
            VerificationStatus::Ditolak => write!(f, "ditolak"),
        }
    }
}

/// Household record (keluarga)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Family {
    pub id: Uuid,
    pub no_kk: String,
    pub nama_kepala_keluarga: String,
    pub alamat: String,
    pub rt: Option<String>,
    pub rw: Option<String>,
    pub kelurahan: Option<String>,
    pub kecamatan: Option<String>,
    pub kota: Option<String>,
    pub provinsi: Option<String>,
    pub kode_pos: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status_ekonomi: EconomicStatus,
    pub penghasilan_bulanan: Decimal,
    pub jumlah_anggota: i32,
    pub status_verifikasi: VerificationStatus,
    pub diverifikasi_oleh: Option<String>,
    pub diverifikasi_pada: Option<DateTime<Utc>>,
    pub catatan_verifikasi: Option<String>,
    pub is_active: bool,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column list matching [`Family`]
pub const FAMILY_COLUMNS: &str = "id, no_kk, nama_kepala_keluarga, alamat, rt, rw, kelurahan, \
     kecamatan, kota, provinsi, kode_pos, latitude, longitude, status_ekonomi, \
     penghasilan_bulanan, jumlah_anggota, status_verifikasi, diverifikasi_oleh, \
     diverifikasi_pada, catatan_verifikasi, is_active, is_public, created_at, updated_at";

/// Family row annotated with its live member count
#[derive(Debug, Clone, FromRow)]
pub struct FamilyWithCount {
    #[sqlx(flatten)]
    pub family: Family,
    pub anggota_count: i64,
}
