use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Sex matching the `jenis_kelamin` database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "jenis_kelamin")]
pub enum Gender {
    #[sqlx(rename = "L")]
    #[serde(rename = "L")]
    LakiLaki,
    #[sqlx(rename = "P")]
    #[serde(rename = "P")]
    Perempuan,
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gender::LakiLaki => write!(f, "L"),
            Gender::Perempuan => write!(f, "P"),
        }
    }
}

/// Household member (anggota keluarga)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Member {
    pub id: Uuid,
    pub keluarga_id: Uuid,
    pub nik: String,
    pub nama: String,
    pub jenis_kelamin: Gender,
    pub tempat_lahir: Option<String>,
    pub tanggal_lahir: Option<NaiveDate>,
    pub status_perkawinan: Option<String>,
    pub pendidikan: Option<String>,
    pub pekerjaan: Option<String>,
    pub hubungan_keluarga: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column list matching [`Member`]
pub const MEMBER_COLUMNS: &str = "id, keluarga_id, nik, nama, jenis_kelamin, tempat_lahir, \
     tanggal_lahir, status_perkawinan, pendidikan, pekerjaan, hubungan_keluarga, created_at, \
     updated_at";
