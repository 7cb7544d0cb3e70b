use sqlx::FromRow;
use uuid::Uuid;

/// Projection of a public family used by the public map
#[derive(Debug, Clone, FromRow)]
pub struct PublicPointRow {
    pub id: Uuid,
    pub nama_kepala_keluarga: String,
    pub kota: Option<String>,
    pub kecamatan: Option<String>,
    pub kelurahan: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// Public family count for one city
#[derive(Debug, Clone, FromRow)]
pub struct CityCountRow {
    pub kota: String,
    pub total: i64,
}
