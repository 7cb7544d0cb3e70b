use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::features::map::geometry::LatLng;

/// Drawn boundary attached to a family (table `wilayah`)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Area {
    pub id: Uuid,
    pub keluarga_id: Uuid,
    pub nama: Option<String>,
    pub koordinat: Option<Json<Vec<LatLng>>>,
    pub keterangan: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const AREA_COLUMNS: &str = "id, keluarga_id, nama, koordinat, keterangan, created_at, updated_at";

impl Area {
    pub fn coordinates(&self) -> Vec<LatLng> {
        self.koordinat
            .as_ref()
            .map(|json| json.0.clone())
            .unwrap_or_default()
    }
}
