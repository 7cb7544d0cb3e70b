use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::features::map::geometry::LatLng;

/// Drawn path attached to a family with its measured length (table `jarak`)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Distance {
    pub id: Uuid,
    pub keluarga_id: Uuid,
    pub nama: Option<String>,
    pub koordinat: Option<Json<Vec<LatLng>>>,
    pub panjang_meter: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const DISTANCE_COLUMNS: &str =
    "id, keluarga_id, nama, koordinat, panjang_meter, created_at, updated_at";

impl Distance {
    pub fn coordinates(&self) -> Vec<LatLng> {
        self.koordinat
            .as_ref()
            .map(|json| json.0.clone())
            .unwrap_or_default()
    }
}
