use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::map::geometry::{GeometryKind, LatLng};
use crate::features::map::models::{Area, CityCountRow, Distance, PublicPointRow};

/// Marker type of every public point
pub const PUBLIC_POINT_TYPE: &str = "keluarga";

/// Administrative location shown on a public marker
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LocationDto {
    pub kota: Option<String>,
    pub kecamatan: Option<String>,
    pub kelurahan: Option<String>,
}

/// Public map marker; nothing beyond name and location is exposed
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicPointDto {
    pub id: Uuid,
    pub nama: String,
    pub lokasi: LocationDto,
    pub coordinates: LatLng,
    #[serde(rename = "type")]
    #[schema(example = "keluarga")]
    pub point_type: String,
}

impl From<PublicPointRow> for PublicPointDto {
    fn from(row: PublicPointRow) -> Self {
        Self {
            id: row.id,
            nama: row.nama_kepala_keluarga,
            lokasi: LocationDto {
                kota: row.kota,
                kecamatan: row.kecamatan,
                kelurahan: row.kelurahan,
            },
            coordinates: LatLng::new(row.latitude, row.longitude),
            point_type: PUBLIC_POINT_TYPE.to_string(),
        }
    }
}

/// Body of `GET /api/map-data`, shaped for the map widget
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MapDataResponse {
    pub success: bool,
    pub data: Vec<PublicPointDto>,
    pub total: usize,
}

impl MapDataResponse {
    pub fn new(data: Vec<PublicPointDto>) -> Self {
        Self {
            success: true,
            total: data.len(),
            data,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CityCountDto {
    pub kota: String,
    pub total: i64,
}

impl From<CityCountRow> for CityCountDto {
    fn from(row: CityCountRow) -> Self {
        Self {
            kota: row.kota,
            total: row.total,
        }
    }
}

/// Aggregate counts over public families
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicStatsDto {
    pub total_keluarga: i64,
    pub total_wilayah: i64,
    /// Top cities by public family count, ties broken by city name
    pub sebaran_kota: Vec<CityCountDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AreaDto {
    pub id: Uuid,
    pub nama: Option<String>,
    pub keterangan: Option<String>,
    pub coordinates: Vec<LatLng>,
}

impl From<Area> for AreaDto {
    fn from(area: Area) -> Self {
        Self {
            coordinates: area.coordinates(),
            id: area.id,
            nama: area.nama,
            keterangan: area.keterangan,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LineDto {
    pub id: Uuid,
    pub nama: Option<String>,
    pub coordinates: Vec<LatLng>,
    pub panjang_meter: f64,
}

impl From<Distance> for LineDto {
    fn from(line: Distance) -> Self {
        Self {
            coordinates: line.coordinates(),
            id: line.id,
            nama: line.nama,
            panjang_meter: line.panjang_meter,
        }
    }
}

/// Everything drawn for one family
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FamilyGeometryDto {
    pub keluarga_id: Uuid,
    pub point: Option<LatLng>,
    pub polygons: Vec<AreaDto>,
    pub lines: Vec<LineDto>,
}

/// Drawing submitted by the map editor
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SaveGeometryDto {
    pub keluarga_id: Uuid,

    /// `point`, `polygon` or `linestring`
    #[serde(rename = "type")]
    #[schema(example = "polygon")]
    pub geometry_type: String,

    /// JSON-encoded `[{"lat": .., "lng": ..}]`
    #[schema(example = r#"[{"lat":-6.2,"lng":106.8},{"lat":-6.21,"lng":106.81},{"lat":-6.22,"lng":106.8}]"#)]
    pub data: String,

    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub nama: String,

    #[validate(length(max = 1000, message = "Description must not exceed 1000 characters"))]
    pub keterangan: Option<String>,
}

/// Persisted drawing as returned after a save
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GeometryRecordDto {
    #[serde(rename = "type")]
    pub geometry_type: GeometryKind,
    /// Row id; for points this is the family id
    pub id: Uuid,
    pub keluarga_id: Uuid,
    pub nama: Option<String>,
    pub coordinates: Vec<LatLng>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panjang_meter: Option<f64>,
}

impl From<Area> for GeometryRecordDto {
    fn from(area: Area) -> Self {
        Self {
            geometry_type: GeometryKind::Polygon,
            coordinates: area.coordinates(),
            id: area.id,
            keluarga_id: area.keluarga_id,
            nama: area.nama,
            panjang_meter: None,
        }
    }
}

impl From<Distance> for GeometryRecordDto {
    fn from(line: Distance) -> Self {
        Self {
            geometry_type: GeometryKind::Linestring,
            coordinates: line.coordinates(),
            id: line.id,
            keluarga_id: line.keluarga_id,
            nama: line.nama,
            panjang_meter: Some(line.panjang_meter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_point_exposes_only_public_fields() {
        let row = PublicPointRow {
            id: Uuid::nil(),
            nama_kepala_keluarga: "Budi".to_string(),
            kota: Some("Bogor".to_string()),
            kecamatan: None,
            kelurahan: Some("Pakuan".to_string()),
            latitude: -6.6,
            longitude: 106.8,
        };

        let value = serde_json::to_value(PublicPointDto::from(row)).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();

        assert_eq!(keys, vec!["id", "nama", "lokasi", "coordinates", "type"]);
        assert_eq!(value["type"], "keluarga");
        assert_eq!(value["coordinates"]["lat"], -6.6);
        assert_eq!(value["lokasi"]["kota"], "Bogor");
    }

    #[test]
    fn test_map_data_response_counts_points() {
        let body = serde_json::to_value(MapDataResponse::new(vec![])).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["total"], 0);
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_polygon_record_omits_length() {
        let record = GeometryRecordDto {
            geometry_type: GeometryKind::Polygon,
            id: Uuid::nil(),
            keluarga_id: Uuid::nil(),
            nama: Some("Kebun".to_string()),
            coordinates: vec![],
            panjang_meter: None,
        };

        let value = serde_json::to_value(record).unwrap();
        assert_eq!(value["type"], "polygon");
        assert!(value.get("panjang_meter").is_none());
    }
}
