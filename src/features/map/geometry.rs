//! Vertex parsing and validation for drawn map geometry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::error::AppError;
use crate::shared::constants::EARTH_RADIUS_METERS;

/// Kind of drawing submitted by the map editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    Point,
    Polygon,
    Linestring,
}

impl GeometryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryKind::Point => "point",
            GeometryKind::Polygon => "polygon",
            GeometryKind::Linestring => "linestring",
        }
    }

    /// Smallest vertex count a drawing of this kind may have
    pub fn min_vertices(&self) -> usize {
        match self {
            GeometryKind::Point => 1,
            GeometryKind::Polygon => 3,
            GeometryKind::Linestring => 2,
        }
    }

    /// Table holding drawings of this kind (points live on `keluarga`)
    pub fn table_name(&self) -> &'static str {
        match self {
            GeometryKind::Point => "keluarga",
            GeometryKind::Polygon => "wilayah",
            GeometryKind::Linestring => "jarak",
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeometryKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "point" => Ok(GeometryKind::Point),
            "polygon" => Ok(GeometryKind::Polygon),
            "linestring" => Ok(GeometryKind::Linestring),
            other => Err(AppError::Validation(format!(
                "Unknown geometry type '{}', expected point, polygon or linestring",
                other
            ))),
        }
    }
}

/// One vertex in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    fn check(&self, index: usize) -> Result<(), AppError> {
        if !self.lat.is_finite() || !self.lng.is_finite() {
            return Err(AppError::Validation(format!(
                "Vertex {} has a non-finite coordinate",
                index
            )));
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(AppError::Validation(format!(
                "Vertex {} latitude {} is outside [-90, 90]",
                index, self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(AppError::Validation(format!(
                "Vertex {} longitude {} is outside [-180, 180]",
                index, self.lng
            )));
        }
        Ok(())
    }
}

/// Parse the editor's JSON-encoded vertex list and validate it for `kind`.
pub fn parse_vertices(kind: GeometryKind, data: &str) -> Result<Vec<LatLng>, AppError> {
    let vertices: Vec<LatLng> = serde_json::from_str(data).map_err(|e| {
        AppError::Validation(format!(
            "Geometry data must be a JSON array of {{lat, lng}} objects: {}",
            e
        ))
    })?;

    validate_for_kind(kind, &vertices)?;
    Ok(vertices)
}

/// Enforce coordinate ranges and the vertex count required by `kind`.
pub fn validate_for_kind(kind: GeometryKind, vertices: &[LatLng]) -> Result<(), AppError> {
    for (index, vertex) in vertices.iter().enumerate() {
        vertex.check(index)?;
    }

    let count = vertices.len();
    let valid = match kind {
        GeometryKind::Point => count == 1,
        _ => count >= kind.min_vertices(),
    };

    if !valid {
        let expected = match kind {
            GeometryKind::Point => "exactly 1 vertex".to_string(),
            _ => format!("at least {} vertices", kind.min_vertices()),
        };
        return Err(AppError::Validation(format!(
            "A {} needs {}, got {}",
            kind, expected, count
        )));
    }

    Ok(())
}

/// Great-circle distance between two vertices in meters
pub fn haversine_distance(from: LatLng, to: LatLng) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_METERS * c
}

/// Sum of segment lengths along a path
pub fn path_length_meters(vertices: &[LatLng]) -> f64 {
    vertices
        .windows(2)
        .map(|pair| haversine_distance(pair[0], pair[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parses_known_values_only() {
        assert_eq!("polygon".parse::<GeometryKind>().unwrap(), GeometryKind::Polygon);
        assert_eq!(
            "linestring".parse::<GeometryKind>().unwrap(),
            GeometryKind::Linestring
        );
        assert!(matches!(
            "circle".parse::<GeometryKind>(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_point() {
        let vertices =
            parse_vertices(GeometryKind::Point, r#"[{"lat": -6.2, "lng": 106.8}]"#).unwrap();
        assert_eq!(vertices, vec![LatLng::new(-6.2, 106.8)]);
    }

    #[test]
    fn test_point_needs_exactly_one_vertex() {
        let data = r#"[{"lat": -6.2, "lng": 106.8}, {"lat": -6.3, "lng": 106.9}]"#;
        assert!(parse_vertices(GeometryKind::Point, data).is_err());
        assert!(parse_vertices(GeometryKind::Point, "[]").is_err());
    }

    #[test]
    fn test_polygon_with_two_vertices_is_rejected() {
        let data = r#"[{"lat": -6.2, "lng": 106.8}, {"lat": -6.3, "lng": 106.9}]"#;
        let err = parse_vertices(GeometryKind::Polygon, data).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("at least 3")));
    }

    #[test]
    fn test_linestring_needs_two_vertices() {
        assert!(parse_vertices(GeometryKind::Linestring, r#"[{"lat": 0, "lng": 0}]"#).is_err());
        assert!(parse_vertices(
            GeometryKind::Linestring,
            r#"[{"lat": 0, "lng": 0}, {"lat": 0, "lng": 1}]"#
        )
        .is_ok());
    }

    #[test]
    fn test_rejects_malformed_and_non_numeric_data() {
        assert!(parse_vertices(GeometryKind::Point, "not json").is_err());
        assert!(parse_vertices(GeometryKind::Point, r#"[{"lat": "a", "lng": 1}]"#).is_err());
        assert!(parse_vertices(GeometryKind::Point, r#"{"lat": 1, "lng": 1}"#).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_coordinates() {
        assert!(parse_vertices(GeometryKind::Point, r#"[{"lat": 91, "lng": 0}]"#).is_err());
        assert!(parse_vertices(GeometryKind::Point, r#"[{"lat": 0, "lng": -180.5}]"#).is_err());
        assert!(parse_vertices(GeometryKind::Point, r#"[{"lat": -90, "lng": 180}]"#).is_ok());
    }

    #[test]
    fn test_rejects_non_finite_coordinates() {
        let vertices = [LatLng::new(f64::NAN, 0.0)];
        assert!(validate_for_kind(GeometryKind::Point, &vertices).is_err());
    }

    #[test]
    fn test_one_degree_of_longitude_on_the_equator() {
        let length = path_length_meters(&[LatLng::new(0.0, 0.0), LatLng::new(0.0, 1.0)]);
        // 2 * pi * 6_371_000 / 360
        assert!((length - 111_194.93).abs() < 0.01, "got {}", length);
    }

    #[test]
    fn test_path_length_sums_segments() {
        let a = LatLng::new(-6.2, 106.8);
        let b = LatLng::new(-6.21, 106.81);
        let c = LatLng::new(-6.22, 106.8);

        let total = path_length_meters(&[a, b, c]);
        let expected = haversine_distance(a, b) + haversine_distance(b, c);
        assert!((total - expected).abs() < 1e-9);
        assert_eq!(path_length_meters(&[a]), 0.0);
    }
}
