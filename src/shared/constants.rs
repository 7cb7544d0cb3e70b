/// Fixed page size for every admin listing
pub const PAGE_SIZE: i64 = 10;

/// Number of cities returned by the public distribution stats
pub const TOP_CITY_LIMIT: i64 = 10;

/// Mean Earth radius used for haversine lengths (matches the drawing widget)
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Months in one budget year; each grant has one distribution per month
pub const MONTHS_PER_YEAR: i16 = 12;

/// Relationship label of the head of household
pub const HEAD_OF_HOUSEHOLD: &str = "Kepala Keluarga";
