mod area;
mod distance;
mod public_point;

pub use area::{Area, AREA_COLUMNS};
pub use distance::{Distance, DISTANCE_COLUMNS};
pub use public_point::{CityCountRow, PublicPointRow};
