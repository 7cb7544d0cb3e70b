//! Geographic data for the public map and the admin map editor.
//!
//! Points are stored on the family row (`latitude`/`longitude`); areas
//! (`wilayah`) and lines (`jarak`) keep their vertices as JSONB.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/map-data` | No | Public family points |
//! | GET | `/api/public-stats` | No | Public counts and top cities |
//! | GET | `/api/map-data/{family_id}` | Admin | Point, areas and lines of a family |
//! | POST | `/api/map-data` | Admin | Save a drawing |
//! | DELETE | `/api/map-geometry/{type}/{id}` | Admin | Delete a drawing |

pub mod dtos;
pub mod geometry;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::MapService;
