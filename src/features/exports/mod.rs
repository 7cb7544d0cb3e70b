//! CSV exports.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/exports/{category}` | Export families (`search`, `status`) |
//! | POST | `/api/exports/{category}` | Export a JSON array of records |

pub mod dtos;
pub mod formatter;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::ExportService;
