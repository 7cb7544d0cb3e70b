//! Append-only activity log.
//!
//! Every mutating service call writes one entry inside its own transaction
//! via [`ActivityLogService::record`]. Entries are never updated or deleted.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/activity-logs` | Browse entries (filter by `table_name`, `action`) |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::ActivityLogService;
