//! Admin dashboard counters over families, members, grants and distributions.

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::DashboardService;
