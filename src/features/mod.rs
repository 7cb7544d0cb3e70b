pub mod activity_logs;
pub mod aid;
pub mod dashboard;
pub mod exports;
pub mod families;
pub mod map;
