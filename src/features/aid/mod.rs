//! Yearly aid grants, their monthly distributions and program settings.
//!
//! Grant lifecycle: `ditetapkan -> aktif -> selesai`, with `dibatalkan`
//! reachable from the first two. Distributions can only be recorded while a
//! grant is `aktif`. Programs move `draft -> aktif -> selesai`.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/aid-grants` | List grants (`tahun`, `status`, `page`) |
//! | POST | `/api/aid-grants` | Assign a grant |
//! | GET | `/api/aid-grants/{id}` | Grant with distributions |
//! | PATCH | `/api/aid-grants/{id}/status` | Change grant status |
//! | PUT | `/api/aid-grants/{id}/distributions/{month}` | Record a distribution |
//! | GET | `/api/aid-programs` | List program settings |
//! | GET | `/api/aid-programs/{year}` | Program settings for a year |
//! | PUT | `/api/aid-programs/{year}` | Create or replace settings |
//! | PATCH | `/api/aid-programs/{year}/status` | Advance program status |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{GrantService, ProgramService};
