//! Family (household) registry and its members.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/families` | Paginated listing (`search`, `status`, `page`) |
//! | POST | `/api/families` | Create a family |
//! | GET | `/api/families/{id}` | Family with ordered members |
//! | PUT | `/api/families/{id}` | Replace a family |
//! | DELETE | `/api/families/{id}` | Delete a family and everything attached |
//! | PATCH | `/api/families/{id}/verification` | Record a verification decision |
//! | PATCH | `/api/families/{id}/visibility` | Show or hide on the public map |
//! | GET | `/api/families/{id}/members` | List members |
//! | POST | `/api/families/{id}/members` | Add a member |
//! | PUT | `/api/members/{id}` | Replace a member |
//! | DELETE | `/api/members/{id}` | Remove a member |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{FamilyService, MemberService};
