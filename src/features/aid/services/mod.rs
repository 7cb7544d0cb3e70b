mod grant_service;
mod program_service;

pub use grant_service::{parse_month, push_grant_filters, GrantService};
pub use program_service::ProgramService;
