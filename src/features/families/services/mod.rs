mod family_service;
mod member_service;

pub(crate) use family_service::{family_not_found, find_family, lock_family};
pub use family_service::{push_family_filters, FamilyService};
pub use member_service::MemberService;
