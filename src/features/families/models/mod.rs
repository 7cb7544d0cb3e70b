mod family;
mod member;

pub use family::{EconomicStatus, Family, FamilyWithCount, VerificationStatus, FAMILY_COLUMNS};
pub use member::{Gender, Member, MEMBER_COLUMNS};
