mod family_handler;
mod member_handler;

pub use family_handler::*;
pub use member_handler::*;
