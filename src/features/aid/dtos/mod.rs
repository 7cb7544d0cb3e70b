mod grant_dto;
mod program_dto;

pub use grant_dto::*;
pub use program_dto::*;
