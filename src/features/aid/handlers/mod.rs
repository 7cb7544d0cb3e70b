mod grant_handler;
mod program_handler;

pub use grant_handler::*;
pub use program_handler::*;
