mod distribution;
mod grant;
mod program;

pub use distribution::{Distribution, DistributionStatus, DISTRIBUTION_COLUMNS};
pub use grant::{Grant, GrantStatus, GrantWithFamily, GRANT_COLUMNS};
pub use program::{Program, ProgramStatus, PROGRAM_COLUMNS};
