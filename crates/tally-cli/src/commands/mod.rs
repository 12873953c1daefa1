//! Command implementations

mod coach;
mod extract;
mod status;

pub use coach::cmd_coach;
pub use extract::{cmd_extract, cmd_parse};
pub use status::cmd_providers;
