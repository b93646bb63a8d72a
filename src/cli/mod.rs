pub mod commands;
pub mod analyze;
pub mod forecast;
pub mod plan;

pub use commands::{Cli, Commands};
