pub mod cli;
pub mod launch;

pub use cli::{Cli, Commands};
pub use launch::{load_config, run};
