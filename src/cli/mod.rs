//! Command line interface
//!
//! - `args` - clap structures
//! - `router` - dispatch to the command implementations
//! - `commands` - one module per subcommand

pub mod args;
pub mod commands;
pub mod router;

pub use args::{Cli, Commands};
pub use router::execute_command;
