//! Command routing and execution

use crate::cli::args::Commands;
use crate::cli::commands::{encode, serve, simulate};
use anyhow::Result;

/// Execute a CLI command
pub async fn execute_command(command: Commands) -> Result<()> {
    match command {
        Commands::Serve {
            port,
            input_dir,
            output_dir,
        } => serve::run(port, input_dir, output_dir).await,
        Commands::Simulate {
            node_dirs,
            output_dir,
        } => simulate::run(node_dirs, output_dir).await,
        Commands::Encode {
            table,
            levels,
            output,
            sep,
        } => encode::run(&table, &levels, &output, &sep),
    }
}
