//! CLI argument structures

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Agree on one-hot encoding levels across nodes without sharing rows
#[derive(Parser)]
#[command(name = "federated-onehot")]
#[command(about = "federated-onehot - One-hot encode tables held by separate nodes with agreed levels", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one node behind the controller API
    #[command(name = "serve")]
    Serve {
        /// Port for the controller API
        #[arg(short, long, default_value = "5000")]
        port: u16,

        /// Directory holding config.yml and the input table
        #[arg(long, default_value = crate::host::DEFAULT_INPUT_DIR)]
        input_dir: PathBuf,

        /// Directory the encoded table is written to
        #[arg(long, default_value = crate::host::DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
    },

    /// Run a whole round locally, one node per input directory
    #[command(name = "simulate")]
    Simulate {
        /// Node input directories; the first one coordinates
        #[arg(required = true, value_name = "NODE_DIR")]
        node_dirs: Vec<PathBuf>,

        /// Outputs land in <OUTPUT_DIR>/node-<i>/
        #[arg(short, long)]
        output_dir: PathBuf,
    },

    /// Encode a single table against a level file
    #[command(name = "encode")]
    Encode {
        /// Input table
        #[arg(short, long)]
        table: PathBuf,

        /// YAML mapping of column name to level list
        #[arg(short, long)]
        levels: PathBuf,

        /// Output table
        #[arg(short, long)]
        output: PathBuf,

        /// Field separator for input and output
        #[arg(short, long, default_value = ",")]
        sep: String,
    },
}
