//! Node-local collaborators: configuration and table storage
//!
//! The round never touches the filesystem directly. Everything local goes
//! through a [`NodeHost`], so rounds can run against real directories
//! ([`FsHost`]) or in memory ([`crate::testing::MemoryHost`]).

use crate::config::{ConfigLoader, NodeConfig};
use crate::error::{FederationError, Result};
use crate::table::{csv_io, Table};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_INPUT_DIR: &str = "/mnt/input";
pub const DEFAULT_OUTPUT_DIR: &str = "/mnt/output";

#[async_trait]
pub trait NodeHost: Send + Sync {
    async fn load_config(&self) -> Result<NodeConfig>;
    async fn read_table(&self, config: &NodeConfig) -> Result<Table>;
    async fn write_table(&self, config: &NodeConfig, table: &Table) -> Result<()>;
}

/// Reads from an input directory and writes to an output directory
#[derive(Debug, Clone)]
pub struct FsHost {
    input_dir: PathBuf,
    output_dir: PathBuf,
}

impl Default for FsHost {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR)
    }
}

impl FsHost {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[async_trait]
impl NodeHost for FsHost {
    async fn load_config(&self) -> Result<NodeConfig> {
        ConfigLoader::new(&self.input_dir, &self.output_dir)
            .load()
            .await
    }

    async fn read_table(&self, config: &NodeConfig) -> Result<Table> {
        let path = self.input_dir.join(&config.input_filename);
        let separator = config.separator;
        info!("Read input table {}", path.display());
        tokio::task::spawn_blocking(move || csv_io::read_table(&path, separator))
            .await
            .map_err(|e| FederationError::other("table reader task failed").with_source(e))?
    }

    async fn write_table(&self, config: &NodeConfig, table: &Table) -> Result<()> {
        let path = self.output_dir.join(&config.output_filename);
        let separator = config.separator;
        let table = table.clone();
        info!("Write output table {}", path.display());
        tokio::task::spawn_blocking(move || csv_io::write_table(&table, &path, separator))
            .await
            .map_err(|e| FederationError::other("table writer task failed").with_source(e))?
    }
}
