//! In-memory collaborators

use crate::config::NodeConfig;
use crate::error::Result;
use crate::host::NodeHost;
use crate::table::{csv_io, Table};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A [`NodeHost`] backed by strings
///
/// The config is parsed on `load_config`, so configuration errors surface
/// inside the round exactly as they would from disk. Clones share the
/// written output.
#[derive(Clone)]
pub struct MemoryHost {
    config_yaml: String,
    input: String,
    written: Arc<Mutex<Option<Table>>>,
}

impl MemoryHost {
    pub fn new(config_yaml: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            config_yaml: config_yaml.into(),
            input: input.into(),
            written: Arc::new(Mutex::new(None)),
        }
    }

    /// The table written by the last round, if any
    pub async fn written(&self) -> Option<Table> {
        self.written.lock().await.clone()
    }

    /// The written table rendered as comma separated text
    pub async fn written_csv(&self) -> Option<String> {
        let table = self.written().await?;
        let mut buffer = Vec::new();
        csv_io::write_table_to(&table, &mut buffer, b',').ok()?;
        String::from_utf8(buffer).ok()
    }
}

#[async_trait]
impl NodeHost for MemoryHost {
    async fn load_config(&self) -> Result<NodeConfig> {
        NodeConfig::from_yaml_str(&self.config_yaml)
    }

    async fn read_table(&self, config: &NodeConfig) -> Result<Table> {
        csv_io::read_table_from(self.input.as_bytes(), config.separator)
    }

    async fn write_table(&self, _config: &NodeConfig, table: &Table) -> Result<()> {
        *self.written.lock().await = Some(table.clone());
        Ok(())
    }
}
