use super::{NodeConfig, CONFIG_FILE_NAME};
use crate::error::{common, ErrorExt, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Loads `config.yml` from a node's input directory
pub struct ConfigLoader {
    input_dir: PathBuf,
    output_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.input_dir.join(CONFIG_FILE_NAME)
    }

    /// Read and validate the config, then copy it next to the outputs
    pub async fn load(&self) -> Result<NodeConfig> {
        let path = self.config_path();
        if !path.exists() {
            return Err(common::config_not_found(&path));
        }

        info!("Read config file {}", path.display());
        let content = fs::read_to_string(&path)
            .await
            .to_config_error(format!("could not read {}", path.display()))?;
        let config = NodeConfig::from_yaml_str(&content)?;
        debug!("Mode: {}", config.mode);

        self.copy_to_output(&path).await?;
        Ok(config)
    }

    async fn copy_to_output(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(&self.output_dir)
            .await
            .to_config_error("could not create output directory")?;
        let target = self.output_dir.join(CONFIG_FILE_NAME);
        debug!("Copy config file to {}", target.display());
        fs::copy(path, &target)
            .await
            .to_config_error(format!("could not copy config to {}", target.display()))?;
        Ok(())
    }
}
