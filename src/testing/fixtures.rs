//! Configuration builders and node directories on disk

use crate::config::CONFIG_FILE_NAME;
use crate::host::FsHost;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const INPUT_FILE: &str = "data.csv";
pub const OUTPUT_FILE: &str = "encoded.csv";

/// Builder for `config.yml` contents
pub struct ConfigBuilder {
    mode: String,
    sep: String,
    directive: Option<String>,
    categorical_columns: Vec<String>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            mode: "auto".to_string(),
            sep: ",".to_string(),
            directive: None,
            categorical_columns: Vec::new(),
        }
    }

    pub fn with_mode(mut self, mode: &str) -> Self {
        self.mode = mode.to_string();
        self
    }

    pub fn with_separator(mut self, sep: &str) -> Self {
        self.sep = sep.to_string();
        self
    }

    /// Add a `categorical_variables` entry, `levels` written as a YAML flow sequence
    pub fn with_levels(mut self, column: &str, levels: &str) -> Self {
        let entry = format!("    {}: {}\n", column, levels);
        self.directive.get_or_insert_with(String::new).push_str(&entry);
        self
    }

    pub fn with_categorical_column(mut self, column: &str) -> Self {
        self.categorical_columns.push(column.to_string());
        self
    }

    pub fn build(self) -> String {
        let mut yaml = format!(
            "fc_one_hot_encoding:\n  files:\n    input_filename: {}\n    output_filename: {}\n    sep: '{}'\n  mode: {}\n",
            INPUT_FILE, OUTPUT_FILE, self.sep, self.mode
        );
        if let Some(directive) = self.directive {
            yaml.push_str("  categorical_variables:\n");
            yaml.push_str(&directive);
        }
        if !self.categorical_columns.is_empty() {
            yaml.push_str(&format!(
                "  categorical_columns: [{}]\n",
                self.categorical_columns.join(", ")
            ));
        }
        yaml
    }
}

/// A node's input and output directories in a temporary location
pub struct NodeDir {
    root: TempDir,
}

impl NodeDir {
    pub fn new(config_yaml: &str, input: &str) -> io::Result<Self> {
        let root = TempDir::new()?;
        let input_dir = root.path().join("input");
        std::fs::create_dir_all(&input_dir)?;
        std::fs::write(input_dir.join(CONFIG_FILE_NAME), config_yaml)?;
        std::fs::write(input_dir.join(INPUT_FILE), input)?;
        Ok(Self { root })
    }

    pub fn input_dir(&self) -> PathBuf {
        self.root.path().join("input")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.path().join("output")
    }

    pub fn host(&self) -> FsHost {
        FsHost::new(self.input_dir(), self.output_dir())
    }

    pub fn output(&self) -> io::Result<String> {
        std::fs::read_to_string(self.output_dir().join(OUTPUT_FILE))
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }
}

/// Several node directories forming one round, the first coordinating
pub struct TestCluster {
    nodes: Vec<NodeDir>,
}

impl TestCluster {
    /// One node per `(config, input)` pair
    pub fn new(nodes: &[(&str, &str)]) -> io::Result<Self> {
        let nodes = nodes
            .iter()
            .map(|(config, input)| NodeDir::new(config, input))
            .collect::<io::Result<Vec<_>>>()?;
        Ok(Self { nodes })
    }

    /// Every node with the same config
    pub fn uniform(config_yaml: &str, inputs: &[&str]) -> io::Result<Self> {
        let pairs: Vec<(&str, &str)> = inputs.iter().map(|input| (config_yaml, *input)).collect();
        Self::new(&pairs)
    }

    pub fn hosts(&self) -> Vec<FsHost> {
        self.nodes.iter().map(NodeDir::host).collect()
    }

    pub fn node(&self, index: usize) -> &NodeDir {
        &self.nodes[index]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
